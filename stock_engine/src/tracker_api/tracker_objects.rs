use std::fmt::Display;

use crate::{
    dispatcher::{EditOutcome, SendFailure},
    reconciler::Action,
    stock_types::{NotificationHandle, ProductSnapshot},
};

/// Whether a product is being tracked as part of the very first pass over the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Normal,
    /// Record baselines only. Nothing is ever sent in this mode.
    ColdStart,
}

/// What happened on the messaging channel while carrying out an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The action did not involve the channel.
    Skipped,
    /// A fresh notification was sent, either directly or after an edit could not be applied.
    Created(NotificationHandle),
    /// The existing notification was edited (or could not be, but no fallback was called for). The handle is kept.
    Edited(EditOutcome),
    /// The send was suppressed because an identical message was found in the recent history.
    Duplicate,
    /// A fresh notification was called for, but could not be delivered.
    Undelivered(SendFailure),
}

impl Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "no messaging"),
            Self::Created(h) => write!(f, "created {h}"),
            Self::Edited(outcome) => write!(f, "edit {outcome}"),
            Self::Duplicate => write!(f, "duplicate suppressed"),
            Self::Undelivered(e) => write!(f, "undelivered ({e})"),
        }
    }
}

/// The result of tracking one observation of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    pub action: Action,
    pub delivery: Delivery,
    /// The snapshot as it was persisted.
    pub snapshot: ProductSnapshot,
}
