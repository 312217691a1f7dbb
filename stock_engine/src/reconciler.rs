//! # Reconciliation
//!
//! Compares the previous snapshot of a product with what was just observed and decides what, if anything, the
//! subscriber needs to be told. The decision is a pure function of its inputs.
//!
//! Status transitions (in stock vs. out of stock) decide whether a *new* announcement is warranted. Quantity changes
//! while the product stays in stock only ever update the existing announcement. A product coming back into stock always
//! gets a fresh message, even if an older (sold out) one could be edited.
use std::fmt::Display;

use crate::stock_types::{NotificationHandle, ProductSettings, ProductSnapshot, StockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Send a fresh notification and adopt its handle.
    Create,
    /// Edit the given notification. If it no longer exists, send a fresh one instead.
    Edit(NotificationHandle),
    /// Edit the given notification. If the edit fails for any reason other than the content being unchanged, send a
    /// fresh one instead.
    EditThenFallbackToCreate(NotificationHandle),
    /// Persist the observation without any messaging.
    SilentUpdate,
    /// Nothing meaningful changed. The snapshot is still persisted, since the remark may have changed.
    Noop,
}

impl Action {
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_) | Self::EditThenFallbackToCreate(_))
    }

    /// Whether carrying out this action involves the messaging channel at all.
    pub fn requires_messaging(&self) -> bool {
        !matches!(self, Self::SilentUpdate | Self::Noop)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Edit(h) => write!(f, "Edit({h})"),
            Self::EditThenFallbackToCreate(h) => write!(f, "EditThenFallbackToCreate({h})"),
            Self::SilentUpdate => write!(f, "SilentUpdate"),
            Self::Noop => write!(f, "Noop"),
        }
    }
}

/// Decide what to do about a product, given its previous snapshot (if any), the quantity just observed and the
/// operator's current settings for it.
pub fn decide(previous: Option<&ProductSnapshot>, observed_quantity: u64, settings: &ProductSettings) -> Action {
    // Products are never announced the first time they are seen.
    let Some(previous) = previous else {
        return Action::SilentUpdate;
    };
    if !settings.notify_enabled {
        return Action::SilentUpdate;
    }
    let previous_status = previous.status();
    let current_status = StockStatus::from_quantity(observed_quantity);
    match (previous_status, current_status) {
        (StockStatus::OutOfStock, StockStatus::InStock) => Action::Create,
        (StockStatus::InStock, StockStatus::OutOfStock) => match previous.notification_handle {
            Some(handle) => Action::Edit(handle),
            None => Action::SilentUpdate,
        },
        (StockStatus::InStock, StockStatus::InStock) if previous.quantity != observed_quantity => {
            match previous.notification_handle {
                Some(handle) => Action::EditThenFallbackToCreate(handle),
                None => Action::Create,
            }
        },
        _ => Action::Noop,
    }
}
