use std::{fmt::Display, time::Duration};

use thiserror::Error;

/// Why a send did not produce a new handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendFailure {
    #[error("Gave up after {attempts} timed out attempts")]
    TimeoutExhausted { attempts: u32 },
    #[error("The channel refused the message. {0}")]
    AbortedByChannel(String),
    /// A message with an identical body was found in the channel's recent history, so nothing was sent.
    #[error("An identical message was already sent")]
    DuplicateDetected,
    #[error("Gave up after waiting out rate limits for {waited:?}")]
    RateLimitCapExceeded { waited: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The message already had this content. Counts as a success.
    NoopAlreadyCurrent,
    /// The message no longer exists. The caller should send a fresh one.
    TargetMissing,
    Failed(String),
}

impl EditOutcome {
    /// Whether the edited message is known to show the new body.
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Applied | Self::NoopAlreadyCurrent)
    }
}

impl Display for EditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::NoopAlreadyCurrent => write!(f, "already current"),
            Self::TargetMissing => write!(f, "target missing"),
            Self::Failed(e) => write!(f, "failed ({e})"),
        }
    }
}
