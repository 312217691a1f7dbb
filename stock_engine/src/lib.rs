//! Stock Monitor Engine
//!
//! The engine holds the core logic of the stock monitor. It decides when a subscriber must hear about a product and
//! makes sure that they hear about it exactly once, no matter how flaky the messaging channel is. It knows nothing
//! about vendor pages, Telegram or the file system; those are reached through the traits in [`mod@traits`].
//!
//! The library is divided into the following sections:
//! 1. The data model ([`mod@stock_types`]) and the pure reconciliation rules ([`mod@reconciler`]).
//! 2. Notification delivery ([`mod@dispatcher`]), which handles concurrency limits, retries, rate limits and pacing.
//! 3. Persistence of the last known state of every product ([`mod@store`]).
//! 4. The public API ([`ProductTracker`]), which ties the above together for a single observed product.
pub mod dispatcher;
pub mod formatting;
pub mod helpers;
pub mod reconciler;
pub mod stock_types;
pub mod store;
pub mod traits;
mod tracker_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use dispatcher::{DispatchConfig, Dispatcher, EditOutcome, SendFailure};
pub use formatting::MessageFormatter;
pub use reconciler::{decide, Action};
pub use store::JsonFileStore;
pub use tracker_api::{
    errors::TrackerError,
    product_tracker::ProductTracker,
    tracker_objects::{Delivery, TrackMode, TrackOutcome},
};
