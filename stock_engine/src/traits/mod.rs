//! # Collaborator contracts
//!
//! The engine talks to the outside world only through the traits in this module. Concrete implementations (a
//! Telegram bot, an HTTP product page, JSON documents on disk) live outside the engine.
//!
//! * [`MessagingChannel`] delivers, edits and looks back over notifications.
//! * [`SnapshotStore`] persists the last known state of every tracked product.
//! * [`ProductSource`] produces the products observed on one vendor page.
//! * [`OperatorConfigSource`] supplies the operator's per-product settings, reloaded every cycle.
mod messaging_channel;
mod operator_config;
mod product_source;
mod snapshot_store;

pub use messaging_channel::{ChannelError, MessagingChannel};
pub use operator_config::OperatorConfigSource;
pub use product_source::{ProductSource, SourceError};
pub use snapshot_store::{SnapshotStore, StoreError};
