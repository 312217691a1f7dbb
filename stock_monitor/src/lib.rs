//! # Stock monitor
//!
//! Polls the vendor's cart pages and tells a Telegram chat when a product the operator cares about comes back into
//! stock. The announcement is then edited in place as the stock level changes, and struck through once the product
//! sells out again.
//!
//! ## Configuration
//! The monitor is configured via environment variables (a `.env` file is honoured). See [config](config/index.html)
//! for more information. The list of products to watch lives in a separate JSON document (see
//! [operator_config](operator_config/index.html)) which is re-read every cycle, so products can be added, muted or
//! annotated without a restart.
//!
//! ## Startup
//! If there is no saved product state, the first pass only records the current stock levels. This prevents a flood of
//! announcements for everything that happens to be in stock when the monitor is first run.
pub mod cli;
pub mod config;
pub mod errors;
pub mod integrations;
pub mod monitor;
pub mod monitor_worker;
pub mod operator_config;
