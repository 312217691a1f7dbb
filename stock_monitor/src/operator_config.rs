//! The operator's product list, read from a JSON document that may be edited while the monitor is running.
//!
//! ```json
//! {
//!   "products": {
//!     "SLICE 1024 LV": { "notify": true, "remark": "年付 $35" },
//!     "SLICE 2048 NY": { "notify": false }
//!   }
//! }
//! ```
use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use log::*;
use serde::Deserialize;
use stock_engine::{
    stock_types::{OperatorConfig, ProductSettings},
    traits::OperatorConfigSource,
};

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    products: HashMap<String, ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    notify: Option<bool>,
    remark: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JsonOperatorConfig {
    path: PathBuf,
}

impl JsonOperatorConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl OperatorConfigSource for JsonOperatorConfig {
    async fn load_settings(&self) -> OperatorConfig {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("⚙️ {} does not exist. Please create it with the products you want to monitor.", self.path_str());
                return OperatorConfig::default();
            },
            Err(e) => {
                error!("⚙️ Could not read {}. {e}", self.path_str());
                return OperatorConfig::default();
            },
        };
        let config = parse_operator_config(&content);
        debug!("⚙️ Loaded settings for {} products from {}", config.len(), self.path_str());
        config
    }
}

/// Parse an operator config document. Empty or malformed documents give an empty configuration, and entries without a
/// `notify` flag are left out.
pub fn parse_operator_config(content: &str) -> OperatorConfig {
    if content.trim().is_empty() {
        warn!("⚙️ The operator config is empty");
        return OperatorConfig::default();
    }
    let document = match serde_json::from_str::<ConfigDocument>(content) {
        Ok(d) => d,
        Err(e) => {
            error!("⚙️ The operator config could not be parsed. {e}");
            return OperatorConfig::default();
        },
    };
    let products = document
        .products
        .into_iter()
        .filter_map(|(name, entry)| match entry.notify {
            Some(notify) => Some((name, ProductSettings::new(notify, entry.remark.unwrap_or_default()))),
            None => {
                warn!("⚙️ {name} does not have a notify setting. It will not be monitored.");
                None
            },
        })
        .collect();
    OperatorConfig::new(products)
}
