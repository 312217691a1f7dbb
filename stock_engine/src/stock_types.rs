use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use serde::{Deserialize, Serialize};

//--------------------------------------  NotificationHandle  ---------------------------------------------------------
/// An opaque reference to a notification that was delivered earlier, used to target edits. For Telegram this is the
/// message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub i64);

impl Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for NotificationHandle {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

//--------------------------------------     StockStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    pub fn from_quantity(quantity: u64) -> Self {
        if quantity > 0 {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }
}

impl Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in stock"),
            Self::OutOfStock => write!(f, "out of stock"),
        }
    }
}

//--------------------------------------    ProductRecord    ---------------------------------------------------------
/// A product as observed on the vendor's page during the current cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    /// The product name. Names are unique across the whole catalog and are used as the product identifier.
    pub name: String,
    pub price: String,
    /// Feature lines, newline separated.
    pub features: String,
    /// The availability text exactly as displayed, e.g. "3 Available".
    pub availability: String,
    /// Parsed stock count. Zero if the availability text could not be parsed.
    pub quantity: u64,
    pub link: String,
}

impl ProductRecord {
    pub fn status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }
}

//--------------------------------------   ProductSnapshot   ---------------------------------------------------------
/// The last known state of one product. The field names of the serialized form are kept short since the document is
/// also edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(rename = "qty")]
    pub quantity: u64,
    #[serde(rename = "message_id", default)]
    pub notification_handle: Option<NotificationHandle>,
    #[serde(rename = "notify", default)]
    pub notify_enabled: bool,
    #[serde(default)]
    pub remark: String,
}

impl ProductSnapshot {
    /// A snapshot for a product that has just been seen for the first time.
    pub fn first_sight(quantity: u64, settings: &ProductSettings) -> Self {
        Self {
            quantity,
            notification_handle: None,
            notify_enabled: settings.notify_enabled,
            remark: settings.remark.clone(),
        }
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }
}

/// All persisted snapshots, keyed by product name.
pub type SnapshotMap = BTreeMap<String, ProductSnapshot>;

//--------------------------------------   OperatorConfig    ---------------------------------------------------------
/// Operator supplied settings for a single product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSettings {
    pub notify_enabled: bool,
    pub remark: String,
}

impl ProductSettings {
    pub fn new<S: Into<String>>(notify_enabled: bool, remark: S) -> Self {
        Self { notify_enabled, remark: remark.into() }
    }
}

/// The set of products the operator wants tracked. Products that are not listed here are ignored entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorConfig {
    products: HashMap<String, ProductSettings>,
}

impl OperatorConfig {
    pub fn new(products: HashMap<String, ProductSettings>) -> Self {
        Self { products }
    }

    pub fn with_product<S: Into<String>>(mut self, name: S, settings: ProductSettings) -> Self {
        self.products.insert(name.into(), settings);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ProductSettings> {
        self.products.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }
}
