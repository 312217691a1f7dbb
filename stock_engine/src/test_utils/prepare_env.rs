use log::*;

use crate::{stock_types::ProductRecord, DispatchConfig};

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// Dispatch settings for tests: no pacing between deliveries and no duplicate lookback.
pub fn quiet_dispatch_config() -> DispatchConfig {
    DispatchConfig::default().with_pacing(Default::default(), Default::default()).with_lookback(0)
}

/// A product record the way the vendor page would describe it.
pub fn product(name: &str, quantity: u64) -> ProductRecord {
    ProductRecord {
        name: name.to_string(),
        price: "$3.50 USD/mo".to_string(),
        features: "1 GB RAM\n20 GB SSD\nUnmetered BW".to_string(),
        availability: format!("{quantity} Available"),
        quantity,
        link: format!("https://my.frantech.ca/aff.php?aff=3519&pid={}", 1000 + name.len()),
    }
}
