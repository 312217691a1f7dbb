use std::{env, path::PathBuf, time::Duration};

use log::*;
use sm_common::helpers::{env_or_default, env_seconds, parse_or_default, split_list};
use stock_engine::{DispatchConfig, MessageFormatter};
use telegram_tools::TelegramConfig;

pub const DEFAULT_MONITOR_URLS: [&str; 8] = [
    "https://my.frantech.ca/cart.php?gid=46",
    "https://my.frantech.ca/cart.php?gid=49",
    "https://my.frantech.ca/cart.php?gid=45",
    "https://my.frantech.ca/cart.php?gid=42",
    "https://my.frantech.ca/cart.php?gid=37",
    "https://my.frantech.ca/cart.php?gid=38",
    "https://my.frantech.ca/cart.php?gid=39",
    "https://my.frantech.ca/cart.php?gid=48",
];
pub const DEFAULT_BASE_URL: &str = "https://my.frantech.ca";
pub const DEFAULT_AFFILIATE_ID: &str = "3519";
pub const DEFAULT_TITLE_MARKER: &str = "FranTech";
pub const DEFAULT_PRODUCT_INFO_FILE: &str = "product_info.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_LOCALE: &str = "zh";

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// The vendor pages that are polled every cycle.
    pub monitor_urls: Vec<String>,
    pub source: SourceConfig,
    /// Where the product snapshots are persisted. If this file does not exist at startup, the first cycle is a cold
    /// start.
    pub product_info_file: PathBuf,
    /// The operator's product list. Re-read at the start of every cycle.
    pub config_file: PathBuf,
    pub poll_interval: Duration,
    pub dispatch: DispatchConfig,
    pub telegram: TelegramConfig,
    pub locale: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitor_urls: DEFAULT_MONITOR_URLS.iter().map(|s| s.to_string()).collect(),
            source: SourceConfig::default(),
            product_info_file: PathBuf::from(DEFAULT_PRODUCT_INFO_FILE),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            dispatch: DispatchConfig::default(),
            telegram: TelegramConfig::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn from_env_or_default() -> Self {
        let monitor_urls = match env::var("SM_MONITOR_URLS") {
            Ok(s) => {
                let urls = split_list(&s);
                if urls.is_empty() {
                    warn!("🪛️ SM_MONITOR_URLS does not contain any URLs. Using the default list instead.");
                    DEFAULT_MONITOR_URLS.iter().map(|s| s.to_string()).collect()
                } else {
                    urls
                }
            },
            Err(_) => {
                info!("🪛️ SM_MONITOR_URLS is not set. Monitoring the {} default pages.", DEFAULT_MONITOR_URLS.len());
                DEFAULT_MONITOR_URLS.iter().map(|s| s.to_string()).collect()
            },
        };
        let source = SourceConfig::from_env_or_default();
        let product_info_file =
            PathBuf::from(env::var("SM_PRODUCT_INFO_FILE").unwrap_or_else(|_| DEFAULT_PRODUCT_INFO_FILE.into()));
        let config_file = PathBuf::from(env::var("SM_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into()));
        let poll_interval = env_seconds("SM_POLL_INTERVAL", DEFAULT_POLL_INTERVAL);
        let dispatch = configure_dispatch(source.max_retries);
        let telegram = TelegramConfig::new_from_env_or_default();
        let locale = env::var("SM_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.into());
        Self { monitor_urls, source, product_info_file, config_file, poll_interval, dispatch, telegram, locale }
    }

    /// The message formatter for the configured locale. Unknown locales fall back to the default.
    pub fn formatter(&self) -> MessageFormatter {
        MessageFormatter::for_locale(&self.locale).unwrap_or_else(|| {
            warn!("🪛️ '{}' is not a supported locale. Using '{DEFAULT_LOCALE}' instead.", self.locale);
            MessageFormatter::default()
        })
    }
}

fn configure_dispatch(retry_budget: u32) -> DispatchConfig {
    let max_concurrency = env_or_default("SM_MAX_CONCURRENT_SENDS", DispatchConfig::default().max_concurrency);
    let max_rate_limit_wait = parse_rate_limit_cap(env::var("SM_MAX_RATE_LIMIT_WAIT").ok());
    DispatchConfig { max_concurrency, retry_budget, max_rate_limit_wait, ..Default::default() }
}

/// The optional cap on rate limit waits, in seconds. Empty, zero and invalid values mean "no cap".
pub fn parse_rate_limit_cap(value: Option<String>) -> Option<Duration> {
    let value = value?;
    if value.trim().is_empty() {
        return None;
    }
    match parse_or_default("SM_MAX_RATE_LIMIT_WAIT", &value, 0u64) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

//-------------------------------------------------  SourceConfig  -----------------------------------------------------
/// How vendor pages are fetched and how their products are turned into records.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Purchase links are rebuilt against this base, e.g. `https://my.frantech.ca/aff.php?aff=3519&pid=1422`.
    pub base_url: String,
    pub affiliate_id: String,
    /// A page whose title does not contain this text is not the vendor's page (e.g. a maintenance or captive portal).
    pub title_marker: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            affiliate_id: DEFAULT_AFFILIATE_ID.to_string(),
            title_marker: DEFAULT_TITLE_MARKER.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_FETCH_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SourceConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = env::var("SM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let affiliate_id = env::var("SM_AFFILIATE_ID").unwrap_or_else(|_| DEFAULT_AFFILIATE_ID.into());
        let title_marker = env::var("SM_TITLE_MARKER").unwrap_or_else(|_| DEFAULT_TITLE_MARKER.into());
        let max_retries = match env_or_default("SM_MAX_RETRIES", DEFAULT_MAX_RETRIES) {
            0 => {
                warn!("🪛️ SM_MAX_RETRIES must be at least 1. Using the default, {DEFAULT_MAX_RETRIES}, instead.");
                DEFAULT_MAX_RETRIES
            },
            n => n,
        };
        let timeout = env_seconds("SM_TIMEOUT", DEFAULT_TIMEOUT);
        Self { base_url, affiliate_id, title_marker, max_retries, retry_delay: DEFAULT_FETCH_RETRY_DELAY, timeout }
    }

    /// The affiliate purchase link for a vendor `href`. The product id is whatever follows the last `=`.
    pub fn purchase_link(&self, href: &str) -> String {
        let pid = href.rsplit('=').next().unwrap_or(href);
        format!("{}/aff.php?aff={}&pid={pid}", self.base_url.trim_end_matches('/'), self.affiliate_id)
    }
}
