use log::*;
use stock_engine::{
    traits::{OperatorConfigSource, SnapshotStore},
    Dispatcher,
    JsonFileStore,
    ProductTracker,
};
use telegram_tools::TelegramApi;

use crate::{
    config::MonitorConfig,
    errors::MonitorError,
    integrations::{telegram::TelegramChannel, vendor_page::VendorPageSource},
    monitor_worker::MonitorWorker,
    operator_config::JsonOperatorConfig,
};

/// Wire up the monitor from its configuration and run it until the process is stopped.
pub async fn run_monitor(config: MonitorConfig) -> Result<(), MonitorError> {
    let worker = create_monitor_instance(&config).await?;
    let cold_start = !worker.tracker().store().exists();
    worker.run(cold_start).await;
    Ok(())
}

pub async fn create_monitor_instance(
    config: &MonitorConfig,
) -> Result<MonitorWorker<VendorPageSource, JsonOperatorConfig, JsonFileStore, TelegramChannel>, MonitorError> {
    let operator_config = JsonOperatorConfig::new(config.config_file.clone());
    let settings = operator_config.load_settings().await;
    if settings.is_empty() {
        return Err(MonitorError::ConfigUnavailable(operator_config.path_str()));
    }
    info!("🚀️ {} products are configured in {}", settings.len(), operator_config.path_str());
    let client = VendorPageSource::http_client(&config.source)?;
    let sources = config
        .monitor_urls
        .iter()
        .map(|url| VendorPageSource::new(url, config.source.clone(), client.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    let api = TelegramApi::new(config.telegram.clone())?;
    let dispatcher = Dispatcher::new(TelegramChannel::new(api), config.dispatch.clone());
    let store = JsonFileStore::new(config.product_info_file.clone());
    let tracker = ProductTracker::load(store, dispatcher, config.formatter()).await?;
    Ok(MonitorWorker::new(sources, operator_config, tracker, config.poll_interval))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use sm_common::Secret;
    use telegram_tools::TelegramConfig;

    use super::*;

    const SETTINGS: &str = r#"{"products": {"SLICE 1024 LV": {"notify": true}}}"#;

    fn config_in(dir: &std::path::Path) -> MonitorConfig {
        MonitorConfig {
            monitor_urls: vec!["http://127.0.0.1:1/cart.php?gid=46".into()],
            product_info_file: dir.join("product_info.json"),
            config_file: dir.join("config.json"),
            telegram: TelegramConfig {
                bot_token: Secret::new("123:abc".to_string()),
                chat_id: "-100123".into(),
                api_url: "http://127.0.0.1:1".into(),
                timeout: Duration::from_secs(5),
            },
            ..MonitorConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_operator_config_stops_the_monitor() {
        let _ = env_logger::try_init();
        let dir = tempfile::tempdir().unwrap();
        let result = run_monitor(config_in(dir.path())).await;
        assert!(matches!(result, Err(MonitorError::ConfigUnavailable(_))), "{result:?}");
    }

    #[tokio::test]
    async fn unreadable_state_stops_the_monitor() {
        let _ = env_logger::try_init();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), SETTINGS).unwrap();
        std::fs::write(dir.path().join("product_info.json"), "{ \"SLICE 1024 LV\": ").unwrap();
        let result = run_monitor(config_in(dir.path())).await;
        assert!(matches!(result, Err(MonitorError::TrackerError(_))), "{result:?}");
    }

    #[tokio::test]
    async fn missing_bot_token_stops_the_monitor() {
        let _ = env_logger::try_init();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), SETTINGS).unwrap();
        let mut config = config_in(dir.path());
        config.telegram.bot_token = Secret::default();
        let result = run_monitor(config).await;
        assert!(matches!(result, Err(MonitorError::ChannelInitialization(_))), "{result:?}");
    }
}
