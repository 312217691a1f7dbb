use dotenvy::dotenv;
use log::info;
use stock_monitor::{cli::handle_command_line_args, config::MonitorConfig, monitor::run_monitor};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = MonitorConfig::from_env_or_default();

    info!("🚀️ Starting the stock monitor for {} pages", config.monitor_urls.len());
    match run_monitor(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}
