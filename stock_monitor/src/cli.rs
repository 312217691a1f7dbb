use std::{env, env::VarError};

/// The monitor takes no arguments. If any are given, print the help text and the current settings instead of running.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

/// Settings that are safe to print, with the value used when they are not set. The bot token is deliberately absent.
const DISPLAY_ENVS: [(&str, &str); 15] = [
    ("RUST_LOG", "error"),
    ("SM_TELEGRAM_CHAT_ID", "(none)"),
    ("SM_TELEGRAM_API_URL", "https://api.telegram.org"),
    ("SM_MAX_RETRIES", "3"),
    ("SM_TIMEOUT", "30"),
    ("SM_MONITOR_URLS", "(8 FranTech cart pages)"),
    ("SM_BASE_URL", "https://my.frantech.ca"),
    ("SM_AFFILIATE_ID", "3519"),
    ("SM_TITLE_MARKER", "FranTech"),
    ("SM_PRODUCT_INFO_FILE", "product_info.json"),
    ("SM_CONFIG_FILE", "config.json"),
    ("SM_POLL_INTERVAL", "30"),
    ("SM_MAX_CONCURRENT_SENDS", "2"),
    ("SM_MAX_RATE_LIMIT_WAIT", "(no cap)"),
    ("SM_LOCALE", "zh"),
];

fn display_envs() {
    println!("Current environment values (secrets are never shown):");
    for (name, default) in DISPLAY_ENVS {
        println!("  {name:<30} {}", env_value(name, default));
    }
}

fn env_value(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => format!("{default} [default]"),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
