use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;

/// Read and parse the environment variable `name`. Missing values are silently replaced by `default`. Values that do
/// not parse are logged and replaced by `default`.
pub fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => parse_or_default(name, &s, default),
        Err(_) => default,
    }
}

/// Parse `value` as a `T`, logging and falling back to `default` if it is not valid.
pub fn parse_or_default<T>(name: &str, value: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    value.trim().parse::<T>().unwrap_or_else(|e| {
        warn!("🪛️ {value} is not a valid value for {name}. {e} Using the default, {default}, instead.");
        default
    })
}

/// Read a whole number of seconds from the environment variable `name`.
pub fn env_seconds(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_or_default(name, default.as_secs()))
}

/// Split a comma-separated list, trimming whitespace and dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
