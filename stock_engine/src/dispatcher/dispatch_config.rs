use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENCY: usize = 2;
pub const DEFAULT_RETRY_BUDGET: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PACING_MIN: Duration = Duration::from_secs(1);
pub const DEFAULT_PACING_MAX: Duration = Duration::from_secs(3);
pub const DEFAULT_LOOKBACK: usize = 5;

/// Tunables for the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// The number of channel calls that may be in flight at once, across all products and sources.
    pub max_concurrency: usize,
    /// How many timed out attempts a single send or edit may make before giving up. Rate limit waits do not count.
    pub retry_budget: u32,
    /// The pause between timed out attempts.
    pub retry_delay: Duration,
    /// After every successful delivery the dispatcher pauses for a random interval in `pacing_min..=pacing_max`.
    pub pacing_min: Duration,
    pub pacing_max: Duration,
    /// The number of recent messages inspected for duplicates before sending. Zero disables the check.
    pub lookback: usize,
    /// An optional cap on the total time a single send or edit may spend waiting out rate limits. `None` waits for as
    /// long as the channel asks.
    pub max_rate_limit_wait: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retry_budget: DEFAULT_RETRY_BUDGET,
            retry_delay: DEFAULT_RETRY_DELAY,
            pacing_min: DEFAULT_PACING_MIN,
            pacing_max: DEFAULT_PACING_MAX,
            lookback: DEFAULT_LOOKBACK,
            max_rate_limit_wait: None,
        }
    }
}

impl DispatchConfig {
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_pacing(mut self, min: Duration, max: Duration) -> Self {
        self.pacing_min = min;
        self.pacing_max = max;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_max_rate_limit_wait(mut self, cap: Option<Duration>) -> Self {
        self.max_rate_limit_wait = cap;
        self
    }
}
