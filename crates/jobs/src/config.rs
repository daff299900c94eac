use std::time::Duration;

/// Interval between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Slot error text when the server fails a job without giving a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Generation failed.";

/// Tunable parameters for job polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the first check and between subsequent checks.
    pub interval: Duration,
    /// Give up after this many status checks. `None` polls until the job
    /// reaches a terminal status or the poll is cancelled.
    pub max_attempts: Option<u32>,
    /// Error text used when a `failed` job carries no `error`.
    pub failure_message: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl PollConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `BANANA_POLL_INTERVAL_MS`  | `3000`  |
    /// | `BANANA_POLL_MAX_ATTEMPTS` | unset   |
    pub fn from_env() -> Self {
        let interval = std::env::var("BANANA_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_attempts = std::env::var("BANANA_POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0);

        Self {
            interval,
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Whether `attempts` checks exhaust the budget.
    pub fn budget_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}
