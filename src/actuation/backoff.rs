use std::time::Duration;

pub const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
pub const BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Exponential delay between reconnect attempts to the sensing node.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    delay: Duration,
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        Self {
            delay: BACKOFF_INITIAL,
        }
    }

    /// Delay to wait before the next attempt. Doubles on every call, capped
    /// at [`BACKOFF_MAX`].
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = self.delay.saturating_mul(2).min(BACKOFF_MAX);
        current
    }

    /// Called after a successful connect.
    pub fn reset(&mut self) {
        self.delay = BACKOFF_INITIAL;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}
