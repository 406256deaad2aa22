use std::time::Duration;

/// Fixed delay before a reconnection attempt. No jitter, no exponential
/// growth, no attempt cap.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Interval between `get_info` telemetry requests while connected.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bounded wait for a correlated reply before the caller's request fails.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for one command link.
///
/// The timing fields exist so tests can shrink them; production callers
/// should keep the defaults, which match the controller's expectations.
#[derive(Clone)]
pub struct LinkConfig {
    /// Full WebSocket URL, e.g. `ws://192.168.4.1:8000/ws`.
    pub url: String,
    /// Authorization token, sent verbatim as the first frame after connect.
    pub authorization: String,
    pub reconnect_delay: Duration,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl LinkConfig {
    pub fn new(url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: authorization.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for LinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkConfig")
            .field("url", &self.url)
            .field(
                "authorization",
                if self.authorization.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("reconnect_delay", &self.reconnect_delay)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_controller_expectations() {
        let cfg = LinkConfig::new("ws://10.0.0.2:8000/ws", "secret");
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(5));
        assert_eq!(cfg.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_redacts_the_token() {
        let cfg = LinkConfig::new("ws://10.0.0.2:8000/ws", "super-secret-token");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
