use serde::{Deserialize, Serialize};

/// Connectivity state of the command link. Exactly one is live per link;
/// transitions are serialised by the link task's single event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    /// Connection attempt in flight.
    Connecting,
    /// Transport open, authorization token sent, waiting for the sentinel.
    Authenticating,
    /// Authenticated; commands flow and telemetry polling runs.
    Connected,
    /// The controller rejected the token. The close path still schedules a
    /// reconnect (which will retry the same token).
    AuthFailed,
    /// Transport-level failure observed; teardown follows.
    Error,
    /// Transport closed. Terminal only after an explicit shutdown.
    Closed,
}

impl LinkState {
    /// Human-readable status line for the console's connectivity banner.
    pub fn describe(&self) -> &'static str {
        match self {
            LinkState::Connecting => "Connecting...",
            LinkState::Authenticating => "Authenticating...",
            LinkState::Connected => "Connected",
            LinkState::AuthFailed => "Authentication Failed",
            LinkState::Error => "Connection Error",
            LinkState::Closed => "Disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connected_reports_connected() {
        assert!(LinkState::Connected.is_connected());
        for state in [
            LinkState::Connecting,
            LinkState::Authenticating,
            LinkState::AuthFailed,
            LinkState::Error,
            LinkState::Closed,
        ] {
            assert!(!state.is_connected());
        }
    }

    #[test]
    fn describe_distinguishes_auth_failure_from_transport_error() {
        assert_ne!(
            LinkState::AuthFailed.describe(),
            LinkState::Error.describe()
        );
    }
}
