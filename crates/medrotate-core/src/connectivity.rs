//! Online/offline state machine
//!
//! Connectivity is sampled, never polled: the state only changes when the
//! embedding view reports a platform signal or asks for a re-check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current reachability of the remote side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Online,
    Offline,
}

impl Connectivity {
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    #[must_use]
    pub const fn is_offline(self) -> bool {
        matches!(self, Self::Offline)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Outcome of feeding a signal into the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// offline -> online
    Reconnected,
    /// online -> offline
    Disconnected,
    /// Signal matched the current state
    Unchanged(Connectivity),
}

/// Two-state connectivity tracker with the offline indicator it drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityMonitor {
    state: Connectivity,
}

impl ConnectivityMonitor {
    #[must_use]
    pub const fn new(initial: Connectivity) -> Self {
        Self { state: initial }
    }

    #[must_use]
    pub const fn state(&self) -> Connectivity {
        self.state
    }

    /// Whether the view should show its "offline" indicator
    #[must_use]
    pub const fn offline_indicator_visible(&self) -> bool {
        self.state.is_offline()
    }

    /// Apply a platform signal and report what changed
    pub fn apply(&mut self, signal: Connectivity) -> Transition {
        let previous = self.state;
        self.state = signal;

        match (previous, signal) {
            (Connectivity::Offline, Connectivity::Online) => {
                tracing::info!("Connectivity restored");
                Transition::Reconnected
            }
            (Connectivity::Online, Connectivity::Offline) => {
                tracing::info!("Connectivity lost; mutations will be queued");
                Transition::Disconnected
            }
            (_, current) => Transition::Unchanged(current),
        }
    }
}

/// Source of the platform connectivity signal
#[allow(async_fn_in_trait)]
pub trait ConnectivityProbe {
    async fn sample(&self) -> Connectivity;
}

/// Probe that always reports the same state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProbe(pub Connectivity);

impl ConnectivityProbe for FixedProbe {
    async fn sample(&self) -> Connectivity {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_is_reported_once() {
        let mut monitor = ConnectivityMonitor::new(Connectivity::Offline);
        assert!(monitor.offline_indicator_visible());

        assert_eq!(monitor.apply(Connectivity::Online), Transition::Reconnected);
        assert!(!monitor.offline_indicator_visible());
        assert_eq!(
            monitor.apply(Connectivity::Online),
            Transition::Unchanged(Connectivity::Online)
        );
    }

    #[test]
    fn disconnect_shows_indicator() {
        let mut monitor = ConnectivityMonitor::new(Connectivity::Online);
        assert_eq!(monitor.apply(Connectivity::Offline), Transition::Disconnected);
        assert_eq!(monitor.state(), Connectivity::Offline);
        assert!(monitor.offline_indicator_visible());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fixed_probe_reports_its_state() {
        assert_eq!(
            FixedProbe(Connectivity::Offline).sample().await,
            Connectivity::Offline
        );
    }
}
