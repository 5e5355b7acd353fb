use std::sync::Arc;

use tracing::{error, info, warn};

use super::client::{ConnectionState, StreamEvent};
use super::snapshot::SystemSnapshot;

/// The single current client state: the most recent good snapshot plus the
/// health of the subscription that produced it.
///
/// Bad input never mutates the held snapshot. Once closed, every further
/// event is ignored.
#[derive(Debug, Clone)]
pub struct StreamState {
    current: Option<Arc<SystemSnapshot>>,
    /// `current` arrived on the live session. Cleared whenever the session
    /// is lost, set again by the next snapshot.
    fresh: bool,
    connection: ConnectionState,
    last_error: Option<String>,
    snapshots_received: u64,
    decode_errors: u64,
    transport_errors: u64,
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamState {
    pub fn new() -> Self {
        StreamState {
            current: None,
            fresh: false,
            connection: ConnectionState::Disconnected,
            last_error: None,
            snapshots_received: 0,
            decode_errors: 0,
            transport_errors: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&SystemSnapshot> {
        self.current.as_deref()
    }

    /// Shared read-only handle on the current snapshot.
    pub fn shared_snapshot(&self) -> Option<Arc<SystemSnapshot>> {
        self.current.clone()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }

    pub fn transport_errors(&self) -> u64 {
        self.transport_errors
    }

    /// A snapshot is held but nothing newer has arrived since the session
    /// that delivered it was lost. Reconnecting alone does not make it fresh.
    pub fn is_stale(&self) -> bool {
        self.current.is_some() && !self.fresh
    }

    pub fn is_closed(&self) -> bool {
        self.connection == ConnectionState::Closed
    }

    /// Apply one stream event. Returns true when anything visible changed.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        if self.is_closed() {
            return false;
        }

        match event {
            StreamEvent::State(ConnectionState::Closed) => {
                self.close();
            }
            StreamEvent::State(state) => {
                if state == self.connection {
                    return false;
                }
                match state {
                    ConnectionState::Unavailable => {
                        error!("telemetry stream unavailable, reconnect attempts exhausted")
                    }
                    ConnectionState::Reconnecting { attempt } => {
                        warn!(attempt, "telemetry stream reconnecting")
                    }
                    _ => info!(state = state.label(), "telemetry stream state changed"),
                }
                if state == ConnectionState::Streaming {
                    self.last_error = None;
                } else {
                    self.fresh = false;
                }
                self.connection = state;
            }
            StreamEvent::Snapshot(snapshot) => {
                self.current = Some(Arc::new(snapshot));
                self.fresh = true;
                self.snapshots_received += 1;
            }
            StreamEvent::DecodeError(msg) => {
                warn!(error = %msg, "dropping undecodable stats message");
                self.decode_errors += 1;
                self.last_error = Some(msg);
            }
            StreamEvent::TransportError(msg) => {
                warn!(error = %msg, "telemetry stream transport error");
                self.transport_errors += 1;
                self.last_error = Some(msg);
            }
            StreamEvent::ServerError(msg) => {
                warn!(message = %msg, "telemetry server signalled an error");
                self.last_error = Some(format!("server: {msg}"));
            }
        }
        true
    }

    /// Prepare for a fresh subscription. The held snapshot stays displayed
    /// (stale) until the new stream delivers.
    pub fn restart(&mut self) {
        if self.is_closed() {
            return;
        }
        self.connection = ConnectionState::Connecting;
        self.fresh = false;
        self.last_error = None;
    }

    /// Terminal teardown: releases the held snapshot. Idempotent.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        info!(
            snapshots = self.snapshots_received,
            decode_errors = self.decode_errors,
            transport_errors = self.transport_errors,
            "telemetry stream closed"
        );
        self.connection = ConnectionState::Closed;
        self.current = None;
        self.fresh = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::snapshot::ProcessSample;

    fn snapshot(cpu: f64) -> SystemSnapshot {
        SystemSnapshot {
            cpu_usage: cpu,
            mem_usage: 10.0,
            disk_usage: 5.0,
            net_traffic: 1024.0,
            processes: vec![ProcessSample {
                pid: 1,
                name: "init".to_string(),
                cpu_percent: 0.5,
                memory_usage: 2048.0,
            }],
        }
    }

    fn streaming_state() -> StreamState {
        let mut state = StreamState::new();
        state.apply(StreamEvent::State(ConnectionState::Connecting));
        state.apply(StreamEvent::State(ConnectionState::Streaming));
        state
    }

    #[test]
    fn starts_disconnected_and_empty() {
        let state = StreamState::new();
        assert_eq!(state.connection(), ConnectionState::Disconnected);
        assert!(state.snapshot().is_none());
        assert!(!state.is_stale());
    }

    #[test]
    fn snapshot_replaces_previous() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));
        state.apply(StreamEvent::Snapshot(snapshot(2.0)));
        assert_eq!(state.snapshot().unwrap().cpu_usage, 2.0);
        assert_eq!(state.snapshots_received(), 2);
    }

    #[test]
    fn decode_error_keeps_previous_snapshot() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(7.0)));
        let before = state.snapshot().cloned();

        state.apply(StreamEvent::DecodeError("bad".to_string()));

        assert_eq!(state.snapshot().cloned(), before);
        assert_eq!(state.connection(), ConnectionState::Streaming);
        assert_eq!(state.decode_errors(), 1);
        assert_eq!(state.last_error(), Some("bad"));
    }

    #[test]
    fn transport_error_then_reconnect_updates_snapshot() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));

        state.apply(StreamEvent::TransportError("reset".to_string()));
        state.apply(StreamEvent::State(ConnectionState::Reconnecting { attempt: 1 }));
        assert!(state.is_stale());
        assert_eq!(state.snapshot().unwrap().cpu_usage, 1.0);

        state.apply(StreamEvent::State(ConnectionState::Streaming));
        state.apply(StreamEvent::Snapshot(snapshot(9.0)));
        assert!(!state.is_stale());
        assert_eq!(state.snapshot().unwrap().cpu_usage, 9.0);
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn reconnect_stays_stale_until_next_snapshot() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));
        assert!(!state.is_stale());

        state.apply(StreamEvent::State(ConnectionState::Reconnecting { attempt: 1 }));
        state.apply(StreamEvent::State(ConnectionState::Streaming));
        assert_eq!(state.connection(), ConnectionState::Streaming);
        assert!(state.is_stale());

        state.apply(StreamEvent::DecodeError("bad".to_string()));
        assert!(state.is_stale());

        state.apply(StreamEvent::Snapshot(snapshot(2.0)));
        assert!(!state.is_stale());
    }

    #[test]
    fn restart_marks_snapshot_stale() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));
        state.restart();
        state.apply(StreamEvent::State(ConnectionState::Streaming));
        assert!(state.is_stale());
    }

    #[test]
    fn unavailable_marks_last_snapshot_stale() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(3.0)));
        state.apply(StreamEvent::State(ConnectionState::Unavailable));
        assert!(state.is_stale());
        assert_eq!(state.snapshot().unwrap().cpu_usage, 3.0);
    }

    #[test]
    fn closed_is_terminal() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(4.0)));
        state.close();
        assert!(state.snapshot().is_none());
        assert!(state.shared_snapshot().is_none());
        assert!(!state.is_stale());
        state.close();
        state.close();
        assert!(state.is_closed());
        assert!(!state.apply(StreamEvent::Snapshot(snapshot(4.0))));
        assert!(!state.apply(StreamEvent::State(ConnectionState::Streaming)));
        assert!(state.snapshot().is_none());
        assert!(state.is_closed());
    }

    #[test]
    fn decode_error_never_closes() {
        let mut state = streaming_state();
        for _ in 0..5 {
            state.apply(StreamEvent::DecodeError("x".to_string()));
        }
        assert!(!state.is_closed());
    }

    #[test]
    fn restart_keeps_snapshot() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(5.0)));
        state.apply(StreamEvent::State(ConnectionState::Unavailable));
        state.restart();
        assert_eq!(state.connection(), ConnectionState::Connecting);
        assert_eq!(state.snapshot().unwrap().cpu_usage, 5.0);
    }

    #[test]
    fn shared_snapshot_is_not_mutated_by_later_events() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));
        let held = state.shared_snapshot().unwrap();
        state.apply(StreamEvent::Snapshot(snapshot(2.0)));
        assert_eq!(held.cpu_usage, 1.0);
    }

    #[test]
    fn server_error_is_only_a_warning() {
        let mut state = streaming_state();
        state.apply(StreamEvent::Snapshot(snapshot(1.0)));
        state.apply(StreamEvent::ServerError("busy".to_string()));
        assert_eq!(state.connection(), ConnectionState::Streaming);
        assert!(!state.is_stale());
        assert_eq!(state.last_error(), Some("server: busy"));
    }
}
