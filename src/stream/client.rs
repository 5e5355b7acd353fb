use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::StreamError;
use super::snapshot::SystemSnapshot;
use super::sse::{SseDecoder, SseEvent};

pub const STATS_EVENT: &str = "stats";
pub const ERROR_EVENT: &str = "error";

const LAST_EVENT_ID: &str = "Last-Event-ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Streaming,
    Reconnecting { attempt: u32 },
    /// Reconnect attempts exhausted. Persistent until a new client is started.
    Unavailable,
    Closed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Streaming => "Live",
            ConnectionState::Reconnecting { .. } => "Reconnecting",
            ConnectionState::Unavailable => "Unavailable",
            ConnectionState::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    State(ConnectionState),
    Snapshot(SystemSnapshot),
    DecodeError(String),
    TransportError(String),
    /// An `error` event sent by the server. Liveness warning only.
    ServerError(String),
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    pub retry_delay: Duration,
    /// Consecutive reconnect attempts before giving up. `0` retries forever.
    pub max_retries: u32,
    pub connect_timeout: Duration,
    /// Longest silence tolerated on an open stream before it is treated as
    /// dropped. Server comments count as traffic.
    pub idle_timeout: Duration,
}

impl StreamConfig {
    pub fn new(url: impl Into<String>) -> Self {
        StreamConfig {
            url: url.into(),
            retry_delay: Duration::from_millis(3000),
            max_retries: 10,
            connect_timeout: Duration::from_millis(5000),
            idle_timeout: Duration::from_millis(30_000),
        }
    }
}

/// One logical subscription to the telemetry endpoint.
///
/// The connection runs as a task on the current tokio runtime and hands
/// events back in the order they were received. Dropping the client tears
/// the subscription down.
pub struct StreamClient {
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl StreamClient {
    pub fn connect(config: StreamConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
        info!(url = %config.url, "subscribing to event stream");
        let task = tokio::spawn(run(config, tx));
        StreamClient {
            rx,
            task: Some(task),
            closed: false,
        }
    }

    /// Next event from the stream. `None` once the client is closed or the
    /// connection task has given up and every pending event was delivered.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Cancel the subscription. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        debug!("event stream closed");
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.close();
    }
}

enum SessionEnd {
    /// `delivered` is true when at least one event reached the receiver.
    Dropped { err: StreamError, delivered: bool },
    ReceiverGone,
}

async fn run(config: StreamConfig, tx: mpsc::UnboundedSender<StreamEvent>) {
    if tx
        .send(StreamEvent::State(ConnectionState::Connecting))
        .is_err()
    {
        return;
    }

    let http = match reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()
    {
        Ok(http) => http,
        Err(err) => {
            let err = StreamError::from(err);
            warn!(error = %err, "failed to build http client");
            let _ = tx.send(StreamEvent::TransportError(err.to_string()));
            let _ = tx.send(StreamEvent::State(ConnectionState::Unavailable));
            return;
        }
    };

    let mut decoder = SseDecoder::new();
    let mut failures: u32 = 0;

    loop {
        let last_event_id = decoder.last_event_id().map(str::to_owned);
        let err = match open(&http, &config, last_event_id.as_deref()).await {
            Ok(response) => {
                info!(url = %config.url, "event stream connected");
                if tx
                    .send(StreamEvent::State(ConnectionState::Streaming))
                    .is_err()
                {
                    return;
                }
                match pump(response, &mut decoder, config.idle_timeout, &tx).await {
                    SessionEnd::Dropped { err, delivered } => {
                        // Only a session that delivered something counts as recovered.
                        if delivered {
                            failures = 0;
                        }
                        err
                    }
                    SessionEnd::ReceiverGone => return,
                }
            }
            Err(err) => err,
        };

        warn!(error = %err, "event stream interrupted");
        if tx.send(StreamEvent::TransportError(err.to_string())).is_err() {
            return;
        }

        decoder.reset();
        failures = failures.saturating_add(1);
        if config.max_retries > 0 && failures > config.max_retries {
            let _ = tx.send(StreamEvent::State(ConnectionState::Unavailable));
            return;
        }

        if tx
            .send(StreamEvent::State(ConnectionState::Reconnecting {
                attempt: failures,
            }))
            .is_err()
        {
            return;
        }

        let delay = decoder.retry().unwrap_or(config.retry_delay);
        debug!(attempt = failures, delay_ms = delay.as_millis() as u64, "waiting to reconnect");
        tokio::time::sleep(delay).await;
    }
}

async fn open(
    http: &reqwest::Client,
    config: &StreamConfig,
    last_event_id: Option<&str>,
) -> Result<reqwest::Response, StreamError> {
    let mut request = http
        .get(&config.url)
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache");
    if let Some(id) = last_event_id {
        request = request.header(LAST_EVENT_ID, id);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("text/event-stream") {
        return Err(StreamError::ContentType(content_type.to_string()));
    }

    Ok(response)
}

async fn pump(
    response: reqwest::Response,
    decoder: &mut SseDecoder,
    idle_timeout: Duration,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> SessionEnd {
    let mut body = response.bytes_stream();
    let mut delivered = false;
    loop {
        let chunk = match tokio::time::timeout(idle_timeout, body.next()).await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(_) => {
                return SessionEnd::Dropped {
                    err: StreamError::Idle(idle_timeout),
                    delivered,
                };
            }
        };
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                return SessionEnd::Dropped {
                    err: err.into(),
                    delivered,
                };
            }
        };
        for event in decoder.feed(&bytes) {
            if let Some(event) = translate(event) {
                if tx.send(event).is_err() {
                    return SessionEnd::ReceiverGone;
                }
                delivered = true;
            }
        }
        if decoder.overflowed() {
            return SessionEnd::Dropped {
                err: StreamError::FrameTooLarge {
                    limit: decoder.max_frame(),
                },
                delivered,
            };
        }
    }
    SessionEnd::Dropped {
        err: StreamError::Ended,
        delivered,
    }
}

fn translate(event: SseEvent) -> Option<StreamEvent> {
    match event.event.as_str() {
        STATS_EVENT => Some(match SystemSnapshot::from_json(&event.data) {
            Ok(snapshot) => StreamEvent::Snapshot(snapshot),
            Err(err) => StreamEvent::DecodeError(StreamError::from(err).to_string()),
        }),
        ERROR_EVENT => Some(StreamEvent::ServerError(event.data)),
        other => {
            debug!(event = other, "ignoring unrecognised event type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sse(event: &str, data: &str) -> SseEvent {
        SseEvent {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn stats_event_becomes_snapshot() {
        let payload = r#"{"cpuUsage":1,"memUsage":2,"diskUsage":3,"netTraffic":4,"processes":[]}"#;
        match translate(sse("stats", payload)) {
            Some(StreamEvent::Snapshot(snapshot)) => assert_eq!(snapshot.disk_usage, 3.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_stats_payload_becomes_decode_error() {
        match translate(sse("stats", "{oops")) {
            Some(StreamEvent::DecodeError(msg)) => assert!(msg.starts_with("malformed stats payload")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_event_is_a_server_warning() {
        assert_eq!(
            translate(sse("error", "overloaded")),
            Some(StreamEvent::ServerError("overloaded".to_string()))
        );
    }

    #[test]
    fn unknown_events_are_dropped() {
        assert_eq!(translate(sse("message", "{}")), None);
        assert_eq!(translate(sse("ping", "")), None);
    }

    #[test]
    fn state_labels() {
        assert_eq!(ConnectionState::Streaming.label(), "Live");
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 3 }.label(),
            "Reconnecting"
        );
        assert_eq!(ConnectionState::Unavailable.label(), "Unavailable");
    }

    #[tokio::test]
    async fn close_is_idempotent_and_silences_the_stream() {
        let mut config = StreamConfig::new("http://127.0.0.1:9/api/events");
        config.retry_delay = Duration::from_secs(60);
        let mut client = StreamClient::connect(config);
        client.close();
        client.close();
        assert!(client.is_closed());
        assert_eq!(client.next_event().await, None);
    }
}
