//! Snapshot stream: the long-lived `text/event-stream` subscription to the
//! telemetry endpoint and the state cell holding the latest snapshot.

pub mod client;
pub mod error;
pub mod snapshot;
pub mod sse;
pub mod state;

pub use client::{ConnectionState, StreamClient, StreamConfig, StreamEvent};
pub use error::StreamError;
pub use snapshot::{ProcessSample, SystemSnapshot};
pub use state::StreamState;
