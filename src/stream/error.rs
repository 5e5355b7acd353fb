use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("malformed stats payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered with HTTP {0}")]
    Status(u16),

    #[error("endpoint is not an event stream (content-type `{0}`)")]
    ContentType(String),

    #[error("stream closed by server")]
    Ended,

    #[error("no data from server for {}s", .0.as_secs_f64())]
    Idle(std::time::Duration),

    #[error("event frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("stream unavailable after {attempts} failed attempts")]
    Exhausted { attempts: u32 },
}
