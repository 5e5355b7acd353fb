use std::time::Duration;

/// A dispatched server-sent event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental `text/event-stream` decoder.
///
/// Bytes may be fed in arbitrary chunks; lines can be split across chunk
/// boundaries, including a `\r\n` pair split between two chunks.
///
/// A single line or a single event's data may not grow past `max_frame`
/// bytes. Past that the decoder stops consuming and reports
/// [`overflowed`](Self::overflowed) until [`reset`](Self::reset).
#[derive(Debug)]
pub struct SseDecoder {
    line: Vec<u8>,
    event_type: Option<String>,
    data: String,
    last_event_id: Option<String>,
    retry: Option<Duration>,
    skip_lf: bool,
    started: bool,
    max_frame: usize,
    overflowed: bool,
}

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const DEFAULT_MAX_FRAME: usize = 4 * 1024 * 1024;

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        SseDecoder {
            line: Vec::new(),
            event_type: None,
            data: String::new(),
            last_event_id: None,
            retry: None,
            skip_lf: false,
            started: false,
            max_frame,
            overflowed: false,
        }
    }

    pub fn max_frame(&self) -> usize {
        self.max_frame
    }

    /// A line or an event grew past `max_frame`. The session is unusable.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Last `id:` seen on the stream, sent back as `Last-Event-ID` on reconnect.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay requested by the server through a `retry:` field.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Forget any partially received event. Called when the connection drops;
    /// the last event id and retry hint survive.
    pub fn reset(&mut self) {
        self.line.clear();
        self.event_type = None;
        self.data.clear();
        self.skip_lf = false;
        self.started = false;
        self.overflowed = false;
    }

    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<SseEvent> {
        let mut out = Vec::new();

        if self.overflowed {
            return out;
        }

        if !self.started {
            self.line.extend_from_slice(chunk);
            if self.line.len() < BOM.len() && BOM.starts_with(&self.line) {
                return out;
            }
            self.started = true;
            let buffered = std::mem::take(&mut self.line);
            let body = buffered.strip_prefix(BOM).unwrap_or(&buffered[..]);
            self.consume(body, &mut out);
            return out;
        }

        while let Some((&byte, rest)) = chunk.split_first() {
            chunk = rest;
            self.consume_byte(byte, &mut out);
        }
        out
    }

    fn consume(&mut self, bytes: &[u8], out: &mut Vec<SseEvent>) {
        for &byte in bytes {
            self.consume_byte(byte, out);
        }
    }

    fn consume_byte(&mut self, byte: u8, out: &mut Vec<SseEvent>) {
        if self.overflowed {
            return;
        }
        if self.skip_lf {
            self.skip_lf = false;
            if byte == b'\n' {
                return;
            }
        }
        match byte {
            b'\r' | b'\n' => {
                self.skip_lf = byte == b'\r';
                let line = std::mem::take(&mut self.line);
                self.process_line(&String::from_utf8_lossy(&line), out);
            }
            _ if self.line.len() >= self.max_frame => self.overflow(),
            _ => self.line.push(byte),
        }
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<SseEvent>) {
        if line.is_empty() {
            self.dispatch(out);
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" if self.data.len() + value.len() >= self.max_frame => self.overflow(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }
    }

    fn overflow(&mut self) {
        self.overflowed = true;
        self.line.clear();
        self.data.clear();
        self.event_type = None;
    }

    fn dispatch(&mut self, out: &mut Vec<SseEvent>) {
        let event_type = self.event_type.take();
        if self.data.is_empty() {
            return;
        }
        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        out.push(SseEvent {
            event: event_type
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "message".to_string()),
            data,
            id: self.last_event_id.clone(),
        });
    }
}
