#![forbid(unsafe_code)]

//! Remote progress notification.
//!
//! Reporters forward "tour started / completed / skipped" notices to a
//! server for analytics. They are best-effort: a reporter must return
//! quickly, must not retry in the caller's thread, and its failures are
//! logged by the caller and otherwise ignored. Local flags stay the only
//! source of truth for "do not show again".

use std::fmt;
use std::sync::Mutex;

/// Identity of one activation of the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{:x}", self.0)
    }
}

/// What happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressEvent {
    Started,
    Completed,
    Skipped,
}

impl ProgressEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProgressEvent::Started => "started",
            ProgressEvent::Completed => "completed",
            ProgressEvent::Skipped => "skipped",
        }
    }
}

/// A single notice sent to the remote progress API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressNotice {
    pub session: SessionId,
    pub event: ProgressEvent,
}

/// Why a report could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The transport failed (connection refused, timeout, ...).
    Transport(String),
    /// The server answered with a non-success status.
    Rejected(u16),
    /// The reporter is not configured.
    Unavailable(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Transport(msg) => write!(f, "transport error: {msg}"),
            ReportError::Rejected(status) => write!(f, "rejected with status {status}"),
            ReportError::Unavailable(msg) => write!(f, "reporter unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}

/// Fire-and-forget sink for progress notices.
pub trait ProgressReporter: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Deliver (or start delivering) a notice. Must not block on the network.
    fn report(&self, notice: ProgressNotice) -> Result<(), ReportError>;
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn name(&self) -> &str {
        "NoopReporter"
    }

    fn report(&self, _notice: ProgressNotice) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Emits each notice as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn name(&self) -> &str {
        "LogReporter"
    }

    fn report(&self, notice: ProgressNotice) -> Result<(), ReportError> {
        tracing::info!(
            session = %notice.session,
            event = notice.event.as_str(),
            "tour_progress"
        );
        Ok(())
    }
}

/// Keeps every notice in memory; optionally fails every call.
///
/// Used by the demo binary to print what would have been sent, and by tests
/// to assert on remote traffic and to simulate an unreachable server.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    notices: Mutex<Vec<ProgressNotice>>,
    failure: Option<ReportError>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter that records the attempt and then fails with `error`.
    pub fn failing(error: ReportError) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Everything reported so far, in order.
    pub fn notices(&self) -> Vec<ProgressNotice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Events only, in order.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.notices().into_iter().map(|n| n.event).collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn name(&self) -> &str {
        "RecordingReporter"
    }

    fn report(&self, notice: ProgressNotice) -> Result<(), ReportError> {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP reporter (requires remote-progress feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "remote-progress")]
mod http {
    use super::*;
    use std::sync::mpsc;
    use std::thread::JoinHandle;
    use std::time::Duration;

    /// POSTs `{"session": "<id>"}` to `{base_url}/tour/{event}`.
    ///
    /// Notices are queued to a single worker thread, so `report` returns
    /// without touching the network and delivery keeps the order in which
    /// notices were reported. Delivery failures are logged from the worker
    /// and never reach the caller.
    ///
    /// Dropping the reporter closes the queue and waits for the worker to
    /// finish what is already queued (each request bounded by the client
    /// timeout). A process that exits without dropping it loses whatever
    /// is still queued.
    pub struct HttpReporter {
        base_url: String,
        queue: Option<mpsc::Sender<ProgressNotice>>,
        worker: Option<JoinHandle<()>>,
    }

    impl HttpReporter {
        pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

        pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ReportError::Unavailable(e.to_string()))?;
            let base_url = base_url.into().trim_end_matches('/').to_string();

            let (queue, inbox) = mpsc::channel::<ProgressNotice>();
            let worker_base = base_url.clone();
            let worker = std::thread::Builder::new()
                .name("guidepost-progress".into())
                .spawn(move || {
                    for notice in inbox {
                        deliver(&client, &worker_base, notice);
                    }
                })
                .map_err(|e| ReportError::Unavailable(e.to_string()))?;

            Ok(Self {
                base_url,
                queue: Some(queue),
                worker: Some(worker),
            })
        }

        fn endpoint(&self, event: ProgressEvent) -> String {
            endpoint(&self.base_url, event)
        }
    }

    fn endpoint(base_url: &str, event: ProgressEvent) -> String {
        format!("{base_url}/tour/{}", event.as_str())
    }

    fn deliver(client: &reqwest::blocking::Client, base_url: &str, notice: ProgressNotice) {
        let url = endpoint(base_url, notice.event);
        let body = serde_json::json!({ "session": notice.session.to_string() });
        match client.post(&url).json(&body).send() {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(url = %url, "progress reported");
            }
            Ok(resp) => {
                tracing::warn!(url = %url, status = resp.status().as_u16(), "progress report rejected");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "progress report failed");
            }
        }
    }

    impl ProgressReporter for HttpReporter {
        fn name(&self) -> &str {
            "HttpReporter"
        }

        fn report(&self, notice: ProgressNotice) -> Result<(), ReportError> {
            let queue = self
                .queue
                .as_ref()
                .ok_or_else(|| ReportError::Unavailable("progress queue closed".into()))?;
            queue
                .send(notice)
                .map_err(|_| ReportError::Unavailable("progress worker stopped".into()))
        }
    }

    impl Drop for HttpReporter {
        fn drop(&mut self) {
            self.queue.take();
            if let Some(worker) = self.worker.take()
                && worker.join().is_err()
            {
                tracing::warn!("progress worker panicked");
            }
        }
    }

    impl fmt::Debug for HttpReporter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("HttpReporter")
                .field("base_url", &self.base_url)
                .finish()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::{Read, Write};
        use std::net::TcpListener;

        #[test]
        fn endpoint_strips_trailing_slash() {
            let reporter = HttpReporter::new("http://localhost:9/api/", Duration::from_millis(50))
                .unwrap();
            assert_eq!(
                reporter.endpoint(ProgressEvent::Completed),
                "http://localhost:9/api/tour/completed"
            );
        }

        #[test]
        fn unreachable_server_does_not_fail_the_caller() {
            let reporter =
                HttpReporter::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
            let notice = ProgressNotice {
                session: SessionId(1),
                event: ProgressEvent::Started,
            };
            assert!(reporter.report(notice).is_ok());
        }

        #[test]
        fn drop_delivers_queued_notice() {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let server = std::thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                stream
                    .set_read_timeout(Some(Duration::from_secs(5)))
                    .unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.ends_with(b"}") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                    .unwrap();
                String::from_utf8_lossy(&request).into_owned()
            });

            let reporter =
                HttpReporter::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
            reporter
                .report(ProgressNotice {
                    session: SessionId(0xabc),
                    event: ProgressEvent::Completed,
                })
                .unwrap();
            drop(reporter);

            let request = server.join().unwrap();
            assert!(request.starts_with("POST /tour/completed"));
            assert!(request.contains(r#""session":"session-abc""#));
        }
    }
}

#[cfg(feature = "remote-progress")]
pub use http::HttpReporter;
