#![forbid(unsafe_code)]

//! Logging setup.
//!
//! The pure geometry crates log through [`trace!`](crate::trace), which
//! forwards to `tracing` when the `tracing` feature is on and expands to
//! nothing otherwise, so placement math carries no logging dependency by
//! default. Crates that already depend on `tracing` use it directly.
//!
//! With `tracing-json`, [`init_subscriber`] installs a global `fmt` subscriber whose
//! filter comes from `GUIDEPOST_LOG`, then `RUST_LOG`, then `info`.

#[cfg(feature = "tracing")]
pub use tracing::trace;

/// Environment variable consulted first for the log filter directive.
pub const LOG_ENV: &str = "GUIDEPOST_LOG";

/// No-op trace macro when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// The global subscriber could not be installed (usually: one is already set).
#[derive(Debug)]
pub struct SubscriberInitError(pub String);

impl std::fmt::Display for SubscriberInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install tracing subscriber: {}", self.0)
    }
}

impl std::error::Error for SubscriberInitError {}

/// Install a global `fmt` subscriber writing to stderr.
///
/// `json` selects line-delimited JSON output instead of the human format.
#[cfg(feature = "tracing-json")]
pub fn init_subscriber(json: bool) -> Result<(), SubscriberInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    result.map_err(|e| SubscriberInitError(e.to_string()))
}
