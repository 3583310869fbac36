#![forbid(unsafe_code)]

//! Guidepost Runtime
//!
//! Effect plumbing for the walkthrough engine. Nothing here knows what a
//! tour step is; the engine in `guidepost-tour` composes these pieces.
//!
//! # Key Components
//!
//! - [`FlagRegistry`] - cached boolean flags over a pluggable [`StorageBackend`]
//! - [`TimerQueue`] - virtual-clock continuations with synchronous cancellation
//! - [`ProgressReporter`] - best-effort remote progress notification
//!
//! # Role in Guidepost
//! The engine is single-threaded and event driven. Durable state and the
//! passage of time both enter through this crate, which keeps the state
//! machine itself free of I/O and wall clocks.

pub mod flag_store;
pub mod progress;
pub mod timer;

// Flag persistence
#[cfg(feature = "state-persistence")]
pub use flag_store::FileStorage;
pub use flag_store::{
    FlagEntry, FlagRegistry, MemoryStorage, StorageBackend, StorageError, StorageResult,
    now_unix_ms,
};

#[cfg(feature = "remote-progress")]
pub use progress::HttpReporter;
pub use progress::{
    LogReporter, NoopReporter, ProgressEvent, ProgressNotice, ProgressReporter, RecordingReporter,
    ReportError, SessionId,
};

pub use timer::{Fired, TimerId, TimerQueue};
