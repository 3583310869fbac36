#![forbid(unsafe_code)]

//! Durable completion flags and remote progress.
//!
//! Every record call writes the local flag and flushes it first, then hands
//! a notice to the remote reporter. Reporter errors are logged and dropped;
//! they never touch the local flag. The local flag alone decides
//! "do not show again".

use std::fmt;
use std::sync::Arc;

use guidepost_runtime::{
    FlagRegistry, NoopReporter, ProgressEvent, ProgressNotice, ProgressReporter, SessionId,
};

/// Flag-store keys used by the engine and the default eligibility policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagKeys {
    pub completed: String,
    pub skipped: String,
    pub welcome_shown: String,
    pub onboarding_completed: String,
}

impl Default for FlagKeys {
    fn default() -> Self {
        Self {
            completed: "tour-completed".into(),
            skipped: "tour-skipped".into(),
            welcome_shown: "welcome-shown".into(),
            onboarding_completed: "onboarding-completed".into(),
        }
    }
}

/// Outcome of past sessions as seen by the flag store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionRecord {
    pub completed: bool,
    pub skipped: bool,
    /// Unix milliseconds of the latest completed/skipped write.
    pub timestamp_ms: Option<u64>,
}

impl CompletionRecord {
    pub fn is_finished(&self) -> bool {
        self.completed || self.skipped
    }
}

#[derive(Clone)]
pub struct PersistenceBridge {
    flags: Arc<FlagRegistry>,
    reporter: Arc<dyn ProgressReporter>,
    keys: FlagKeys,
}

impl PersistenceBridge {
    pub fn new(flags: Arc<FlagRegistry>, reporter: Arc<dyn ProgressReporter>, keys: FlagKeys) -> Self {
        Self {
            flags,
            reporter,
            keys,
        }
    }

    /// In-memory flags, no remote reporting.
    pub fn in_memory() -> Self {
        Self::new(
            FlagRegistry::in_memory().shared(),
            Arc::new(NoopReporter),
            FlagKeys::default(),
        )
    }

    pub fn flags(&self) -> &Arc<FlagRegistry> {
        &self.flags
    }

    pub fn keys(&self) -> &FlagKeys {
        &self.keys
    }

    pub fn record_start(&self, session: SessionId) {
        self.notify(session, ProgressEvent::Started);
    }

    pub fn record_complete(&self, session: SessionId) {
        self.write_flag(&self.keys.completed);
        self.notify(session, ProgressEvent::Completed);
    }

    pub fn record_skip(&self, session: SessionId) {
        self.write_flag(&self.keys.skipped);
        self.notify(session, ProgressEvent::Skipped);
    }

    /// Declining the welcome gate: local skip, nothing sent remotely.
    pub fn record_decline(&self) {
        self.flags.set(self.keys.welcome_shown.clone(), true);
        self.write_flag(&self.keys.skipped);
    }

    pub fn mark_welcome_shown(&self) {
        self.write_flag(&self.keys.welcome_shown);
    }

    /// Whether a completed or skipped session has been recorded.
    pub fn is_finished(&self) -> bool {
        self.completion_record().is_finished()
    }

    pub fn completion_record(&self) -> CompletionRecord {
        let completed = self.flags.entry(&self.keys.completed).filter(|e| e.value);
        let skipped = self.flags.entry(&self.keys.skipped).filter(|e| e.value);
        let timestamp_ms = completed
            .iter()
            .chain(skipped.iter())
            .map(|e| e.updated_at_ms)
            .max();
        CompletionRecord {
            completed: completed.is_some(),
            skipped: skipped.is_some(),
            timestamp_ms,
        }
    }

    fn write_flag(&self, key: &str) {
        self.flags.set(key.to_string(), true);
        if let Err(e) = self.flags.flush() {
            tracing::error!(key, error = %e, "failed to persist walkthrough flag");
        }
    }

    fn notify(&self, session: SessionId, event: ProgressEvent) {
        let notice = ProgressNotice { session, event };
        if let Err(e) = self.reporter.report(notice) {
            tracing::warn!(
                reporter = self.reporter.name(),
                %session,
                event = event.as_str(),
                error = %e,
                "remote_notify_failure"
            );
        }
    }
}

impl fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceBridge")
            .field("flags", &self.flags)
            .field("reporter", &self.reporter.name())
            .field("keys", &self.keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidepost_runtime::{RecordingReporter, ReportError};

    #[test]
    fn complete_writes_flag_then_reports() {
        let reporter = Arc::new(RecordingReporter::new());
        let bridge = PersistenceBridge::new(
            FlagRegistry::in_memory().shared(),
            reporter.clone(),
            FlagKeys::default(),
        );
        assert!(!bridge.is_finished());
        bridge.record_start(SessionId(3));
        bridge.record_complete(SessionId(3));
        let record = bridge.completion_record();
        assert!(record.completed);
        assert!(!record.skipped);
        assert!(record.timestamp_ms.is_some());
        assert_eq!(
            reporter.events(),
            vec![ProgressEvent::Started, ProgressEvent::Completed]
        );
    }

    #[test]
    fn remote_failure_keeps_local_flag() {
        let reporter = Arc::new(RecordingReporter::failing(ReportError::Transport(
            "connection refused".into(),
        )));
        let bridge = PersistenceBridge::new(
            FlagRegistry::in_memory().shared(),
            reporter.clone(),
            FlagKeys::default(),
        );
        bridge.record_skip(SessionId(9));
        assert!(bridge.completion_record().skipped);
        assert!(bridge.flags().get("tour-skipped"));
        assert_eq!(reporter.notices().len(), 1);
    }

    #[test]
    fn decline_is_local_only() {
        let reporter = Arc::new(RecordingReporter::new());
        let bridge = PersistenceBridge::new(
            FlagRegistry::in_memory().shared(),
            reporter.clone(),
            FlagKeys::default(),
        );
        bridge.record_decline();
        assert!(bridge.is_finished());
        assert!(bridge.flags().get("welcome-shown"));
        assert!(reporter.notices().is_empty());
    }
}
