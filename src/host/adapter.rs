// src/host/adapter.rs

//! The callback surface engine backends report through.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::host::sink::{LogSink, ProgressSink};
use crate::host::{HostCapability, HostError};
use crate::types::{LogCategory, LogLine, ProgressEvent};

/// Credentials an engine could ask for. Never produced; see
/// [`HostAdapter::prompt_for_credential`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_name: String,
    pub secret: String,
}

/// Host handed to an engine backend when its context is opened.
///
/// Cheap to clone; clones share the same sinks and instance id.
///
/// Output methods post to the injected sinks and return immediately.
/// Interactive methods always fail with [`HostError::UnsupportedCapability`]
/// and also write the refusal to the error channel.
#[derive(Clone)]
pub struct HostAdapter {
    inner: Arc<HostInner>,
}

struct HostInner {
    instance_id: Uuid,
    log_sink: Arc<dyn LogSink>,
    progress_sink: Arc<dyn ProgressSink>,
}

impl fmt::Debug for HostAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAdapter")
            .field("name", &Self::NAME)
            .field("instance_id", &self.inner.instance_id)
            .finish_non_exhaustive()
    }
}

impl HostAdapter {
    pub const NAME: &'static str = "isoforge.EngineHost";

    pub fn new(log_sink: Arc<dyn LogSink>, progress_sink: Arc<dyn ProgressSink>) -> Self {
        let instance_id = Uuid::new_v4();
        debug!(%instance_id, "engine host created");
        Self {
            inner: Arc::new(HostInner {
                instance_id,
                log_sink,
                progress_sink,
            }),
        }
    }

    /// Use one value as both log and progress sink.
    pub fn with_sink<S>(sink: S) -> Self
    where
        S: LogSink + ProgressSink + 'static,
    {
        let sink = Arc::new(sink);
        Self::new(sink.clone(), sink)
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    // --- output -----------------------------------------------------------

    /// Raw write without a line terminator.
    pub fn on_text(&self, text: &str) {
        self.emit(LogCategory::Text, text, false);
    }

    pub fn on_line(&self, text: &str) {
        self.emit(LogCategory::Text, text, true);
    }

    pub fn on_error_line(&self, text: &str) {
        self.emit(LogCategory::Error, text, true);
    }

    pub fn on_warning_line(&self, text: &str) {
        self.emit(LogCategory::Warning, text, true);
    }

    pub fn on_verbose_line(&self, text: &str) {
        self.emit(LogCategory::Verbose, text, true);
    }

    pub fn on_debug_line(&self, text: &str) {
        self.emit(LogCategory::Debug, text, true);
    }

    pub fn emit(&self, category: LogCategory, text: &str, terminated: bool) {
        trace!(target: "isoforge::engine", %category, "{}", text);
        self.inner.log_sink.post_line(LogLine {
            category,
            text: text.to_string(),
            terminated,
        });
    }

    /// Forward a progress report, clamping `percent` into `0..=100`.
    pub fn on_progress(&self, source_id: i64, percent: i32, activity: Option<&str>) {
        if !(0..=100).contains(&percent) {
            debug!(source_id, percent, "engine reported out-of-range progress; clamping");
        }
        let clamped = percent.clamp(0, 100) as u8;
        trace!(target: "isoforge::engine", source_id, percent = clamped, "progress");
        self.inner.progress_sink.post_progress(ProgressEvent {
            source_id,
            percent: clamped,
            activity: activity.map(str::to_string),
        });
    }

    // --- interactive capabilities (all refused) ----------------------------

    pub fn prompt(
        &self,
        _caption: &str,
        _message: &str,
        _fields: &[String],
    ) -> Result<BTreeMap<String, String>, HostError> {
        Err(self.refuse(HostCapability::Prompt))
    }

    pub fn prompt_for_choice(
        &self,
        _caption: &str,
        _message: &str,
        _choices: &[String],
        _default_choice: Option<usize>,
    ) -> Result<usize, HostError> {
        Err(self.refuse(HostCapability::PromptForChoice))
    }

    pub fn prompt_for_credential(
        &self,
        _caption: &str,
        _message: &str,
        _user_name: &str,
        _target_name: &str,
    ) -> Result<Credential, HostError> {
        Err(self.refuse(HostCapability::PromptForCredential))
    }

    pub fn read_line(&self) -> Result<String, HostError> {
        Err(self.refuse(HostCapability::ReadLine))
    }

    pub fn read_line_as_secure_string(&self) -> Result<String, HostError> {
        Err(self.refuse(HostCapability::ReadLineAsSecureString))
    }

    pub fn enter_nested_prompt(&self) -> Result<(), HostError> {
        Err(self.refuse(HostCapability::NestedPrompt))
    }

    /// Refuse `capability`, recording the refusal on the error channel.
    ///
    /// Backends that learn about an interactive request out of band (e.g. a
    /// record on a wire protocol) call this directly.
    pub fn refuse(&self, capability: HostCapability) -> HostError {
        warn!(%capability, "engine requested an interactive host capability; refusing");
        self.on_error_line(&format!(
            "engine requested unsupported host capability '{capability}'"
        ));
        HostError::UnsupportedCapability { capability }
    }
}
