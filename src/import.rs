//! Import pipeline: local artifact file to bulk import call.

use crate::client::AdminApi;
use crate::error::{AppError, Result};
use crate::notify::{Notification, NotificationSink};
use crate::tracker::{OperationState, OperationTracker};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Fallback notification detail when a failed import carries no message.
const IMPORT_FALLBACK_MESSAGE: &str = "Invalid Imported File";

/// Import dialog phase. No close affordance exists while `Importing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Reading,
    Importing,
    Closed,
}

/// Host side effects fired after a successful import.
pub trait SessionHooks {
    /// Clear the shared "unsaved changes" indicator.
    fn clear_dirty(&mut self);

    /// Ask the environment to reload its data views.
    fn request_reload(&mut self);
}

/// Terminal outcome of one import dialog instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    Failed(String),
}

/// Import dialog lifecycle.
///
/// All-or-nothing: whatever the file contains goes to the server as a single
/// bulk import, with no category selection.
pub struct ImportDialog {
    phase: ImportPhase,
    tracker: OperationTracker<Value>,
}

/// Read the file as text and require valid JSON.
fn read_import_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| AppError::parse(format!("invalid JSON: {e}")))
}

impl ImportDialog {
    pub fn open() -> Self {
        Self {
            phase: ImportPhase::Idle,
            tracker: OperationTracker::new(),
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// Read and parse the chosen file, then fire the bulk import call.
    ///
    /// Unreadable or non-JSON content aborts before any remote call is made,
    /// closing the dialog with a failure notification and returning the
    /// terminal outcome immediately.
    pub fn begin_import(
        &mut self,
        path: &Path,
        handle: &tokio::runtime::Handle,
        api: Arc<dyn AdminApi>,
        sink: &mut dyn NotificationSink,
    ) -> Option<ImportOutcome> {
        if self.phase != ImportPhase::Idle {
            return None;
        }
        self.phase = ImportPhase::Reading;

        let body = match read_import_file(path) {
            Ok(body) => body,
            Err(e) => {
                let message = format!(
                    "Failed to import: {}",
                    e.user_message(IMPORT_FALLBACK_MESSAGE)
                );
                sink.enqueue(Notification::failure(message.clone()));
                self.phase = ImportPhase::Closed;
                return Some(ImportOutcome::Failed(message));
            }
        };

        info!(path = %path.display(), "starting bulk import");
        self.phase = ImportPhase::Importing;
        self.tracker
            .start(handle, async move { api.import_data(&body).await });
        None
    }

    /// Close request from the host. Refused while the call is in flight.
    pub fn request_close(&mut self) {
        if self.phase != ImportPhase::Importing {
            self.phase = ImportPhase::Closed;
        }
    }

    /// Pump the tracker. A successful settle fires the success notification,
    /// the dirty-state clear, and the reload signal, in that order; a failed
    /// one pushes a persistent failure notification. Either way the dialog
    /// closes and the terminal outcome is returned exactly once.
    pub fn poll(
        &mut self,
        sink: &mut dyn NotificationSink,
        hooks: &mut dyn SessionHooks,
    ) -> Option<ImportOutcome> {
        if self.phase != ImportPhase::Importing || !self.tracker.poll() {
            return None;
        }

        let outcome = match self.tracker.take() {
            OperationState::Succeeded(_ack) => {
                sink.enqueue(Notification::success("Import All successful"));
                hooks.clear_dirty();
                hooks.request_reload();
                ImportOutcome::Imported
            }
            OperationState::Failed(e) => {
                let message = format!(
                    "Failed to import: {}",
                    e.user_message(IMPORT_FALLBACK_MESSAGE)
                );
                sink.enqueue(Notification::failure(message.clone()));
                ImportOutcome::Failed(message)
            }
            // poll() reported a settle, so Idle/Pending cannot be here.
            _ => return None,
        };

        self.phase = ImportPhase::Closed;
        Some(outcome)
    }
}
