//! Shared test doubles for the pipeline and dialog tests.

use crate::client::{AdminApi, VersionInfo};
use crate::error::{AppError, Result};
use crate::export::{ArtifactSaver, ExportArtifact, ExportRequest, ExportResponse};
use crate::import::SessionHooks;
use crate::notify::{Notification, NotificationSink, Severity};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-process stand-in for the remote server.
///
/// Results are primed per call; a gated call stays pending until released.
pub struct FakeApi {
    export_result: Mutex<Option<Result<ExportResponse>>>,
    import_result: Mutex<Option<Result<Value>>>,
    pub export_calls: AtomicUsize,
    pub import_calls: AtomicUsize,
    pub last_export_request: Mutex<Option<ExportRequest>>,
    gate_export: AtomicBool,
    gate_import: AtomicBool,
    version: String,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            export_result: Mutex::new(None),
            import_result: Mutex::new(None),
            export_calls: AtomicUsize::new(0),
            import_calls: AtomicUsize::new(0),
            last_export_request: Mutex::new(None),
            gate_export: AtomicBool::new(false),
            gate_import: AtomicBool::new(false),
            version: "0.0.0-test".to_string(),
        })
    }

    pub fn prime_export(&self, result: Result<ExportResponse>) {
        *self.export_result.lock().unwrap() = Some(result);
    }

    pub fn prime_import(&self, result: Result<Value>) {
        *self.import_result.lock().unwrap() = Some(result);
    }

    /// True while a primed export result has not been consumed by a call.
    pub fn has_primed_export(&self) -> bool {
        self.export_result.lock().unwrap().is_some()
    }

    pub fn hold_export(&self) {
        self.gate_export.store(true, Ordering::SeqCst);
    }

    pub fn release_export(&self) {
        self.gate_export.store(false, Ordering::SeqCst);
    }

    pub fn hold_import(&self) {
        self.gate_import.store(true, Ordering::SeqCst);
    }

    pub fn release_import(&self) {
        self.gate_import.store(false, Ordering::SeqCst);
    }

    async fn wait_gate(gate: &AtomicBool) {
        while gate.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn export_data(&self, request: &ExportRequest) -> Result<ExportResponse> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_export_request.lock().unwrap() = Some(request.clone());
        Self::wait_gate(&self.gate_export).await;
        self.export_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(AppError::remote("no export result primed")))
    }

    async fn import_data(&self, _body: &Value) -> Result<Value> {
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_gate(&self.gate_import).await;
        self.import_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Value::Null))
    }

    async fn version(&self) -> Result<VersionInfo> {
        Ok(VersionInfo {
            version: self.version.clone(),
        })
    }
}

/// Saver that records artifacts and reports them saved under their
/// suggested names.
#[derive(Default)]
pub struct RecordingSaver {
    pub saved: Mutex<Vec<ExportArtifact>>,
}

impl RecordingSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

impl ArtifactSaver for RecordingSaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<Option<PathBuf>> {
        let path = PathBuf::from(&artifact.suggested_file_name);
        self.saved.lock().unwrap().push(artifact.clone());
        Ok(Some(path))
    }
}

/// Shared ordered event log, for asserting cross-collaborator ordering.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Sink that appends to an [`EventLog`].
pub struct EventSink {
    log: EventLog,
}

impl EventSink {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl NotificationSink for EventSink {
    fn enqueue(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Success => self.log.push("notify:success"),
            Severity::Error => self.log.push("notify:error"),
        }
    }

    fn dismiss(&mut self, _key: &str) {
        self.log.push("dismiss");
    }
}

/// Hooks that append to an [`EventLog`].
pub struct EventHooks {
    log: EventLog,
}

impl EventHooks {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl SessionHooks for EventHooks {
    fn clear_dirty(&mut self) {
        self.log.push("clear-dirty");
    }

    fn request_reload(&mut self) {
        self.log.push("reload");
    }
}
