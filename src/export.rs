//! Export pipeline: payload construction, artifact materialization, and the
//! export dialog state machine.

use crate::catalog::{self, Brand};
use crate::client::AdminApi;
use crate::error::Result;
use crate::notify::{Notification, NotificationSink};
use crate::selection::Selection;
use crate::tracker::{OperationState, OperationTracker};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Fallback notification detail when a failed export carries no message.
const EXPORT_FALLBACK_MESSAGE: &str = "Internal Server Error";

/// Sparse inclusion set sent to the export endpoint: selected category keys
/// mapped to `true`, unselected keys omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportRequest(BTreeMap<String, bool>);

impl ExportRequest {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map selected labels to category keys under the active brand.
///
/// Labels with no catalog key (for example, leftovers from another brand's
/// label set) are dropped rather than failing the export.
pub fn build_payload(selection: &Selection, brand: Brand) -> ExportRequest {
    let mut keys = BTreeMap::new();
    for label in selection.labels() {
        match catalog::key_for_label(label, brand) {
            Some(key) => {
                keys.insert(key.to_string(), true);
            }
            None => debug!(%label, "no category key under active brand, dropped from payload"),
        }
    }
    ExportRequest(keys)
}

/// Export endpoint response: per-category record arrays plus the
/// server-suggested artifact name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    #[serde(rename = "FileDefaultName", default, skip_serializing_if = "Option::is_none")]
    pub file_default_name: Option<String>,

    #[serde(flatten)]
    pub data: serde_json::Map<String, Value>,
}

/// Materialized output of a successful export, ready for the save primitive.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub content: Vec<u8>,
    pub suggested_file_name: String,
}

impl ExportArtifact {
    /// Build the downloadable artifact from a successful response: the
    /// category payload pretty-printed as JSON (the `FileDefaultName`
    /// metadata field is naming, not data), named by the server's
    /// suggestion when present.
    pub fn from_response(response: &ExportResponse) -> Result<Self> {
        let content = serde_json::to_vec_pretty(&response.data)?;
        let suggested_file_name = response
            .file_default_name
            .clone()
            .unwrap_or_else(default_file_name);
        Ok(Self {
            content,
            suggested_file_name,
        })
    }
}

/// Timestamped fallback name when the server does not suggest one.
fn default_file_name() -> String {
    format!("export_{ts}.json", ts = Local::now().format("%Y%m%d_%H%M%S"))
}

/// Environment file-save primitive.
pub trait ArtifactSaver {
    /// Persist the artifact; `Ok(None)` means the user cancelled the save.
    fn save(&self, artifact: &ExportArtifact) -> Result<Option<PathBuf>>;
}

/// Saver that prompts with the native save dialog.
#[derive(Debug, Default)]
pub struct DialogSaver;

impl ArtifactSaver for DialogSaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<Option<PathBuf>> {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&artifact.suggested_file_name)
            .add_filter("JSON Files", &["json"])
            .save_file()
        else {
            return Ok(None);
        };
        std::fs::write(&path, &artifact.content)?;
        Ok(Some(path))
    }
}

/// Saver that writes into a fixed directory without prompting.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSaver for DirectorySaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<Option<PathBuf>> {
        let path = self.dir.join(&artifact.suggested_file_name);
        std::fs::write(&path, &artifact.content)?;
        Ok(Some(path))
    }
}

/// Export dialog phase. The `Selecting → Exporting` transition is
/// irreversible for a dialog instance; there is no cancel mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Selecting,
    Exporting,
    Closed,
}

/// Terminal outcome of one export dialog instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    SaveCancelled,
    Failed(String),
}

/// Export dialog lifecycle. One instance per open; selection and tracker
/// are discarded with the instance when it closes.
pub struct ExportDialog {
    phase: ExportPhase,
    brand: Brand,
    selection: Selection,
    tracker: OperationTracker<ExportResponse>,
}

impl ExportDialog {
    /// Open with every category selected.
    pub fn open(brand: Brand) -> Self {
        Self {
            phase: ExportPhase::Selecting,
            brand,
            selection: Selection::all_for(brand),
            tracker: OperationTracker::new(),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn brand(&self) -> Brand {
        self.brand
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle(&mut self, label: &str) {
        if self.phase == ExportPhase::Selecting {
            self.selection.toggle(label);
        }
    }

    /// Brand switches invalidate label-based selections: recompute from the
    /// new label set, never merge.
    pub fn set_brand(&mut self, brand: Brand) {
        if self.phase == ExportPhase::Selecting && brand != self.brand {
            self.brand = brand;
            self.selection = Selection::all_for(brand);
        }
    }

    /// Export is only meaningful with a non-empty selection; the caller
    /// gates on this (the dialog model itself does not).
    pub fn can_export(&self) -> bool {
        self.phase == ExportPhase::Selecting && !self.selection.is_empty()
    }

    /// Fire the bulk export call.
    pub fn begin_export(&mut self, handle: &tokio::runtime::Handle, api: Arc<dyn AdminApi>) {
        if self.phase != ExportPhase::Selecting {
            return;
        }
        let payload = build_payload(&self.selection, self.brand);
        info!(categories = payload.len(), "starting bulk export");

        self.phase = ExportPhase::Exporting;
        self.tracker
            .start(handle, async move { api.export_data(&payload).await });
    }

    /// Close request from the host. Refused while the call is in flight.
    pub fn request_close(&mut self) {
        if self.phase == ExportPhase::Selecting {
            self.phase = ExportPhase::Closed;
        }
    }

    /// Pump the tracker. On settle, materialize and hand off the artifact,
    /// or push a persistent failure notification; either way the dialog
    /// closes and the terminal outcome is returned exactly once.
    pub fn poll(
        &mut self,
        saver: &dyn ArtifactSaver,
        sink: &mut dyn NotificationSink,
    ) -> Option<ExportOutcome> {
        if self.phase != ExportPhase::Exporting || !self.tracker.poll() {
            return None;
        }

        let outcome = match self.tracker.take() {
            OperationState::Succeeded(response) => {
                match ExportArtifact::from_response(&response).and_then(|a| saver.save(&a)) {
                    Ok(Some(path)) => {
                        info!(path = %path.display(), "export artifact saved");
                        ExportOutcome::Saved(path)
                    }
                    Ok(None) => {
                        info!("export artifact save cancelled");
                        ExportOutcome::SaveCancelled
                    }
                    Err(e) => {
                        let message = format!(
                            "Failed to export all: {}",
                            e.user_message(EXPORT_FALLBACK_MESSAGE)
                        );
                        sink.enqueue(Notification::failure(message.clone()));
                        ExportOutcome::Failed(message)
                    }
                }
            }
            OperationState::Failed(e) => {
                let message = format!(
                    "Failed to export: {}",
                    e.user_message(EXPORT_FALLBACK_MESSAGE)
                );
                sink.enqueue(Notification::failure(message.clone()));
                ExportOutcome::Failed(message)
            }
            // poll() reported a settle, so Idle/Pending cannot be here.
            _ => return None,
        };

        self.phase = ExportPhase::Closed;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selection_of(labels: &[&str]) -> Selection {
        let mut selection = Selection::empty();
        for label in labels {
            selection.toggle(label);
        }
        selection
    }

    #[test]
    fn test_payload_maps_labels_to_keys() {
        let payload = build_payload(&selection_of(&["Chatflows", "Tools"]), Brand::Builder);
        assert!(payload.contains("chatflow"));
        assert!(payload.contains("tool"));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_payload_only_holds_selected_valid_keys() {
        let selection = selection_of(&["Chatflows", "Variables"]);
        let payload = build_payload(&selection, Brand::Builder);

        for key in payload.keys() {
            assert!(catalog::CATEGORIES.iter().any(|c| c.key == key));
        }
        assert!(!payload.contains("tool"));
    }

    #[test]
    fn test_payload_drops_stale_labels_silently() {
        // "Assist Flows" belongs to the Suite label set; under Builder it
        // has no key and must vanish without failing the build.
        let payload = build_payload(
            &selection_of(&["Assist Flows", "Tools", "Made Up"]),
            Brand::Builder,
        );
        assert_eq!(payload.len(), 1);
        assert!(payload.contains("tool"));
    }

    #[test]
    fn test_payload_is_deterministic() {
        let selection = selection_of(&["Tools", "Chatflows", "Variables"]);
        let a = build_payload(&selection, Brand::Builder);
        let b = build_payload(&selection, Brand::Builder);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_payload_serializes_as_sparse_inclusion_set() {
        let payload = build_payload(&selection_of(&["Chatflows", "Tools"]), Brand::Builder);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "chatflow": true, "tool": true }));
    }

    #[test]
    fn test_artifact_uses_server_suggested_name() {
        let response: ExportResponse = serde_json::from_value(json!({
            "FileDefaultName": "export.json",
            "chatflow": [{"id": 1}],
            "tool": []
        }))
        .unwrap();

        let artifact = ExportArtifact::from_response(&response).unwrap();
        assert_eq!(artifact.suggested_file_name, "export.json");
    }

    #[test]
    fn test_artifact_content_excludes_name_metadata() {
        let response: ExportResponse = serde_json::from_value(json!({
            "FileDefaultName": "export.json",
            "chatflow": [{"id": 1}]
        }))
        .unwrap();

        let artifact = ExportArtifact::from_response(&response).unwrap();
        let round_trip: Value = serde_json::from_slice(&artifact.content).unwrap();
        assert!(round_trip.get("FileDefaultName").is_none());
        assert_eq!(round_trip["chatflow"][0]["id"], 1);
    }

    #[test]
    fn test_artifact_falls_back_to_timestamped_name() {
        let response: ExportResponse =
            serde_json::from_value(json!({ "tool": [] })).unwrap();

        let artifact = ExportArtifact::from_response(&response).unwrap();
        assert!(artifact.suggested_file_name.starts_with("export_"));
        assert!(artifact.suggested_file_name.ends_with(".json"));
    }

    #[test]
    fn test_dialog_opens_with_all_selected() {
        let dialog = ExportDialog::open(Brand::Builder);
        assert_eq!(dialog.phase(), ExportPhase::Selecting);
        assert_eq!(
            dialog.selection().len(),
            catalog::labels_for(Brand::Builder).len()
        );
        assert!(dialog.can_export());
    }

    #[test]
    fn test_dialog_brand_switch_recomputes_selection() {
        let mut dialog = ExportDialog::open(Brand::Builder);
        dialog.toggle("Chatflows");

        dialog.set_brand(Brand::Suite);
        assert!(!dialog.selection().contains("Chatflows"));
        assert!(dialog.selection().contains("Assist Flows"));
        assert_eq!(
            dialog.selection().len(),
            catalog::labels_for(Brand::Suite).len()
        );
    }

    #[test]
    fn test_dialog_cannot_export_empty_selection() {
        let mut dialog = ExportDialog::open(Brand::Builder);
        for label in catalog::labels_for(Brand::Builder) {
            dialog.toggle(label);
        }
        assert!(dialog.selection().is_empty());
        assert!(!dialog.can_export());
    }

    #[test]
    fn test_dialog_close_allowed_while_selecting() {
        let mut dialog = ExportDialog::open(Brand::Builder);
        dialog.request_close();
        assert_eq!(dialog.phase(), ExportPhase::Closed);
    }
}
