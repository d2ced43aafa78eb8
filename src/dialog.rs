//! Top-level dialog coordination for the profile menu.

use crate::catalog::Brand;
use crate::client::{AdminApi, VersionInfo};
use crate::export::{ArtifactSaver, ExportDialog, ExportOutcome, ExportPhase};
use crate::import::{ImportDialog, ImportOutcome, ImportPhase, SessionHooks};
use crate::notify::NotificationSink;
use crate::tracker::{OperationState, OperationTracker};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// About dialog: fetches the server version when opened.
///
/// Fetch failures are logged rather than notified; the dialog simply shows
/// no version.
pub struct AboutDialog {
    tracker: OperationTracker<VersionInfo>,
    version: Option<String>,
}

impl AboutDialog {
    fn open(handle: &tokio::runtime::Handle, api: Arc<dyn AdminApi>) -> Self {
        let mut tracker = OperationTracker::new();
        tracker.start(handle, async move { api.version().await });
        Self {
            tracker,
            version: None,
        }
    }

    /// Server version, once fetched.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.tracker.is_pending()
    }

    fn poll(&mut self) {
        if self.tracker.poll() {
            match self.tracker.take() {
                OperationState::Succeeded(info) => self.version = Some(info.version),
                OperationState::Failed(e) => warn!("Failed to fetch server version: {}", e),
                _ => {}
            }
        }
    }
}

/// Outcomes surfaced by one poll pass.
#[derive(Debug, Default)]
pub struct MenuEvents {
    pub export: Option<ExportOutcome>,
    pub import: Option<ImportOutcome>,
}

/// Profile menu dialog coordinator.
///
/// Each dialog owns an independent visibility slot; instances are created
/// fresh on open and dropped on close, so selections and tracked results
/// never carry over between opens.
pub struct ProfileMenu {
    handle: tokio::runtime::Handle,
    api: Arc<dyn AdminApi>,
    brand: Brand,
    export: Option<ExportDialog>,
    import: Option<ImportDialog>,
    about: Option<AboutDialog>,
}

impl ProfileMenu {
    pub fn new(handle: tokio::runtime::Handle, api: Arc<dyn AdminApi>, brand: Brand) -> Self {
        Self {
            handle,
            api,
            brand,
            export: None,
            import: None,
            about: None,
        }
    }

    pub fn brand(&self) -> Brand {
        self.brand
    }

    /// Brand changes arrive as explicit events. An open export dialog
    /// recomputes its selection from the new label set.
    pub fn set_brand(&mut self, brand: Brand) {
        self.brand = brand;
        if let Some(export) = self.export.as_mut() {
            export.set_brand(brand);
        }
    }

    /// Open the export dialog with every category selected. A previous
    /// instance, if any, is discarded.
    pub fn open_export(&mut self) -> &mut ExportDialog {
        self.export.insert(ExportDialog::open(self.brand))
    }

    /// Fire the export call for the open export dialog.
    pub fn start_export(&mut self) {
        if let Some(dialog) = self.export.as_mut() {
            dialog.begin_export(&self.handle, Arc::clone(&self.api));
        }
    }

    /// Open the import dialog and immediately begin importing the file.
    ///
    /// A parse failure settles synchronously: the dialog closes and the
    /// terminal outcome is returned here.
    pub fn open_import(
        &mut self,
        path: &Path,
        sink: &mut dyn NotificationSink,
    ) -> Option<ImportOutcome> {
        let dialog = self.import.insert(ImportDialog::open());
        let outcome = dialog.begin_import(path, &self.handle, Arc::clone(&self.api), sink);
        if dialog.phase() == ImportPhase::Closed {
            self.import = None;
        }
        outcome
    }

    /// Open the about dialog; fires the version fetch.
    pub fn open_about(&mut self) {
        self.about = Some(AboutDialog::open(&self.handle, Arc::clone(&self.api)));
    }

    pub fn close_about(&mut self) {
        self.about = None;
    }

    /// Close request for the export dialog; refused while exporting.
    pub fn close_export(&mut self) {
        if let Some(dialog) = self.export.as_mut() {
            dialog.request_close();
            if dialog.phase() == ExportPhase::Closed {
                self.export = None;
            }
        }
    }

    /// Close request for the import dialog; refused while importing.
    pub fn close_import(&mut self) {
        if let Some(dialog) = self.import.as_mut() {
            dialog.request_close();
            if dialog.phase() == ImportPhase::Closed {
                self.import = None;
            }
        }
    }

    pub fn export_dialog(&mut self) -> Option<&mut ExportDialog> {
        self.export.as_mut()
    }

    pub fn import_dialog(&mut self) -> Option<&mut ImportDialog> {
        self.import.as_mut()
    }

    pub fn about_dialog(&self) -> Option<&AboutDialog> {
        self.about.as_ref()
    }

    /// True while any dialog call is still in flight.
    pub fn is_busy(&self) -> bool {
        self.export
            .as_ref()
            .is_some_and(|d| d.phase() == ExportPhase::Exporting)
            || self
                .import
                .as_ref()
                .is_some_and(|d| d.phase() == ImportPhase::Importing)
            || self.about.as_ref().is_some_and(AboutDialog::is_pending)
    }

    /// Pump every open dialog. Dialogs that reached their terminal phase are
    /// dropped, discarding their selection and tracker state.
    pub fn poll(
        &mut self,
        saver: &dyn ArtifactSaver,
        sink: &mut dyn NotificationSink,
        hooks: &mut dyn SessionHooks,
    ) -> MenuEvents {
        let mut events = MenuEvents::default();

        if let Some(dialog) = self.export.as_mut() {
            events.export = dialog.poll(saver, sink);
            if dialog.phase() == ExportPhase::Closed {
                self.export = None;
            }
        }

        if let Some(dialog) = self.import.as_mut() {
            events.import = dialog.poll(sink, hooks);
            if dialog.phase() == ImportPhase::Closed {
                self.import = None;
            }
        }

        if let Some(about) = self.about.as_mut() {
            about.poll();
        }

        events
    }
}
