//! Headless mosaic dialog.
//!
//! [`MosaicDialog`] holds the form state a front end renders: the raster
//! layer checklist, the method dropdown and the output path field. OK runs
//! the workflow; the dialog closes only when the mosaic completed.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{LayerCatalog, LayerChecklist};
use crate::layer::{MapViewer, ViewerError};
use crate::mosaic::{MosaicForm, MosaicMethod};
use crate::workflow::{MosaicWorkflow, Notifier, SubmitReport};

/// A file-type filter for a save dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub description: &'static str,
    pub pattern: &'static str,
}

impl FileFilter {
    /// The only filter offered for mosaic output.
    pub const TIFF: FileFilter = FileFilter {
        description: "TIFF files (*.tif)",
        pattern: "*.tif",
    };
}

/// Asks the user where to save a file.
pub trait SaveFileChooser {
    /// Show the chooser. `None` means the user cancelled.
    fn choose(&mut self, filter: &FileFilter, current: Option<&Path>) -> Option<PathBuf>;
}

/// How the dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Ok,
    Cancel,
}

/// Form state of the mosaic dialog.
#[derive(Debug, Clone)]
pub struct MosaicDialog {
    catalog: LayerCatalog,
    checklist: LayerChecklist,
    selected_method: Option<usize>,
    output_path: String,
    result: Option<DialogResult>,
}

impl MosaicDialog {
    /// Read the viewer's raster layers and build the initial form.
    ///
    /// Every raster layer starts checked and the first method is selected.
    pub fn open(viewer: &dyn MapViewer) -> Result<Self, ViewerError> {
        let catalog = LayerCatalog::read(viewer)?;
        let checklist = LayerChecklist::from(&catalog);
        debug!(layers = catalog.len(), "Opened mosaic dialog");
        Ok(Self {
            catalog,
            checklist,
            selected_method: Some(0),
            output_path: String::new(),
            result: None,
        })
    }

    /// Preselect `method` instead of the first entry.
    pub fn with_default_method(mut self, method: MosaicMethod) -> Self {
        self.selected_method = MosaicMethod::ALL.iter().position(|m| *m == method);
        self
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn checklist(&self) -> &LayerChecklist {
        &self.checklist
    }

    pub fn checklist_mut(&mut self) -> &mut LayerChecklist {
        &mut self.checklist
    }

    /// Dropdown entries in display order.
    pub fn method_labels(&self) -> Vec<&'static str> {
        MosaicMethod::labels()
    }

    pub fn selected_method(&self) -> Option<usize> {
        self.selected_method
    }

    /// Select a dropdown entry, or clear the selection with `None`.
    ///
    /// Returns false and leaves the selection unchanged if the index is out
    /// of range.
    pub fn select_method(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= MosaicMethod::ALL.len() => false,
            _ => {
                self.selected_method = index;
                true
            }
        }
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output_path = path.into();
    }

    /// Pick the output path through a save dialog.
    ///
    /// Returns true if the user chose a path; cancelling leaves the field as
    /// it was.
    pub fn browse(&mut self, chooser: &mut dyn SaveFileChooser) -> bool {
        let trimmed = self.output_path.trim();
        let current = (!trimmed.is_empty()).then(|| Path::new(trimmed));
        match chooser.choose(&FileFilter::TIFF, current) {
            Some(path) => {
                self.output_path = path.display().to_string();
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current input.
    pub fn form(&self) -> MosaicForm {
        MosaicForm {
            checked_layers: self.checklist.checked_names(),
            output_path: self.output_path.clone(),
            method_label: self
                .selected_method
                .and_then(|i| MosaicMethod::ALL.get(i))
                .map(|m| m.label().to_string()),
        }
    }

    /// OK: submit the form. The dialog closes only on a completed mosaic.
    pub fn accept(
        &mut self,
        workflow: &mut MosaicWorkflow,
        viewer: &mut dyn MapViewer,
        notifier: &mut dyn Notifier,
    ) -> SubmitReport {
        let report = workflow.submit(viewer, &self.form(), notifier);
        self.close_if_completed(&report);
        report
    }

    /// OK with the tool running on a worker thread.
    pub fn accept_with_progress(
        &mut self,
        workflow: &mut MosaicWorkflow,
        viewer: &mut dyn MapViewer,
        notifier: &mut dyn Notifier,
        tick: &mut dyn FnMut(),
    ) -> SubmitReport {
        let report = workflow.submit_with_progress(viewer, &self.form(), notifier, tick);
        self.close_if_completed(&report);
        report
    }

    /// Cancel: close without side effects.
    pub fn cancel(&mut self) -> DialogResult {
        self.result = Some(DialogResult::Cancel);
        DialogResult::Cancel
    }

    /// How the dialog was closed, or `None` while it is open.
    pub fn result(&self) -> Option<DialogResult> {
        self.result
    }

    pub fn is_open(&self) -> bool {
        self.result.is_none()
    }

    fn close_if_completed(&mut self, report: &SubmitReport) {
        if report.is_completed() {
            self.result = Some(DialogResult::Ok);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MosaicExecutor;
    use crate::geoprocessing::{
        Geoprocessor, GeoprocessingError, GpEnvironment, MosaicToNewRaster, ToolReport,
    };
    use crate::layer::{DatasetName, InMemoryMap, LayerRef, MapLayer};
    use crate::mosaic::MosaicRequestBuilder;
    use crate::workflow::RecordingNotifier;
    use std::sync::{Arc, Mutex};

    struct FixedChooser(Option<PathBuf>, Vec<Option<PathBuf>>);

    impl SaveFileChooser for FixedChooser {
        fn choose(&mut self, filter: &FileFilter, current: Option<&Path>) -> Option<PathBuf> {
            assert_eq!(*filter, FileFilter::TIFF);
            self.1.push(current.map(Path::to_path_buf));
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingGeoprocessor {
        tools: Mutex<Vec<MosaicToNewRaster>>,
    }

    impl Geoprocessor for RecordingGeoprocessor {
        fn name(&self) -> &str {
            "recording"
        }

        fn execute(
            &self,
            tool: &MosaicToNewRaster,
            _env: &GpEnvironment,
        ) -> Result<ToolReport, GeoprocessingError> {
            self.tools.lock().unwrap().push(tool.clone());
            Ok(ToolReport::from_messages(["Succeeded"]))
        }
    }

    struct FailingViewer;

    impl MapViewer for FailingViewer {
        fn layer_count(&self) -> Result<usize, ViewerError> {
            Err(ViewerError::Unavailable("map closed".to_string()))
        }

        fn layer(&self, index: usize) -> Result<LayerRef, ViewerError> {
            Err(ViewerError::IndexOutOfRange { index, count: 0 })
        }

        fn raster_dataset(&self, _index: usize) -> Result<Option<DatasetName>, ViewerError> {
            Ok(None)
        }

        fn add_layer(&mut self, _layer: MapLayer) -> Result<(), ViewerError> {
            Ok(())
        }

        fn refresh(&mut self) -> Result<(), ViewerError> {
            Ok(())
        }
    }

    fn map() -> InMemoryMap {
        InMemoryMap::with_layers(vec![
            MapLayer::raster("R1", DatasetName::new("/data", "r1.tif")),
            MapLayer::named("Roads", "/data/roads.shp"),
            MapLayer::raster("R2", DatasetName::new("/data", "r2.tif")),
        ])
    }

    fn workflow() -> (MosaicWorkflow, Arc<RecordingGeoprocessor>) {
        let gp = Arc::new(RecordingGeoprocessor::default());
        let executor = MosaicExecutor::new(gp.clone());
        (
            MosaicWorkflow::new(MosaicRequestBuilder::new(), executor).with_load_result(false),
            gp,
        )
    }

    #[test]
    fn test_open_checks_all_rasters() {
        let dialog = MosaicDialog::open(&map()).unwrap();
        assert_eq!(dialog.checklist().checked_names(), vec!["R1", "R2"]);
        assert_eq!(dialog.selected_method(), Some(0));
        assert_eq!(dialog.method_labels()[0], "LAST - 后值覆盖前值");
        assert!(dialog.is_open());
    }

    #[test]
    fn test_open_propagates_viewer_error() {
        assert!(matches!(
            MosaicDialog::open(&FailingViewer),
            Err(ViewerError::Unavailable(_))
        ));
    }

    #[test]
    fn test_default_method() {
        let dialog = MosaicDialog::open(&map())
            .unwrap()
            .with_default_method(MosaicMethod::Mean);
        assert_eq!(dialog.form().method_label.as_deref(), Some("MEAN - 平均值"));
    }

    #[test]
    fn test_select_method_bounds() {
        let mut dialog = MosaicDialog::open(&map()).unwrap();
        assert!(!dialog.select_method(Some(6)));
        assert_eq!(dialog.selected_method(), Some(0));
        assert!(dialog.select_method(None));
        assert_eq!(dialog.form().method_label, None);
    }

    #[test]
    fn test_browse() {
        let mut dialog = MosaicDialog::open(&map()).unwrap();

        let mut cancel = FixedChooser(None, Vec::new());
        assert!(!dialog.browse(&mut cancel));
        assert_eq!(dialog.output_path(), "");
        assert_eq!(cancel.1, vec![None]);

        let mut pick = FixedChooser(Some(PathBuf::from("/tmp/out.tif")), Vec::new());
        assert!(dialog.browse(&mut pick));
        assert_eq!(dialog.output_path(), "/tmp/out.tif");

        dialog.browse(&mut pick);
        assert_eq!(pick.1.last().unwrap().as_deref(), Some(Path::new("/tmp/out.tif")));
    }

    #[test]
    fn test_accept_rejected_keeps_dialog_open() {
        let (mut workflow, gp) = workflow();
        let mut map = map();
        let mut dialog = MosaicDialog::open(&map).unwrap();
        dialog.checklist_mut().set_checked("R2", false);
        dialog.set_output_path("/tmp/out.tif");
        let mut notifier = RecordingNotifier::new();

        dialog.accept(&mut workflow, &mut map, &mut notifier);

        assert!(dialog.is_open());
        assert!(gp.tools.lock().unwrap().is_empty());
        assert_eq!(notifier.titles(), vec!["Input Error"]);
    }

    #[test]
    fn test_accept_completed_closes_dialog() {
        let (mut workflow, gp) = workflow();
        let mut map = map();
        let mut dialog = MosaicDialog::open(&map).unwrap();
        dialog.set_output_path("/tmp/out.tif");
        let mut notifier = RecordingNotifier::new();

        let report = dialog.accept(&mut workflow, &mut map, &mut notifier);

        assert!(report.is_completed());
        assert_eq!(dialog.result(), Some(DialogResult::Ok));
        let tools = gp.tools.lock().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].input_rasters, "/data/r1.tif;/data/r2.tif");
        assert_eq!(tools[0].mosaic_method, MosaicMethod::Last);
    }

    #[test]
    fn test_cancel_has_no_side_effects() {
        let (_workflow, gp) = workflow();
        let map = map();
        let mut dialog = MosaicDialog::open(&map).unwrap();

        assert_eq!(dialog.cancel(), DialogResult::Cancel);
        assert_eq!(dialog.result(), Some(DialogResult::Cancel));
        assert!(gp.tools.lock().unwrap().is_empty());
        assert_eq!(map.layer_count().unwrap(), 3);
    }
}
