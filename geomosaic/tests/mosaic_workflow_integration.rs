//! Integration tests for the mosaic workflow.
//!
//! These tests drive the complete flow through the public API:
//! - map layers → dialog form → request → geoprocessor invocation
//! - outcome classification and user notifications
//! - loading the produced raster back into the map
//!
//! Run with: `cargo test --test mosaic_workflow_integration`

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use geomosaic::dialog::{DialogResult, MosaicDialog};
use geomosaic::executor::{MosaicExecutor, SUCCESS_MESSAGE};
use geomosaic::geoprocessing::{
    Geoprocessor, GeoprocessingError, GpEnvironment, MosaicToNewRaster, NativeGeoprocessor,
    ToolReport,
};
use geomosaic::layer::{DatasetName, InMemoryMap, LayerKind, MapLayer, MapViewer};
use geomosaic::loader::LoadOutcome;
use geomosaic::mosaic::{MosaicForm, MosaicMethod, MosaicRequestBuilder, PixelType};
use geomosaic::raster::{io, GeoTransform, Raster};
use geomosaic::workflow::{
    LoadReport, MosaicWorkflow, RecordingNotifier, Severity, SubmitResult, WorkflowState,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Records every invocation and replies with a fixed message list.
///
/// When `write_output` is set, a small GeoTIFF is written to the requested
/// output path first, the way a real tool would.
struct RecordingGeoprocessor {
    messages: Vec<String>,
    write_output: bool,
    invocations: Mutex<Vec<MosaicToNewRaster>>,
}

impl RecordingGeoprocessor {
    fn replying(messages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            write_output: false,
            invocations: Mutex::new(Vec::new()),
        })
    }

    fn producing(messages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            write_output: true,
            invocations: Mutex::new(Vec::new()),
        })
    }

    fn invocations(&self) -> Vec<MosaicToNewRaster> {
        self.invocations.lock().unwrap().clone()
    }
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
        self.invocations.lock().unwrap().push(tool.clone());
        if self.write_output {
            write_raster(&tool.output_path(), 0.0, 5.0);
        }
        Ok(ToolReport::from_messages(self.messages.clone()))
    }
}

fn write_raster(path: &Path, origin_x: f64, value: f64) {
    let raster = Raster::new(4, 4, GeoTransform::new(origin_x, 4.0, 1.0, 1.0), vec![value; 16]);
    io::write_geotiff(path, &raster, PixelType::Float32).unwrap();
}

/// Map with three raster layers R1, R2, R3 backed by /data/rN.tif.
fn three_raster_map() -> InMemoryMap {
    InMemoryMap::with_layers(vec![
        MapLayer::raster("R1", DatasetName::new("/data", "r1.tif")),
        MapLayer::raster("R2", DatasetName::new("/data", "r2.tif")),
        MapLayer::raster("R3", DatasetName::new("/data", "r3.tif")),
    ])
}

fn workflow_with(gp: Arc<dyn Geoprocessor>) -> MosaicWorkflow {
    MosaicWorkflow::new(MosaicRequestBuilder::new(), MosaicExecutor::new(gp))
}

fn form(checked: &[&str], output: &Path, method: MosaicMethod) -> MosaicForm {
    MosaicForm {
        checked_layers: checked.iter().map(|s| s.to_string()).collect(),
        output_path: output.display().to_string(),
        method_label: Some(method.label().to_string()),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// R1 and R2 checked, FIRST selected: one invocation with both datasets.
#[test]
fn test_scenario_a_invocation_parameters() {
    let gp = RecordingGeoprocessor::replying(&["Executing...", "Succeeded"]);
    let mut workflow = workflow_with(gp.clone()).with_load_result(false);
    let mut map = three_raster_map();
    let mut notifier = RecordingNotifier::new();

    let report = workflow.submit(
        &mut map,
        &form(&["R1", "R2"], Path::new("/tmp/out.tif"), MosaicMethod::First),
        &mut notifier,
    );

    assert!(report.is_completed());
    let invocations = gp.invocations();
    assert_eq!(invocations.len(), 1);
    let tool = &invocations[0];
    assert_eq!(tool.input_rasters, "/data/r1.tif;/data/r2.tif");
    assert_eq!(tool.output_location, PathBuf::from("/tmp"));
    assert_eq!(tool.raster_dataset_name_with_extension, "out.tif");
    assert_eq!(tool.pixel_type, PixelType::Float32);
    assert_eq!(tool.number_of_bands, 1);
    assert_eq!(tool.mosaic_method, MosaicMethod::First);
    assert_eq!(tool.mosaic_method.keyword(), "FIRST");
}

/// A clean log is success and the produced raster lands on top of the map.
#[test]
fn test_scenario_b_success_loads_result() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.tif");
    let gp = RecordingGeoprocessor::producing(&["Executing...", "Succeeded"]);
    let mut workflow = workflow_with(gp);
    let mut map = three_raster_map();
    let mut notifier = RecordingNotifier::new();

    let report = workflow.submit(
        &mut map,
        &form(&["R1", "R2"], &output, MosaicMethod::First),
        &mut notifier,
    );

    assert_eq!(
        report.result,
        SubmitResult::Completed {
            output: output.clone(),
            load: LoadReport::Loaded {
                outcome: LoadOutcome::Added {
                    name: "out".to_string()
                }
            },
        }
    );
    assert_eq!(
        report.trace,
        vec![
            WorkflowState::Idle,
            WorkflowState::Validating,
            WorkflowState::Executing,
            WorkflowState::ExecSucceeded,
            WorkflowState::LoadAttempted,
            WorkflowState::Idle,
        ]
    );

    let notice = &notifier.notifications()[0];
    assert_eq!(notice.severity, Severity::Info);
    assert_eq!(notice.message, SUCCESS_MESSAGE);

    assert_eq!(map.layer_count().unwrap(), 4);
    let top = map.layer(0).unwrap();
    assert_eq!(top.name, "out");
    assert_eq!(top.kind, LayerKind::Raster);
    assert_eq!(map.raster_dataset(0).unwrap().unwrap().full_path(), output);
    assert_eq!(map.refresh_count(), 1);
}

/// Any ERROR line is a failure: the full log is shown and nothing is loaded.
#[test]
fn test_scenario_c_error_log_is_failure() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.tif");
    let gp = RecordingGeoprocessor::replying(&[
        "Executing...",
        "ERROR 000732: Input Rasters: Dataset /data/r2.tif does not exist",
    ]);
    let mut workflow = workflow_with(gp);
    let mut map = three_raster_map();
    let mut notifier = RecordingNotifier::new();

    let report = workflow.submit(
        &mut map,
        &form(&["R1", "R2"], &output, MosaicMethod::First),
        &mut notifier,
    );

    assert!(matches!(report.result, SubmitResult::Failed { .. }));
    let notice = &notifier.notifications()[0];
    assert_eq!(notice.severity, Severity::Error);
    assert!(notice.message.contains("ERROR 000732"));
    assert!(notice.message.contains("Executing..."));
    assert_eq!(map.layer_count().unwrap(), 3);
    assert_eq!(map.refresh_count(), 0);
}

/// Fewer than two checked layers never reaches the geoprocessor.
#[test]
fn test_single_layer_rejected_without_invocation() {
    let gp = RecordingGeoprocessor::replying(&[]);
    let mut workflow = workflow_with(gp.clone());
    let mut map = three_raster_map();
    let mut notifier = RecordingNotifier::new();

    let report = workflow.submit(
        &mut map,
        &form(&["R1"], Path::new("/tmp/out.tif"), MosaicMethod::Last),
        &mut notifier,
    );

    assert!(matches!(report.result, SubmitResult::Rejected { .. }));
    assert!(gp.invocations().is_empty());
    assert_eq!(notifier.notifications()[0].severity, Severity::Warning);
    assert_eq!(workflow.state(), WorkflowState::Idle);
}

// ============================================================================
// End to end with the native engine
// ============================================================================

/// Dialog → native mosaic → GeoTIFF on disk → layer in the map.
#[test]
fn test_native_dialog_end_to_end() {
    let temp = TempDir::new().unwrap();
    let west = temp.path().join("west.tif");
    let east = temp.path().join("east.tif");
    write_raster(&west, 0.0, 1.0);
    write_raster(&east, 2.0, 9.0);
    let output = temp.path().join("mosaic.tif");

    let mut map = InMemoryMap::with_layers(vec![
        MapLayer::from_path(&west),
        MapLayer::from_path(&east),
        MapLayer::from_path("/data/roads.shp"),
    ]);
    let mut workflow = workflow_with(Arc::new(NativeGeoprocessor::new()));
    let mut notifier = RecordingNotifier::new();

    let mut dialog = MosaicDialog::open(&map)
        .unwrap()
        .with_default_method(MosaicMethod::Maximum);
    assert_eq!(dialog.checklist().checked_names(), vec!["west", "east"]);
    dialog.set_output_path(output.display().to_string());

    let report = dialog.accept_with_progress(&mut workflow, &mut map, &mut notifier, &mut || {});

    assert!(report.is_completed(), "{:?}", notifier.notifications());
    assert_eq!(dialog.result(), Some(DialogResult::Ok));

    let mosaic = io::read_raster(&output).unwrap();
    assert_eq!(mosaic.width(), 6);
    assert_eq!(mosaic.height(), 4);
    assert_eq!(mosaic.value(0, 0), Some(1.0));
    assert_eq!(mosaic.value(3, 0), Some(9.0));
    assert_eq!(mosaic.value(5, 3), Some(9.0));

    assert_eq!(map.layer_count().unwrap(), 4);
    assert_eq!(map.layer(0).unwrap().name, "mosaic");
}

/// Re-running into an existing output with overwriting disabled fails with
/// the tool's ERROR line and leaves the map alone.
#[test]
fn test_native_existing_output_without_overwrite() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.tif");
    let b = temp.path().join("b.tif");
    write_raster(&a, 0.0, 1.0);
    write_raster(&b, 4.0, 2.0);
    let output = temp.path().join("out.tif");
    std::fs::write(&output, b"existing").unwrap();

    let executor = MosaicExecutor::new(Arc::new(NativeGeoprocessor::new()))
        .with_environment(GpEnvironment {
            overwrite_output: false,
        });
    let mut workflow = MosaicWorkflow::new(MosaicRequestBuilder::new(), executor);
    let mut map = InMemoryMap::with_layers(vec![MapLayer::from_path(&a), MapLayer::from_path(&b)]);
    let mut notifier = RecordingNotifier::new();

    let report = workflow.submit(
        &mut map,
        &form(&["a", "b"], &output, MosaicMethod::Last),
        &mut notifier,
    );

    assert!(matches!(report.result, SubmitResult::Failed { .. }));
    assert!(notifier.notifications()[0].message.contains("ERROR 000725"));
    assert_eq!(std::fs::read(&output).unwrap(), b"existing");
    assert_eq!(map.layer_count().unwrap(), 2);
}
