//! Mosaic command - non-interactive mosaic run.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use geomosaic::config::ConfigFile;
use geomosaic::dialog::MosaicDialog;
use geomosaic::mosaic::PixelType;
use geomosaic::workflow::{MosaicWorkflow, RecordingNotifier, SubmitReport, SubmitResult};
use tracing::info;

use super::common::{build_map, print_map_layers, Progress, SourceArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `geomosaic mosaic`.
#[derive(Debug, Args)]
pub struct MosaicArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Check only these layers (repeatable; default: all raster layers)
    #[arg(long, value_name = "NAME")]
    pub select: Vec<String>,

    /// Mosaic method, as a keyword (MEAN) or dropdown label
    #[arg(long, short)]
    pub method: Option<String>,

    /// Output raster path
    #[arg(long, short)]
    pub output: PathBuf,

    /// Output pixel type, e.g. 32_BIT_FLOAT or 8_BIT_UNSIGNED
    #[arg(long, value_name = "TYPE")]
    pub pixel_type: Option<String>,

    /// Number of output bands
    #[arg(long)]
    pub bands: Option<u32>,

    /// Do not add the result to the map
    #[arg(long)]
    pub no_load: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the mosaic command.
pub fn run(args: MosaicArgs, config_path: &Path, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose, verbose && !args.json)?;
    runner.log_startup("mosaic");

    let config = apply_overrides(runner.config(), &args)?;
    let runtime = runner.bind_runtime()?;
    if runtime.fell_back() && !args.json {
        eprintln!(
            "  {} Backend '{}' unavailable, using the native engine",
            style("!").yellow(),
            config.geoprocessing.backend
        );
    }

    if args.sources.is_empty() && !args.json {
        eprintln!(
            "  {} No layers given; use --layer NAME=PATH or --layers GLOB",
            style("!").yellow()
        );
    }
    let mut map = build_map(&args.sources)?;

    let mut dialog = MosaicDialog::open(&map)?.with_default_method(config.mosaic.method);
    if !args.select.is_empty() {
        dialog.checklist_mut().check_only(&args.select);
    }
    dialog.set_output_path(args.output.display().to_string());
    let mut form = dialog.form();
    if let Some(method) = &args.method {
        form.method_label = Some(method.clone());
    }

    let mut workflow = MosaicWorkflow::from_config(&config, runtime.geoprocessor());
    info!(backend = runtime.geoprocessor().name(), "Running mosaic");

    let report = if args.json {
        let mut notifier = RecordingNotifier::new();
        let progress = Progress::start("", false);
        let report =
            workflow.submit_with_progress(&mut map, &form, &mut notifier, &mut || progress.tick());
        progress.finish();
        print_json(&report, &notifier, runtime.geoprocessor().name())?;
        report
    } else {
        let progress = Progress::start(
            &format!("Mosaicking {} layers", form.checked_layers.len()),
            true,
        );
        let mut notifier = progress.notifier();
        let report =
            workflow.submit_with_progress(&mut map, &form, &mut notifier, &mut || progress.tick());
        progress.finish();
        print_summary(&report);
        println!();
        print_map_layers(&map);
        report
    };

    if report.is_completed() {
        Ok(())
    } else {
        Err(CliError::MosaicIncomplete)
    }
}

/// Config with the per-run command-line overrides applied.
fn apply_overrides(config: &ConfigFile, args: &MosaicArgs) -> Result<ConfigFile, CliError> {
    let mut config = config.clone();
    if let Some(pixel_type) = &args.pixel_type {
        config.mosaic.pixel_type = pixel_type
            .parse::<PixelType>()
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    }
    if let Some(bands) = args.bands {
        if bands == 0 {
            return Err(CliError::InvalidArgument(
                "--bands must be at least 1".to_string(),
            ));
        }
        config.mosaic.number_of_bands = bands;
    }
    if args.no_load {
        config.mosaic.load_result = false;
    }
    Ok(config)
}

fn print_summary(report: &SubmitReport) {
    if let (Some(request), SubmitResult::Completed { output, .. }) = (&report.request, &report.result)
    {
        println!();
        println!("{} {}", style("Output:").bold(), output.display());
        println!("  Method:     {}", request.method.keyword());
        println!("  Pixel type: {}", request.pixel_type);
        println!("  Inputs:     {}", request.inputs.len());
    }
}

fn print_json(
    report: &SubmitReport,
    notifier: &RecordingNotifier,
    backend: &str,
) -> Result<(), CliError> {
    let value = serde_json::json!({
        "backend": backend,
        "report": report,
        "notifications": notifier.notifications(),
    });
    let text =
        serde_json::to_string_pretty(&value).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
