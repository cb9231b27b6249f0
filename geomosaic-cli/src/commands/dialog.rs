//! Dialog command - interactive mosaic dialog.
//!
//! Renders the headless [`MosaicDialog`] with `dialoguer` prompts and loops
//! until a mosaic completes or the user cancels.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use geomosaic::dialog::{DialogResult, FileFilter, MosaicDialog, SaveFileChooser};
use geomosaic::workflow::MosaicWorkflow;

use super::common::{build_map, print_map_layers, Progress, SourceArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Output file name offered when none has been chosen yet.
const DEFAULT_OUTPUT_STEM: &str = "mosaic";

/// Arguments for `geomosaic dialog`.
#[derive(Debug, Args)]
pub struct DialogArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Do not add the result to the map
    #[arg(long)]
    pub no_load: bool,
}

/// Save-path prompt standing in for a file chooser.
struct PromptSaveChooser<'a> {
    theme: &'a ColorfulTheme,
}

impl SaveFileChooser for PromptSaveChooser<'_> {
    fn choose(&mut self, filter: &FileFilter, current: Option<&Path>) -> Option<PathBuf> {
        let extension = filter.pattern.trim_start_matches("*.");
        let initial = current
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{}.{}", DEFAULT_OUTPUT_STEM, extension));

        let text: String = Input::with_theme(self.theme)
            .with_prompt(format!("Output raster - {}", filter.description))
            .default(initial)
            .interact_text()
            .ok()?;
        with_default_extension(text.trim(), extension)
    }
}

/// Append `extension` to a path typed without one.
fn with_default_extension(text: &str, extension: &str) -> Option<PathBuf> {
    if text.is_empty() {
        return None;
    }
    let mut path = PathBuf::from(text);
    if path.extension().is_none() {
        path.set_extension(extension);
    }
    Some(path)
}

/// Run the dialog command.
pub fn run(args: DialogArgs, config_path: &Path, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose, false)?;
    runner.log_startup("dialog");

    let mut config = runner.config().clone();
    if args.no_load {
        config.mosaic.load_result = false;
    }
    let runtime = runner.bind_runtime()?;

    let mut map = build_map(&args.sources)?;
    let mut dialog = MosaicDialog::open(&map)?.with_default_method(config.mosaic.method);
    if dialog.catalog().is_empty() {
        return Err(CliError::InvalidArgument(
            "the map has no raster layers; add some with --layer or --layers".to_string(),
        ));
    }
    let mut workflow = MosaicWorkflow::from_config(&config, runtime.geoprocessor());

    let theme = ColorfulTheme::default();
    println!();
    println!("{}", style("Mosaic To New Raster").bold().underlined());
    println!(
        "Backend: {}{}",
        style(runtime.backend()).cyan(),
        if runtime.fell_back() { " (fallback)" } else { "" }
    );
    println!();

    loop {
        edit_form(&mut dialog, &theme)?;

        let proceed = Confirm::with_theme(&theme)
            .with_prompt("Run mosaic?")
            .default(true)
            .interact()?;
        if !proceed {
            dialog.cancel();
            println!("Cancelled.");
            return Ok(());
        }

        let progress = Progress::start("Mosaicking", true);
        let mut notifier = progress.notifier();
        dialog.accept_with_progress(&mut workflow, &mut map, &mut notifier, &mut || {
            progress.tick()
        });
        progress.finish();

        if dialog.result() == Some(DialogResult::Ok) {
            println!();
            print_map_layers(&map);
            return Ok(());
        }

        let retry = Confirm::with_theme(&theme)
            .with_prompt("Edit and try again?")
            .default(true)
            .interact()?;
        if !retry {
            dialog.cancel();
            return Err(CliError::MosaicIncomplete);
        }
    }
}

/// Prompt for the checklist, method and output path.
fn edit_form(dialog: &mut MosaicDialog, theme: &ColorfulTheme) -> Result<(), CliError> {
    let items = dialog.checklist().items().to_vec();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    let defaults: Vec<bool> = items.iter().map(|i| i.checked).collect();
    let checked = MultiSelect::with_theme(theme)
        .with_prompt("Raster layers (space to toggle)")
        .items(&names)
        .defaults(&defaults)
        .interact()?;
    for index in 0..items.len() {
        dialog
            .checklist_mut()
            .set_checked_at(index, checked.contains(&index));
    }

    let labels = dialog.method_labels();
    let method = Select::with_theme(theme)
        .with_prompt("Mosaic method")
        .items(&labels)
        .default(dialog.selected_method().unwrap_or(0))
        .interact()?;
    dialog.select_method(Some(method));

    dialog.browse(&mut PromptSaveChooser { theme });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension_appended() {
        assert_eq!(
            with_default_extension("/tmp/out", "tif"),
            Some(PathBuf::from("/tmp/out.tif"))
        );
        assert_eq!(
            with_default_extension("/tmp/out.tiff", "tif"),
            Some(PathBuf::from("/tmp/out.tiff"))
        );
        assert_eq!(with_default_extension("", "tif"), None);
    }

    #[test]
    fn test_filter_extension() {
        assert_eq!(FileFilter::TIFF.pattern.trim_start_matches("*."), "tif");
    }
}
