//! Common types and utilities shared across CLI commands.

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use geomosaic::layer::{layers_from_glob, parse_layer_spec, InMemoryMap, MapLayer};
use geomosaic::workflow::{Notification, Notifier, Severity};

use crate::error::CliError;

/// Where the map's layers come from.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Add a layer as NAME=PATH (or a bare PATH named after its file stem)
    #[arg(long = "layer", value_name = "NAME=PATH")]
    pub layer: Vec<String>,

    /// Add one layer per file matching a glob pattern
    #[arg(long = "layers", value_name = "GLOB")]
    pub layers: Vec<String>,
}

impl SourceArgs {
    pub fn is_empty(&self) -> bool {
        self.layer.is_empty() && self.layers.is_empty()
    }
}

/// Build the in-memory map: explicit layers first, then glob matches.
pub fn build_map(sources: &SourceArgs) -> Result<InMemoryMap, CliError> {
    let mut layers: Vec<MapLayer> = Vec::new();
    for spec in &sources.layer {
        layers.push(parse_layer_spec(spec)?);
    }
    for pattern in &sources.layers {
        let matched = layers_from_glob(pattern)?;
        if matched.is_empty() {
            eprintln!(
                "  {} No files match '{}'",
                style("!").yellow(),
                pattern
            );
        }
        layers.extend(matched);
    }
    Ok(InMemoryMap::with_layers(layers))
}

/// Print the map's layers in drawing order.
pub fn print_map_layers(map: &InMemoryMap) {
    println!("{}", style("Map layers").bold());
    if map.layers().is_empty() {
        println!("  (none)");
        return;
    }
    for (index, layer) in map.layers().iter().enumerate() {
        let path = layer
            .dataset
            .as_ref()
            .map(|d| d.full_path().display().to_string())
            .unwrap_or_default();
        println!(
            "  {:>2}  {:<24} {:<7} {}",
            index,
            layer.name,
            layer.kind.to_string(),
            style(path).dim()
        );
    }
}

/// Print one notification to stderr.
pub fn print_notification(notification: &Notification) {
    let marker = match notification.severity {
        Severity::Info => style("✓").green(),
        Severity::Warning => style("!").yellow(),
        Severity::Error => style("✗").red(),
    };
    let message = notification.message.trim_end();
    if message.contains('\n') {
        eprintln!("{} {}", marker, style(&notification.title).bold());
        for line in message.lines() {
            eprintln!("    {}", line);
        }
    } else {
        eprintln!("{} {}: {}", marker, style(&notification.title).bold(), message);
    }
}

/// Prints notifications without tearing the spinner.
pub struct ConsoleNotifier {
    bar: ProgressBar,
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: Notification) {
        self.bar.suspend(|| print_notification(&notification));
    }
}

/// Spinner shown while a mosaic runs.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Start a spinner on stderr, or a hidden one when `visible` is false or
    /// stderr is not a terminal.
    pub fn start(message: &str, visible: bool) -> Self {
        let bar = if visible && atty::is(atty::Stream::Stderr) {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// A notifier that prints around this spinner.
    pub fn notifier(&self) -> ConsoleNotifier {
        ConsoleNotifier {
            bar: self.bar.clone(),
        }
    }

    pub fn tick(&self) {
        self.bar.tick();
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
