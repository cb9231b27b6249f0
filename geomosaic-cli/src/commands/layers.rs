//! Layers command - list the raster layers of the given sources.

use console::style;
use geomosaic::catalog::LayerCatalog;

use super::common::{build_map, SourceArgs};
use crate::error::CliError;

/// Run the layers command.
pub fn run(sources: &SourceArgs) -> Result<(), CliError> {
    let map = build_map(sources)?;
    let catalog = LayerCatalog::read(&map)?;

    if catalog.is_empty() {
        println!("No raster layers.");
        return Ok(());
    }

    println!("{}", style("Raster layers").bold());
    for layer in map.layers().iter().filter(|l| l.kind.is_raster()) {
        let path = layer
            .dataset
            .as_ref()
            .map(|d| d.full_path().display().to_string())
            .unwrap_or_default();
        println!("  [x] {:<24} {}", layer.name, style(path).dim());
    }

    let skipped = map.layers().len() - catalog.len();
    if skipped > 0 {
        println!();
        println!("{} non-raster layer(s) not shown", skipped);
    }
    Ok(())
}
