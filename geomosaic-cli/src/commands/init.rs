//! Init command - initialize configuration file.

use std::path::Path;

use console::style;
use geomosaic::config::ConfigFile;

use crate::error::CliError;

/// Write a default config file to `path` unless one exists.
pub fn run(path: &Path) -> Result<(), CliError> {
    if ConfigFile::ensure_exists_at(path)? {
        println!(
            "{} Created configuration file: {}",
            style("✓").green(),
            path.display()
        );
    } else {
        // Rewrite with the current key set, keeping values.
        let config = ConfigFile::load_from(path)?;
        config.save_to(path)?;
        println!("Configuration file already exists: {}", path.display());
    }

    println!();
    println!("Edit this file to customize GeoMosaic settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
