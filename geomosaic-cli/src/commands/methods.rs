//! Methods command - list the mosaic methods.

use console::style;
use geomosaic::mosaic::MosaicMethod;

use crate::error::CliError;

/// Run the methods command.
pub fn run() -> Result<(), CliError> {
    println!("{}", style("Mosaic methods").bold());
    for (index, method) in MosaicMethod::ALL.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!("  {} {}", marker, method.label());
    }
    println!();
    println!("* default selection; pass the keyword or the full label to --method");
    Ok(())
}
