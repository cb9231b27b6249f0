//! GeoMosaic CLI - Command-line interface
//!
//! Builds a map from raster files given on the command line and runs the
//! mosaic workflow against it, either non-interactively or through an
//! interactive dialog.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geomosaic::config::config_file_path;

use commands::common::SourceArgs;
use commands::config::ConfigCommands;
use commands::dialog::DialogArgs;
use commands::mosaic::MosaicArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "geomosaic")]
#[command(version, about = "Merge raster map layers into a single mosaic raster", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.geomosaic/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mosaic raster layers into a new raster
    Mosaic(MosaicArgs),

    /// Choose layers, method and output interactively
    Dialog(DialogArgs),

    /// List the raster layers of the given sources
    Layers(SourceArgs),

    /// List the available mosaic methods
    Methods,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create the configuration file with defaults
    Init,
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config_file_path);

    let result: Result<(), CliError> = match cli.command {
        Commands::Mosaic(args) => commands::mosaic::run(args, &config_path, cli.verbose),
        Commands::Dialog(args) => commands::dialog::run(args, &config_path, cli.verbose),
        Commands::Layers(sources) => commands::layers::run(&sources),
        Commands::Methods => commands::methods::run(),
        Commands::Config { command } => commands::config::run(command, &config_path),
        Commands::Init => commands::init::run(&config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
