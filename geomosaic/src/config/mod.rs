//! Configuration file handling.
//!
//! User settings live in `~/.geomosaic/config.ini`. Settings structs are in
//! [`settings`], defaults in [`defaults`], INI parsing and serialization in
//! the private `parser` and `writer` modules, and typed per-key access for
//! the `config` command in [`keys`].
//!
//! # Example
//!
//! ```
//! use geomosaic::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! ConfigKey::MosaicMethod.set(&mut config, "mean").unwrap();
//! assert_eq!(ConfigKey::MosaicMethod.get(&config), "MEAN");
//! ```

pub mod defaults;
mod file;
pub mod keys;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    Backend, ConfigFile, GeoprocessingSettings, LoggingSettings, MosaicSettings,
};
