//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`mosaic`] - Non-interactive mosaic run
//! - [`dialog`] - Interactive mosaic dialog
//! - [`layers`] - Raster layer listing
//! - [`methods`] - Mosaic method listing
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`init`] - Configuration initialization

pub mod common;
pub mod config;
pub mod dialog;
pub mod init;
pub mod layers;
pub mod methods;
pub mod mosaic;
