//! Geoprocessing runtime binding.
//!
//! Chooses the backend the application runs mosaics with. The configured
//! backend is tried first; if it is unavailable the native engine is used
//! when fallback is enabled. Without a runtime the application cannot run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::command::CommandGeoprocessor;
use super::native::NativeGeoprocessor;
use super::tool::Geoprocessor;
use crate::config::{Backend, GeoprocessingSettings};

/// No geoprocessing runtime could be bound.
#[derive(Debug, Error)]
#[error("Unable to bind to a geoprocessing runtime. Application will be shut down.")]
pub struct BindError {
    /// Backend that was requested.
    pub backend: Backend,
    /// Why it could not be bound.
    pub reason: String,
}

/// A bound geoprocessing backend.
#[derive(Clone)]
pub struct BoundRuntime {
    geoprocessor: Arc<dyn Geoprocessor>,
    backend: Backend,
    fell_back: bool,
}

impl BoundRuntime {
    /// Shared handle to the backend.
    pub fn geoprocessor(&self) -> Arc<dyn Geoprocessor> {
        Arc::clone(&self.geoprocessor)
    }

    /// Backend actually bound.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// True when the configured backend was unavailable and the native
    /// engine was bound instead.
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }
}

impl fmt::Debug for BoundRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRuntime")
            .field("geoprocessor", &self.geoprocessor.name())
            .field("backend", &self.backend)
            .field("fell_back", &self.fell_back)
            .finish()
    }
}

/// Bind the configured geoprocessing backend.
///
/// # Errors
///
/// Returns [`BindError`] when the configured backend is unavailable and
/// `fallback_native` is off.
pub fn bind(settings: &GeoprocessingSettings) -> Result<BoundRuntime, BindError> {
    match bind_backend(settings, settings.backend) {
        Ok(geoprocessor) => {
            info!(backend = %settings.backend, "Bound geoprocessing runtime");
            Ok(BoundRuntime {
                geoprocessor,
                backend: settings.backend,
                fell_back: false,
            })
        }
        Err(reason) if settings.fallback_native && settings.backend != Backend::Native => {
            warn!(
                backend = %settings.backend,
                reason = %reason,
                "Geoprocessing backend unavailable, falling back to native engine"
            );
            Ok(BoundRuntime {
                geoprocessor: Arc::new(NativeGeoprocessor::new()),
                backend: Backend::Native,
                fell_back: true,
            })
        }
        Err(reason) => Err(BindError {
            backend: settings.backend,
            reason,
        }),
    }
}

fn bind_backend(
    settings: &GeoprocessingSettings,
    backend: Backend,
) -> Result<Arc<dyn Geoprocessor>, String> {
    match backend {
        Backend::Native => Ok(Arc::new(NativeGeoprocessor::new())),
        Backend::Command => {
            let program = settings
                .command
                .as_deref()
                .ok_or_else(|| "no command configured".to_string())?;
            let resolved = find_program(program)
                .ok_or_else(|| format!("program '{}' not found", program))?;
            Ok(Arc::new(CommandGeoprocessor::new(
                resolved.display().to_string(),
                settings.args.clone(),
            )))
        }
    }
}

/// Locate a program by path or on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.is_absolute() || path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }

    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let with_suffix = dir.join(format!("{}{}", program, std::env::consts::EXE_SUFFIX));
        with_suffix.is_file().then_some(with_suffix)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: Backend, command: Option<&str>, fallback: bool) -> GeoprocessingSettings {
        GeoprocessingSettings {
            backend,
            command: command.map(str::to_string),
            fallback_native: fallback,
            ..GeoprocessingSettings::default()
        }
    }

    #[test]
    fn test_bind_native() {
        let runtime = bind(&settings(Backend::Native, None, false)).unwrap();
        assert_eq!(runtime.backend(), Backend::Native);
        assert_eq!(runtime.geoprocessor().name(), "native");
        assert!(!runtime.fell_back());
    }

    #[test]
    fn test_missing_command_falls_back() {
        let runtime =
            bind(&settings(Backend::Command, Some("/nonexistent/gdal_merge.py"), true)).unwrap();
        assert_eq!(runtime.backend(), Backend::Native);
        assert!(runtime.fell_back());
    }

    #[test]
    fn test_missing_command_without_fallback_fails() {
        let err = bind(&settings(Backend::Command, Some("no-such-mosaic-tool-xyz"), false))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to bind to a geoprocessing runtime. Application will be shut down."
        );
        assert!(err.reason.contains("no-such-mosaic-tool-xyz"));
    }

    #[test]
    fn test_unset_command_without_fallback_fails() {
        let err = bind(&settings(Backend::Command, None, false)).unwrap_err();
        assert_eq!(err.backend, Backend::Command);
        assert_eq!(err.reason, "no command configured");
    }

    #[cfg(unix)]
    #[test]
    fn test_bind_command_found_on_path() {
        let runtime = bind(&settings(Backend::Command, Some("sh"), false)).unwrap();
        assert_eq!(runtime.backend(), Backend::Command);
        assert_eq!(runtime.geoprocessor().name(), "command");
    }

    #[test]
    fn test_find_program_absolute() {
        let temp = tempfile::TempDir::new().unwrap();
        let program = temp.path().join("tool");
        std::fs::write(&program, b"").unwrap();

        assert_eq!(
            find_program(&program.display().to_string()),
            Some(program.clone())
        );
        assert_eq!(find_program(&temp.path().join("missing").display().to_string()), None);
    }
}
