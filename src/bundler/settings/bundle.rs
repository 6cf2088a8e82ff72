//! Interpreter and application payload settings.

use super::RequirementsSpec;
use std::path::PathBuf;

/// Interpreter dependency configuration.
#[derive(Debug, Clone)]
pub struct PythonSettings {
    /// Dependencies installed into `pydeps/` and written to `requirements.txt`.
    pub requirements: RequirementsSpec,

    /// Module imported by the launcher to detect an ABI mismatch.
    ///
    /// Must be a compiled extension; pure-source packages import under any
    /// interpreter and would never trigger a repair.
    pub probe_module: String,

    /// Interpreter executables tried in order.
    pub candidates: Vec<String>,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            requirements: RequirementsSpec::default(),
            probe_module: "pydantic_core".into(),
            candidates: super::DEFAULT_INTERPRETERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Application sources copied into `app/`.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Entrypoint script, relative to `app/`.
    pub entry: String,

    /// Built CLI directory whose contents land in `app/`.
    pub cli_dir: Option<PathBuf>,

    /// Interpreter-side sources whose contents land in `app/python/`.
    pub python_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            entry: "cli.js".into(),
            cli_dir: None,
            python_dir: None,
        }
    }
}
