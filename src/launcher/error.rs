//! Launcher failures.
//!
//! Each variant carries enough context for a one-line remediation, because
//! the person reading it is the end user, not the bundle author.

use std::path::PathBuf;

/// Result type for launcher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the launcher before the application runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the candidate interpreters is on `PATH`.
    #[error("no Python interpreter found to load bundled dependencies (tried: {})", candidates.join(", "))]
    NoInterpreterFound {
        /// Candidates tried, in order
        candidates: Vec<String>,
    },

    /// The interpreter that failed the import has no pip to repair with.
    #[error("bundled Python dependencies need repair, but {} has no pip", interpreter.display())]
    InstallerUnavailable {
        /// Interpreter the application will run under
        interpreter: PathBuf,
    },

    /// Reinstalling the bundled dependencies failed, with and without the privileged flag.
    #[error("reinstalling bundled Python dependencies with {} failed ({status}){}", interpreter.display(), if stderr.is_empty() { String::new() } else { format!(":\n{stderr}") })]
    DependencyInstallFailure {
        /// Interpreter that ran the installer
        interpreter: PathBuf,
        /// Exit status of the last attempt
        status: String,
        /// Installer stderr of the last attempt
        stderr: String,
    },

    /// The install succeeded but the dependencies still do not import.
    #[error("reinstalled bundled Python dependencies, but {} still cannot import {module}", interpreter.display())]
    RepairIneffective {
        /// Interpreter used for the import and the install
        interpreter: PathBuf,
        /// Module that failed to import
        module: String,
    },

    /// The requirements file the repair installs from is gone.
    #[error("cannot repair bundled Python dependencies: {} is missing", path.display())]
    MissingRequirements {
        /// Expected requirements file
        path: PathBuf,
    },

    /// The launcher is not inside a complete bundle.
    #[error("invalid bundle layout: {0}")]
    InvalidLayout(String),

    /// The runtime could not be started.
    #[error("failed to start {}: {source}", program.display())]
    Exec {
        /// Runtime executable
        program: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Single-line remediation printed after the error.
    pub fn remediation(&self) -> String {
        match self {
            Error::NoInterpreterFound { candidates } => crate::interpreter::install_hint(candidates),
            Error::InstallerUnavailable { interpreter } => format!(
                "install pip for {} (for example `{} -m ensurepip --user`)",
                interpreter.display(),
                interpreter.display()
            ),
            Error::RepairIneffective { module, .. } => format!(
                "the requirements do not provide `{module}` for this Python version; rebuild the bundle for it"
            ),
            Error::DependencyInstallFailure { .. } => {
                "check network access to the package index, then run the command again".into()
            }
            Error::MissingRequirements { .. } | Error::InvalidLayout(_) => {
                "the bundle is incomplete; extract the release archive again".into()
            }
            Error::Exec { .. } => {
                "make sure the bundle's bin/ directory is executable on this filesystem".into()
            }
            Error::Io(_) => "check permissions on the bundle directory".into(),
        }
    }
}
