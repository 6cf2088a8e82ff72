//! Top-level error type for both binaries.
//!
//! Wraps the library errors with actionable recovery suggestions and maps
//! each kind to a process exit code.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type surfaced to the user
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Build pipeline errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Launcher errors
    #[error("{0}")]
    Launcher(#[from] crate::launcher::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as E;

        match self {
            BundlerError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see accepted options".to_string()]
            }
            BundlerError::Bundler(e) => match e.root() {
                E::UnsupportedPlatform { .. } => vec![format!(
                    "Build on one of: {}",
                    crate::bundler::SUPPORTED_PLATFORMS
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )],
                E::MissingVersionArgument { .. } => vec![
                    "Pass the release version as the first argument, e.g. `runtime-bundler 1.2.3`"
                        .to_string(),
                ],
                E::NoInterpreterFound { candidates, .. } => {
                    vec![crate::interpreter::install_hint(candidates)]
                }
                E::DownloadFailure { .. } => vec![
                    "Check network access and the [runtime] url_template in bundle.toml".to_string(),
                    "Or pass --runtime-archive with a locally downloaded zip".to_string(),
                ],
                E::DependencyInstallFailure { .. } => vec![
                    "Check the [python] requirements in bundle.toml and the installer output above"
                        .to_string(),
                ],
                E::RuntimeArchiveShape(_) => vec![
                    "The runtime archive must contain exactly one file, the runtime executable"
                        .to_string(),
                ],
                E::Config { path, .. } => vec![format!("Fix the syntax in {}", path.display())],
                E::MissingApplication { entry } => vec![
                    format!("Build the application so that cli/dist/{entry} exists"),
                    "Or set [app] cli_dir in bundle.toml".to_string(),
                ],
                _ => vec!["Re-run with --verbose for more detail".to_string()],
            },
            BundlerError::Launcher(e) => vec![e.remediation()],
            BundlerError::Io(_) => {
                vec!["Check the error message above for specific details".to_string()]
            }
        }
    }

    /// Process exit code: 2 for usage errors, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Cli(_) => 2,
            BundlerError::Bundler(e)
                if matches!(e.root(), crate::bundler::Error::MissingVersionArgument { .. }) =>
            {
                2
            }
            _ => 1,
        }
    }
}
