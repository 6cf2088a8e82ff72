//! Error types for bundle construction.
//!
//! Every stage of the build returns [`Result`]; the first error aborts the
//! whole build so a half-populated staging tree is never archived.

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Result type for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building a bundle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Host OS or CPU is not one of the supported combinations.
    #[error("unsupported platform: os={os}, arch={arch} (supported: darwin|linux × arm64|x64)")]
    UnsupportedPlatform {
        /// OS identifier as reported by the host
        os: String,
        /// CPU identifier as reported by the host
        arch: String,
    },

    /// The release version was not supplied or is unusable in a file name.
    #[error("missing or invalid version argument{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    MissingVersionArgument {
        /// Why a supplied version was rejected
        reason: Option<String>,
    },

    /// None of the interpreter candidates provides a working package installer.
    #[error("no usable interpreter found (tried: {}); {requirement}", candidates.join(", "))]
    NoInterpreterFound {
        /// Candidates probed, in order
        candidates: Vec<String>,
        /// What the interpreter must provide
        requirement: String,
    },

    /// The runtime archive could not be downloaded.
    #[error("failed to download {url}: {reason}")]
    DownloadFailure {
        /// Requested URL
        url: String,
        /// Transport or HTTP status detail
        reason: String,
    },

    /// The package installer exited non-zero.
    #[error("dependency install failed using {interpreter} ({status}){}", if stderr.is_empty() { String::new() } else { format!(":\n{stderr}") })]
    DependencyInstallFailure {
        /// Interpreter that ran the installer
        interpreter: PathBuf,
        /// Exit status description
        status: String,
        /// Captured installer stderr
        stderr: String,
    },

    /// No application directory was configured or discovered.
    #[error("no application directory found; the bundle would have no {entry} to run")]
    MissingApplication {
        /// Entrypoint the launcher expects under `app/`
        entry: String,
    },

    /// The runtime archive does not contain exactly one executable.
    #[error("unexpected runtime archive layout: {0}")]
    RuntimeArchiveShape(String),

    /// Filesystem operation failed on a specific path.
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Plain IO error.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// Launcher script template failed to render.
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Runtime zip could not be read.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Project configuration is malformed.
    #[error("invalid configuration {}: {reason}", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Relative path computation failed.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Directory walk failed.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// A pipeline stage failed; carries the stage label for diagnostics.
    #[error("{stage} failed: {source}")]
    StageFailed {
        /// Stage label, e.g. "runtime fetch"
        stage: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Anything else, with a human readable message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Innermost error, looking through stage labels.
    pub fn root(&self) -> &Error {
        match self {
            Error::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attaches a message to an `Option` or a foreign `Result`.
pub trait Context<T> {
    /// Converts to [`Result`], using `msg` as the error message.
    fn context<C>(self, msg: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, msg: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, msg: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

/// Adds path context to IO results.
pub trait ErrorExt<T> {
    /// Wraps an IO error with what was being done and to which path.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_path_and_source() {
        let err = Err::<(), _>(std::io::Error::from(std::io::ErrorKind::NotFound))
            .fs_context("reading manifest", "/tmp/nowhere")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("reading manifest"));
        assert!(msg.contains("/tmp/nowhere"));
    }

    #[test]
    fn option_context_uses_message() {
        let err = None::<u8>.context("binary name is required").unwrap_err();
        assert_eq!(err.to_string(), "binary name is required");
    }

    #[test]
    fn root_unwraps_stage_labels() {
        let err = Error::StageFailed {
            stage: "runtime fetch",
            source: Box::new(Error::DownloadFailure {
                url: "https://example.invalid/deno.zip".into(),
                reason: "404 Not Found".into(),
            }),
        };
        assert!(err.to_string().starts_with("runtime fetch failed: "));
        assert!(matches!(err.root(), Error::DownloadFailure { .. }));
    }

    #[test]
    fn no_interpreter_lists_candidates() {
        let err = Error::NoInterpreterFound {
            candidates: vec!["python3".into(), "python".into()],
            requirement: "install Python 3 with pip".into(),
        };
        assert!(err.to_string().contains("python3, python"));
    }
}
