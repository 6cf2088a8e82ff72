//! Interpreter discovery and package-installer invocation.
//!
//! Shared by the build-time dependency bundler and the launcher's repair
//! path, which must agree on how candidates are chosen and how `pip` is
//! invoked against `pydeps/`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Flag that lets pip write despite an externally-managed environment marker.
pub const PRIVILEGED_INSTALL_FLAG: &str = "--break-system-packages";

/// A located interpreter executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Candidate name as configured, e.g. `python3`
    pub command: String,
    /// Resolved executable path
    pub path: PathBuf,
}

/// Returns the first candidate present on `PATH`.
pub fn locate(candidates: &[String]) -> Option<Interpreter> {
    candidates.iter().find_map(|candidate| match which::which(candidate) {
        Ok(path) => {
            log::debug!("Found {} at: {}", candidate, path.display());
            Some(Interpreter {
                command: candidate.clone(),
                path,
            })
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", candidate, e);
            None
        }
    })
}

/// Returns the first candidate whose package installer responds.
pub fn select_with_installer(candidates: &[String]) -> Option<Interpreter> {
    candidates.iter().find_map(|candidate| {
        let path = which::which(candidate).ok()?;
        if has_installer(&path) {
            Some(Interpreter {
                command: candidate.clone(),
                path,
            })
        } else {
            None
        }
    })
}

/// Checks that `<interpreter> -m pip --version` succeeds.
pub fn has_installer(path: &Path) -> bool {
    match Command::new(path)
        .args(["-m", "pip", "--version"])
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            log::info!("✓ pip available via {}: {}", path.display(), version.trim());
            true
        }
        Ok(output) => {
            log::warn!(
                "{} found but `-m pip --version` failed (exit code: {:?}). Stderr: {}",
                path.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            log::warn!(
                "{} found but failed to execute: {}. Check file permissions.",
                path.display(),
                e
            );
            false
        }
    }
}

/// Arguments for installing a requirements file into an isolated target.
///
/// `--isolated` keeps user and global pip configuration out of the install;
/// `--target` keeps packages out of the interpreter's own site-packages.
pub fn pip_install_args(requirements: &Path, target: &Path, privileged: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-m",
        "pip",
        "install",
        "--isolated",
        "--no-input",
        "--disable-pip-version-check",
        "--no-warn-script-location",
        "--upgrade",
        "--target",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(target.as_os_str().to_owned());
    args.push("-r".into());
    args.push(requirements.as_os_str().to_owned());
    if privileged {
        args.push(PRIVILEGED_INSTALL_FLAG.into());
    }
    args
}

/// Human-readable remediation for a missing interpreter.
pub fn install_hint(candidates: &[String]) -> String {
    format!(
        "a Python 3 interpreter with pip is required; install one so that `{}` is on PATH",
        candidates.first().map(String::as_str).unwrap_or("python3")
    )
}
