//! Interpreter operations used by verification and repair.

use super::{LaunchEnv, Result};
use crate::interpreter::{self, Interpreter};
use std::path::Path;
use std::process::{Command, Stdio};

/// Result of one installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Installer exited zero
    Installed,
    /// Installer exited non-zero
    Rejected {
        /// Exit status description
        status: String,
        /// Captured stderr
        stderr: String,
    },
}

/// The interpreter-facing side of the launcher.
///
/// Verification resolves one [`Interpreter`] and passes it to every other
/// call, so the import check and the install always agree.
pub trait Toolchain {
    /// First candidate found on `PATH`.
    fn locate(&self, candidates: &[String]) -> Option<Interpreter>;

    /// Whether `interpreter` can import `module` under `env`.
    fn can_import(&self, interpreter: &Interpreter, module: &str, env: &LaunchEnv) -> bool;

    /// Whether `interpreter` has a working package installer.
    fn has_installer(&self, interpreter: &Interpreter) -> bool;

    /// Installs `requirements` into `target`.
    fn install(
        &self,
        interpreter: &Interpreter,
        requirements: &Path,
        target: &Path,
        privileged: bool,
        env: &LaunchEnv,
    ) -> Result<InstallOutcome>;
}

/// Toolchain backed by the interpreters on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolchain;

impl Toolchain for SystemToolchain {
    fn locate(&self, candidates: &[String]) -> Option<Interpreter> {
        interpreter::locate(candidates)
    }

    fn can_import(&self, interpreter: &Interpreter, module: &str, env: &LaunchEnv) -> bool {
        let mut command = Command::new(&interpreter.path);
        env.apply(&mut command)
            .args(["-c", &format!("import {module}")])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        match command.output() {
            Ok(output) if output.status.success() => {
                log::debug!("✓ {} imports {}", interpreter.path.display(), module);
                true
            }
            Ok(output) => {
                log::debug!(
                    "Importing {} failed ({}): {}",
                    module,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(e) => {
                log::debug!("Failed to run {}: {}", interpreter.path.display(), e);
                false
            }
        }
    }

    fn has_installer(&self, interpreter: &Interpreter) -> bool {
        interpreter::has_installer(&interpreter.path)
    }

    fn install(
        &self,
        interpreter: &Interpreter,
        requirements: &Path,
        target: &Path,
        privileged: bool,
        env: &LaunchEnv,
    ) -> Result<InstallOutcome> {
        let mut command = Command::new(&interpreter.path);
        env.apply(&mut command)
            .args(interpreter::pip_install_args(requirements, target, privileged))
            .env("PYTHONNOUSERSITE", "1")
            .env_remove("PYTHONPATH")
            .env_remove("PIP_TARGET")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = command.output()?;
        if output.status.success() {
            Ok(InstallOutcome::Installed)
        } else {
            Ok(InstallOutcome::Rejected {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
