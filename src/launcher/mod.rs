//! Runtime self-check and dispatch, run from inside an extracted bundle.
//!
//! Every invocation:
//!
//! 1. locates the bundle from the launcher's own path ([`BundleLayout`])
//! 2. computes the child environment ([`LaunchEnv`])
//! 3. verifies the bundled interpreter dependencies, repairing them once per
//!    machine when they fail to import ([`verify`])
//! 4. runs the runtime on the application entrypoint ([`dispatch`])

pub mod dispatch;
mod env;
mod error;
mod layout;
mod lock;
mod toolchain;
mod verify;

pub use dispatch::Dispatch;
pub use env::{AmbientEnv, LaunchEnv};
pub use error::{Error, Result};
pub use layout::BundleLayout;
pub use lock::RepairLock;
pub use toolchain::{InstallOutcome, SystemToolchain, Toolchain};
pub use verify::{Verification, verify};

use crate::bundler::{AppSettings, PythonSettings, RuntimeSettings};
use std::ffi::OsString;

/// Values baked into the dispatcher script at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Product name, used for the runtime cache location
    pub product: String,
    /// Runtime executable name inside `bin/`
    pub runtime: String,
    /// Entrypoint relative to `app/`
    pub entry: String,
    /// Compiled module imported to detect an ABI mismatch
    pub probe_module: String,
    /// Variable naming the runtime's cache directory
    pub cache_env: String,
    /// Interpreter executables tried in order
    pub candidates: Vec<String>,
    /// Arguments placed before the entrypoint
    pub runtime_args: Vec<String>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        let runtime = RuntimeSettings::default();
        let python = PythonSettings::default();
        Self {
            product: crate::bundler::DEFAULT_PRODUCT.into(),
            runtime: runtime.name,
            entry: AppSettings::default().entry,
            probe_module: python.probe_module,
            cache_env: runtime.cache_env,
            candidates: python.candidates,
            runtime_args: runtime.args,
        }
    }
}

/// Verifies the bundle and runs the application with `args`.
///
/// Returns the exit code to terminate with. With [`Dispatch::Replace`] on
/// unix, success never returns.
pub fn launch<T: Toolchain + ?Sized>(
    layout: &BundleLayout,
    settings: &LauncherSettings,
    toolchain: &T,
    dispatch: Dispatch,
    args: &[OsString],
) -> Result<i32> {
    layout.validate(settings)?;

    let ambient = AmbientEnv::capture(&settings.cache_env);
    let env = LaunchEnv::configure(layout, settings, &ambient)?;

    match verify(layout, settings, &env, toolchain)? {
        Verification::AlreadyVerified => log::debug!("Bundle already verified"),
        outcome => log::info!("Bundle verified ({:?})", outcome),
    }

    dispatch::run(dispatch, dispatch::command(layout, settings, &env, args))
}
