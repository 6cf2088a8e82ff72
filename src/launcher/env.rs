//! Child process environment.
//!
//! The launcher never mutates its own environment. [`LaunchEnv`] is computed
//! once from the layout and a snapshot of the ambient variables, then applied
//! to every child [`Command`].

use super::{BundleLayout, Error, LauncherSettings, Result};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;

/// Ambient inputs the environment depends on.
#[derive(Debug, Clone, Default)]
pub struct AmbientEnv {
    /// Inherited `PATH`
    pub path: Option<OsString>,
    /// Inherited value of the runtime's cache variable
    pub cache_dir: Option<OsString>,
    /// Per-user cache directory
    pub user_cache_dir: Option<PathBuf>,
}

impl AmbientEnv {
    /// Reads the current process environment.
    pub fn capture(cache_env: &str) -> Self {
        Self {
            path: std::env::var_os("PATH"),
            cache_dir: std::env::var_os(cache_env).filter(|v| !v.is_empty()),
            user_cache_dir: dirs::cache_dir(),
        }
    }
}

/// Variables set on every child process, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnv {
    vars: Vec<(OsString, OsString)>,
}

impl LaunchEnv {
    /// Computes the child environment.
    ///
    /// - `PATH`: `bin/` ahead of the ambient `PATH`
    /// - `PYTHONPATH`: `pydeps/` then `app/python/`, replacing any ambient value
    /// - the runtime cache variable: ambient value, else the user cache
    ///   directory, else `<root>/.cache/<runtime>`
    pub fn configure(
        layout: &BundleLayout,
        settings: &LauncherSettings,
        ambient: &AmbientEnv,
    ) -> Result<Self> {
        let ambient_path = ambient.path.clone().unwrap_or_default();
        // Empty entries mean the working directory; never carry them over.
        let inherited =
            std::env::split_paths(&ambient_path).filter(|p| !p.as_os_str().is_empty());
        let path = std::env::join_paths(std::iter::once(layout.bin_dir()).chain(inherited))
        .map_err(|e| Error::InvalidLayout(format!("cannot extend PATH: {e}")))?;

        let python_path = std::env::join_paths([layout.pydeps_dir(), layout.app_python_dir()])
            .map_err(|e| Error::InvalidLayout(format!("cannot build PYTHONPATH: {e}")))?;

        let cache = match &ambient.cache_dir {
            Some(dir) => dir.clone(),
            None => match &ambient.user_cache_dir {
                Some(base) => base.join(&settings.product).join(&settings.runtime),
                None => layout.root().join(".cache").join(&settings.runtime),
            }
            .into_os_string(),
        };

        Ok(Self {
            vars: vec![
                ("PATH".into(), path),
                ("PYTHONPATH".into(), python_path),
                (settings.cache_env.clone().into(), cache),
            ],
        })
    }

    /// Value assigned to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Sets every variable on `command`.
    pub fn apply<'c>(&self, command: &'c mut Command) -> &'c mut Command {
        command.envs(self.vars.iter().map(|(k, v)| (k, v)))
    }
}
