//! Core Settings struct and implementations.

use super::{AppSettings, PackageSettings, PlatformKey, PythonSettings, RuntimeSettings};
use std::path::{Path, PathBuf};

/// Main settings for a bundle build.
///
/// Central configuration for the bundler, constructed via [`SettingsBuilder`].
/// All paths are absolute once built.
///
/// # Examples
///
/// ```no_run
/// use runtime_bundler::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> runtime_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root(".")
///     .package_settings(PackageSettings {
///         product_name: "reviewer".into(),
///         version: "1.2.3".into(),
///     })
///     .build()?;
/// assert_eq!(settings.version_string(), "1.2.3");
/// # Ok(())
/// # }
/// ```
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    package: PackageSettings,
    runtime: RuntimeSettings,
    python: PythonSettings,
    app: AppSettings,
    project_root: PathBuf,
    out_directory: PathBuf,
    staging_directory: PathBuf,
    launcher_binary: PathBuf,
}

impl Settings {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the release version string.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Returns the runtime settings.
    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    /// Returns the interpreter dependency settings.
    pub fn python(&self) -> &PythonSettings {
        &self.python
    }

    /// Returns the application payload settings.
    pub fn app(&self) -> &AppSettings {
        &self.app
    }

    /// Directory relative paths in the configuration resolve against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory receiving the final archive (`dist/`).
    pub fn out_directory(&self) -> &Path {
        &self.out_directory
    }

    /// Parent directory of staging trees (`build/`).
    pub fn staging_directory(&self) -> &Path {
        &self.staging_directory
    }

    /// Compiled launcher copied into every bundle.
    pub fn launcher_binary(&self) -> &Path {
        &self.launcher_binary
    }

    /// File name of the archive for a platform.
    pub fn archive_name(&self, platform: PlatformKey) -> String {
        format!(
            "{}-runtime-v{}-{}.tar.gz",
            self.product_name(),
            self.version_string(),
            platform
        )
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        package: PackageSettings,
        runtime: RuntimeSettings,
        python: PythonSettings,
        app: AppSettings,
        project_root: PathBuf,
        out_directory: PathBuf,
        staging_directory: PathBuf,
        launcher_binary: PathBuf,
    ) -> Self {
        Self {
            package,
            runtime,
            python,
            app,
            project_root,
            out_directory,
            staging_directory,
            launcher_binary,
        }
    }
}
