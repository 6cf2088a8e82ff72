//! Builder for constructing Settings.

use super::{AppSettings, PackageSettings, PythonSettings, RuntimeSettings, Settings};
use crate::bundler::{Error, Result, error::Context};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Name of the compiled launcher shipped next to the builder executable.
pub const LAUNCHER_BINARY_NAME: &str = "runtime-launcher";

/// Builder for constructing [`Settings`].
///
/// Relative paths are resolved against the project root, which itself
/// defaults to the current directory.
///
/// # Examples
///
/// ```no_run
/// use runtime_bundler::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> runtime_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root("/work/reviewer")
///     .out_directory("dist")
///     .package_settings(PackageSettings {
///         product_name: "reviewer".into(),
///         version: "1.2.3".into(),
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    project_root: Option<PathBuf>,
    out_directory: Option<PathBuf>,
    staging_directory: Option<PathBuf>,
    launcher_binary: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    runtime_settings: RuntimeSettings,
    python_settings: PythonSettings,
    app_settings: AppSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root.
    ///
    /// Default: current directory
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the archive output directory.
    ///
    /// Default: `<project_root>/dist`
    pub fn out_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the parent directory of staging trees.
    ///
    /// Default: `<project_root>/build`
    pub fn staging_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the compiled launcher to embed.
    ///
    /// Default: `runtime-launcher` next to the running executable
    pub fn launcher_binary<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.launcher_binary = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets product name and version.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets runtime download configuration.
    pub fn runtime_settings(mut self, settings: RuntimeSettings) -> Self {
        self.runtime_settings = settings;
        self
    }

    /// Sets interpreter dependency configuration.
    pub fn python_settings(mut self, settings: PythonSettings) -> Self {
        self.python_settings = settings;
        self
    }

    /// Sets application payload configuration.
    pub fn app_settings(mut self, settings: AppSettings) -> Self {
        self.app_settings = settings;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// - `package_settings` missing
    /// - version empty or unusable in a file name ([`Error::MissingVersionArgument`])
    /// - no interpreter candidates configured
    pub fn build(self) -> Result<Settings> {
        let mut package = self
            .package_settings
            .context("package_settings is required")?;
        package.version = normalize_version(&package.version).to_string();
        validate_version(&package.version)?;

        if package.product_name.is_empty() || package.product_name.contains(['/', ' ']) {
            crate::bail!("invalid product name {:?}", package.product_name);
        }
        if self.python_settings.candidates.is_empty() {
            crate::bail!("at least one interpreter candidate is required");
        }

        let cwd = std::env::current_dir()?;
        let project_root = absolute(&self.project_root.unwrap_or_else(|| cwd.clone()), &cwd)?;

        let resolve = |p: Option<PathBuf>, default: &str| -> Result<PathBuf> {
            absolute(&p.unwrap_or_else(|| PathBuf::from(default)), &project_root)
        };
        let out_directory = resolve(self.out_directory, "dist")?;
        let staging_directory = resolve(self.staging_directory, "build")?;

        let launcher_binary = match self.launcher_binary {
            Some(p) => absolute(&p, &cwd)?,
            None => default_launcher_binary()?,
        };

        let mut runtime = self.runtime_settings;
        if let Some(archive) = runtime.archive.take() {
            runtime.archive = Some(absolute(&archive, &project_root)?);
        }

        let mut app = self.app_settings;
        if let Some(dir) = app.cli_dir.take() {
            app.cli_dir = Some(absolute(&dir, &project_root)?);
        }
        if let Some(dir) = app.python_dir.take() {
            app.python_dir = Some(absolute(&dir, &project_root)?);
        }

        Ok(Settings::new(
            package,
            runtime,
            self.python_settings,
            app,
            project_root,
            out_directory,
            staging_directory,
            launcher_binary,
        ))
    }
}

/// Strips a leading `v` from tag-style versions such as `v1.2.3`.
///
/// The archive name already carries the `v` prefix.
pub fn normalize_version(version: &str) -> &str {
    match version.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => version,
    }
}

/// Rejects versions that cannot be embedded in a file name.
///
/// Non-semver versions are accepted with a warning.
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(Error::MissingVersionArgument { reason: None });
    }
    if version.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(Error::MissingVersionArgument {
            reason: Some(format!("{version:?} contains whitespace or a path separator")),
        });
    }
    if semver::Version::parse(version).is_err() {
        log::warn!("Version {version:?} is not a semantic version; using it verbatim");
    }
    Ok(())
}

fn absolute(path: &Path, base: &Path) -> Result<PathBuf> {
    Ok(path.absolutize_from(base)?.into_owned())
}

fn default_launcher_binary() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .context("running executable has no parent directory")?;
    Ok(dir.join(format!("{LAUNCHER_BINARY_NAME}{}", std::env::consts::EXE_SUFFIX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(version: &str) -> PackageSettings {
        PackageSettings {
            product_name: "reviewer".into(),
            version: version.into(),
        }
    }

    #[test]
    fn resolves_paths_against_project_root() {
        let settings = SettingsBuilder::new()
            .project_root("/work/reviewer")
            .launcher_binary("/opt/runtime-launcher")
            .package_settings(package("1.2.3"))
            .build()
            .unwrap();
        assert_eq!(settings.out_directory(), Path::new("/work/reviewer/dist"));
        assert_eq!(settings.staging_directory(), Path::new("/work/reviewer/build"));
        assert_eq!(settings.launcher_binary(), Path::new("/opt/runtime-launcher"));
    }

    #[test]
    fn archive_name_is_deterministic() {
        let settings = SettingsBuilder::new()
            .project_root("/work")
            .launcher_binary("/opt/runtime-launcher")
            .package_settings(package("1.2.3"))
            .build()
            .unwrap();
        let key = crate::bundler::PlatformKey::from_parts("darwin", "arm64").unwrap();
        assert_eq!(
            settings.archive_name(key),
            "reviewer-runtime-v1.2.3-darwin-arm64.tar.gz"
        );
    }

    #[test]
    fn tag_style_version_is_not_prefixed_twice() {
        let settings = SettingsBuilder::new()
            .project_root("/work")
            .launcher_binary("/opt/runtime-launcher")
            .package_settings(package("v1.2.3"))
            .build()
            .unwrap();
        let key = crate::bundler::PlatformKey::from_parts("linux", "x64").unwrap();
        assert_eq!(settings.version_string(), "1.2.3");
        assert_eq!(
            settings.archive_name(key),
            "reviewer-runtime-v1.2.3-linux-x64.tar.gz"
        );
        assert_eq!(normalize_version("vnext"), "vnext");
    }

    #[test]
    fn missing_version_is_rejected() {
        let err = SettingsBuilder::new()
            .project_root("/work")
            .package_settings(package(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingVersionArgument { .. }));
    }

    #[test]
    fn version_with_separator_is_rejected() {
        assert!(validate_version("1.0/../../etc").is_err());
        assert!(validate_version("1 2").is_err());
        assert!(validate_version("2024.10").is_ok());
    }
}
