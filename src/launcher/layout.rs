//! Locating the bundle from the launcher executable.

use super::{Error, LauncherSettings, Result};
use crate::layout;
use std::path::{Path, PathBuf};

/// Absolute paths inside an extracted bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    root: PathBuf,
}

impl BundleLayout {
    /// Derives the bundle from the launcher's own path: `bin/` is its parent
    /// and the root is `bin/..`.
    pub fn from_launcher_exe(exe: &Path) -> Result<Self> {
        let exe = std::fs::canonicalize(exe).unwrap_or_else(|_| exe.to_path_buf());
        let root = exe
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| {
                Error::InvalidLayout(format!(
                    "{} is not inside a bundle's {}/ directory",
                    exe.display(),
                    layout::BIN_DIR
                ))
            })?;
        Ok(Self::from_root(root))
    }

    /// Uses an explicit bundle root.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `bin/`
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(layout::BIN_DIR)
    }

    /// `app/python/`
    pub fn app_python_dir(&self) -> PathBuf {
        self.root.join(layout::APP_DIR).join(layout::APP_PYTHON_DIR)
    }

    /// `pydeps/`
    pub fn pydeps_dir(&self) -> PathBuf {
        self.root.join(layout::PYDEPS_DIR)
    }

    /// `requirements.txt`
    pub fn requirements_file(&self) -> PathBuf {
        self.root.join(layout::REQUIREMENTS_FILE)
    }

    /// `pydeps/.verified`
    pub fn marker(&self) -> PathBuf {
        self.pydeps_dir().join(layout::VERIFICATION_MARKER)
    }

    /// `pydeps/.verify.lock`
    pub fn lock_file(&self) -> PathBuf {
        self.pydeps_dir().join(layout::REPAIR_LOCK)
    }

    /// `bin/<runtime>`
    pub fn runtime_binary(&self, runtime: &str) -> PathBuf {
        self.bin_dir().join(runtime)
    }

    /// `app/<entry>`
    pub fn entry(&self, entry: &str) -> PathBuf {
        self.root.join(layout::APP_DIR).join(entry)
    }

    /// Checks the files the launch depends on before touching anything.
    pub fn validate(&self, settings: &LauncherSettings) -> Result<()> {
        let runtime = self.runtime_binary(&settings.runtime);
        if !runtime.is_file() {
            return Err(Error::InvalidLayout(format!(
                "runtime executable {} is missing",
                runtime.display()
            )));
        }
        let entry = self.entry(&settings.entry);
        if !entry.is_file() {
            return Err(Error::InvalidLayout(format!(
                "application entrypoint {} is missing",
                entry.display()
            )));
        }
        Ok(())
    }
}
