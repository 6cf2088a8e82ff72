//! Project source discovery.
//!
//! Fills in application directories the configuration leaves unset by
//! looking in conventional locations under the project root.

use crate::bundler::AppSettings;
use std::path::{Path, PathBuf};

/// Conventional locations of the built CLI, in priority order.
pub const CLI_DIR_CANDIDATES: [&str; 2] = ["cli/dist", "cli"];

/// Conventional locations of interpreter-side sources, in priority order.
pub const PYTHON_DIR_CANDIDATES: [&str; 1] = ["python"];

/// Directories found under a project root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectSources {
    /// Built CLI directory
    pub cli_dir: Option<PathBuf>,
    /// Interpreter sources directory
    pub python_dir: Option<PathBuf>,
}

impl ProjectSources {
    /// Probes conventional locations under `project_root`.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            cli_dir: first_dir(project_root, &CLI_DIR_CANDIDATES),
            python_dir: first_dir(project_root, &PYTHON_DIR_CANDIDATES),
        }
    }

    /// Uses discovered directories where `app` has none configured.
    pub fn fill_in(self, app: &mut AppSettings) {
        if app.cli_dir.is_none() {
            if let Some(dir) = self.cli_dir {
                log::debug!("Using application directory {}", dir.display());
                app.cli_dir = Some(dir);
            }
        }
        if app.python_dir.is_none() {
            if let Some(dir) = self.python_dir {
                log::debug!("Using interpreter sources {}", dir.display());
                app.python_dir = Some(dir);
            }
        }
    }
}

fn first_dir(root: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|c| root.join(c))
        .find(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_built_cli_output() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("cli/dist")).unwrap();
        std::fs::create_dir_all(tmp.path().join("python")).unwrap();

        let found = ProjectSources::discover(tmp.path());
        assert_eq!(found.cli_dir, Some(tmp.path().join("cli/dist")));
        assert_eq!(found.python_dir, Some(tmp.path().join("python")));
    }

    #[test]
    fn configured_directories_win() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("cli")).unwrap();

        let mut app = AppSettings {
            cli_dir: Some(PathBuf::from("/elsewhere/out")),
            ..AppSettings::default()
        };
        ProjectSources::discover(tmp.path()).fill_in(&mut app);
        assert_eq!(app.cli_dir, Some(PathBuf::from("/elsewhere/out")));
        assert_eq!(app.python_dir, None);
    }
}
