//! Staging tree preparation.

use crate::bundler::{PlatformKey, Result, utils::fs};
use crate::layout;
use std::path::{Path, PathBuf};

/// Disposable build tree holding `bin/`, `app/`, `app/python/` and `pydeps/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTree {
    root: PathBuf,
}

impl StagingTree {
    /// Tree root; becomes the archive root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Executables: runtime binary, dispatcher script and launcher.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(layout::BIN_DIR)
    }

    /// Application code.
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(layout::APP_DIR)
    }

    /// Interpreter-side application sources.
    pub fn app_python_dir(&self) -> PathBuf {
        self.app_dir().join(layout::APP_PYTHON_DIR)
    }

    /// Bundled interpreter dependencies.
    pub fn pydeps_dir(&self) -> PathBuf {
        self.root.join(layout::PYDEPS_DIR)
    }

    /// Fallback dependency description.
    pub fn requirements_file(&self) -> PathBuf {
        self.root.join(layout::REQUIREMENTS_FILE)
    }

    /// Build metadata.
    pub fn manifest_file(&self) -> PathBuf {
        self.root.join(layout::MANIFEST_FILE)
    }

    /// Subdirectories in creation order; parents precede children.
    fn subdirectories(&self) -> [PathBuf; 4] {
        [
            self.bin_dir(),
            self.app_dir(),
            self.app_python_dir(),
            self.pydeps_dir(),
        ]
    }
}

/// Location of the staging tree for a product and platform under `root`.
pub fn tree_path(root: &Path, product: &str, platform: PlatformKey) -> PathBuf {
    root.join(format!("{product}-runtime-{platform}"))
}

/// Creates a fresh staging tree, destroying any previous one at the same path.
///
/// Idempotent: repeated calls leave the same empty layout behind.
pub async fn prepare(root: &Path, product: &str, platform: PlatformKey) -> Result<StagingTree> {
    let tree = StagingTree {
        root: tree_path(root, product, platform),
    };
    log::info!("Preparing staging tree {}", tree.root().display());

    fs::create_dir_all(tree.root(), true).await?;
    for dir in tree.subdirectories() {
        fs::create_dir_all(&dir, false).await?;
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_x64() -> PlatformKey {
        PlatformKey::from_parts("linux", "x86_64").unwrap()
    }

    #[tokio::test]
    async fn creates_fixed_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = prepare(tmp.path(), "reviewer", linux_x64()).await.unwrap();

        assert_eq!(tree.root(), tmp.path().join("reviewer-runtime-linux-x64"));
        for dir in ["bin", "app", "app/python", "pydeps"] {
            assert!(tree.root().join(dir).is_dir(), "{dir} missing");
        }
    }

    #[tokio::test]
    async fn repeated_prepare_discards_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let first = prepare(tmp.path(), "reviewer", linux_x64()).await.unwrap();
        std::fs::write(first.bin_dir().join("stale"), b"old").unwrap();
        std::fs::write(first.pydeps_dir().join(layout::VERIFICATION_MARKER), b"").unwrap();

        let second = prepare(tmp.path(), "reviewer", linux_x64()).await.unwrap();

        assert_eq!(first, second);
        assert!(!second.bin_dir().join("stale").exists());
        assert!(!second.pydeps_dir().join(layout::VERIFICATION_MARKER).exists());
        let mut top: Vec<_> = std::fs::read_dir(second.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        top.sort();
        assert_eq!(top, ["app", "bin", "pydeps"]);
    }
}
