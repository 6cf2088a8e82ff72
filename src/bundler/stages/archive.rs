//! Archive packing.

use super::StagingTree;
use crate::bundler::{
    Error, Result,
    error::ErrorExt,
    utils::{fs, scratch::CleanupGuard},
};
use flate2::{Compression, write::GzEncoder};
use std::path::{Path, PathBuf};

/// Final distributable with its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Location under the output directory
    pub path: PathBuf,
    /// Hex-encoded SHA-256 of the archive file
    pub sha256: String,
    /// Size in bytes
    pub size: u64,
}

impl Archive {
    /// `sha256sum`-style line naming the archive file.
    pub fn digest_line(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        format!("{}  {}", self.sha256, name)
    }
}

/// Packs the tree's contents into `<out_dir>/<file_name>` as a gzip'd tarball.
///
/// The archive is written to a hidden `.partial` file first and renamed into
/// place only when complete, so a failed or interrupted build never leaves a
/// truncated artifact under `out_dir`.
pub async fn pack(tree: &StagingTree, out_dir: &Path, file_name: &str) -> Result<Archive> {
    fs::create_dir_all(out_dir, false).await?;

    let final_path = out_dir.join(file_name);
    let partial = CleanupGuard::new(out_dir.join(format!(".{file_name}.partial")));
    log::info!("Packing {}", final_path.display());

    let root = tree.root().to_path_buf();
    let partial_path = partial.path().to_path_buf();
    tokio::task::spawn_blocking(move || write_tarball(&root, &partial_path))
        .await
        .map_err(|e| Error::GenericError(format!("archive task panicked: {e}")))??;

    tokio::fs::rename(partial.path(), &final_path)
        .await
        .fs_context("moving archive into place at", &final_path)?;
    partial.disarm();

    let sha256 = crate::bundler::calculate_sha256(&final_path).await?;
    let size = tokio::fs::metadata(&final_path)
        .await
        .fs_context("reading archive metadata", &final_path)?
        .len();

    log::info!("✓ Created {} ({} bytes)", final_path.display(), size);
    Ok(Archive {
        path: final_path,
        sha256,
        size,
    })
}

/// Writes every entry below `root` (not `root` itself) in sorted order.
fn write_tarball(root: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::create(dest).fs_context("creating archive", dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel = entry.path().strip_prefix(root)?;
        builder
            .append_path_with_name(entry.path(), rel)
            .fs_context("adding to archive", entry.path())?;
    }

    let encoder = builder.into_inner().fs_context("finishing archive", dest)?;
    let file = encoder.finish().fs_context("compressing archive", dest)?;
    file.sync_all().fs_context("syncing archive", dest)?;
    Ok(())
}
