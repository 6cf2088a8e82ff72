//! Embedded runtime download and installation.
//!
//! The runtime is published per target triple as a zip holding a single
//! executable. Downloads land in a [`ScratchDir`] that is removed on every
//! exit path; only the extracted binary is moved into the staging tree.

use super::StagingTree;
use crate::bundler::{
    Error, PlatformKey, Result, RuntimeSettings,
    error::ErrorExt,
    utils::{fs, http, scratch::ScratchDir},
};
use std::path::{Path, PathBuf};

/// The fetched external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeBinary {
    /// Executable name inside `bin/`
    pub name: String,
    /// Pinned runtime version
    pub version: String,
    /// Installed location
    pub path: PathBuf,
}

/// Fetches the runtime for `platform` and installs it as `bin/<name>`.
pub async fn fetch(
    tree: &StagingTree,
    platform: PlatformKey,
    settings: &RuntimeSettings,
) -> Result<RuntimeBinary> {
    let target = platform.runtime_target();
    let url = settings.download_url(target);
    if settings.archive.is_none() {
        url::Url::parse(&url).map_err(|e| Error::DownloadFailure {
            url: url.clone(),
            reason: format!("invalid URL: {e}"),
        })?;
    }

    let scratch = ScratchDir::new("runtime-fetch-")?;
    let archive_path = scratch.path().join(format!("{}-{}.zip", settings.name, target));

    match &settings.archive {
        Some(local) => {
            log::info!("Using local runtime archive {}", local.display());
            fs::copy_file(local, &archive_path).await?;
        }
        None => {
            http::download_to_file(&url, &archive_path, settings.download_timeout).await?;
        }
    }

    let unpack_dir = scratch.path().join("unpacked");
    let extracted = unpack_single_binary(&archive_path, &unpack_dir).await?;

    let dest = tree
        .bin_dir()
        .join(format!("{}{}", settings.name, std::env::consts::EXE_SUFFIX));
    fs::move_file(&extracted, &dest).await?;
    fs::set_executable(&dest).await?;

    log::info!("✓ Installed {} {} for {}", settings.name, settings.version, platform);

    Ok(RuntimeBinary {
        name: settings.name.clone(),
        version: settings.version.clone(),
        path: dest,
    })
}

/// Extracts `archive` into `dest_dir` and returns the path of its only file.
///
/// Directory entries are ignored; zero or several regular files are rejected
/// with [`Error::RuntimeArchiveShape`].
pub async fn unpack_single_binary(archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive).fs_context("opening runtime archive", &archive)?;
        let mut zip = zip::ZipArchive::new(file)?;

        let files: Vec<usize> = (0..zip.len())
            .filter_map(|i| match zip.by_index(i) {
                Ok(entry) if entry.is_file() => Some(Ok(i)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<std::result::Result<_, _>>()?;

        let index = match files.as_slice() {
            [only] => *only,
            [] => {
                return Err(Error::RuntimeArchiveShape(format!(
                    "{} contains no files",
                    archive.display()
                )));
            }
            many => {
                return Err(Error::RuntimeArchiveShape(format!(
                    "{} contains {} files, expected a single executable",
                    archive.display(),
                    many.len()
                )));
            }
        };

        let mut entry = zip.by_index(index)?;
        let file_name = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_owned()))
            .ok_or_else(|| {
                Error::RuntimeArchiveShape(format!("unsafe entry name {:?}", entry.name()))
            })?;

        std::fs::create_dir_all(&dest_dir).fs_context("creating directory", &dest_dir)?;
        let out_path = dest_dir.join(file_name);
        let mut out = std::fs::File::create(&out_path).fs_context("extracting", &out_path)?;
        std::io::copy(&mut entry, &mut out).fs_context("extracting", &out_path)?;

        log::debug!("Extracted {}", out_path.display());
        Ok(out_path)
    })
    .await
    .map_err(|e| Error::GenericError(format!("runtime extraction task panicked: {e}")))?
}
