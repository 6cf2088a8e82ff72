//! Build metadata written as `manifest.json`.

use super::StagingTree;
use crate::bundler::{PlatformKey, Result, error::ErrorExt};
use chrono::{DateTime, SecondsFormat, Utc};

/// Informational build metadata; no component reads it back.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Manifest {
    /// Release version
    pub version: String,
    /// Platform key, e.g. `linux-x64`
    pub platform: PlatformKey,
    /// UTC build time, ISO-8601 with a `Z` suffix
    pub built_at: String,
}

impl Manifest {
    /// Pure constructor; the caller supplies the clock.
    pub fn new(version: &str, platform: PlatformKey, now: DateTime<Utc>) -> Self {
        Self {
            version: version.to_string(),
            platform,
            built_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Writes `manifest.json` at the tree root.
pub async fn write(tree: &StagingTree, manifest: &Manifest) -> Result<()> {
    let path = tree.manifest_file();
    let mut body = serde_json::to_string_pretty(manifest)?;
    body.push('\n');
    tokio::fs::write(&path, body)
        .await
        .fs_context("writing manifest", &path)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_expected_fields() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 5).unwrap();
        let key = PlatformKey::from_parts("darwin", "arm64").unwrap();
        let manifest = Manifest::new("1.2.3", key, now);

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["version"], "1.2.3");
        assert_eq!(value["platform"], "darwin-arm64");
        assert_eq!(value["built_at"], "2026-10-19T08:30:05Z");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
