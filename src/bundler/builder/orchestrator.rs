//! Main bundler orchestration.
//!
//! This module provides the [`Bundler`] that runs the build stages in order.
//! Stages share an immutable [`BuildContext`]; the first failure aborts the
//! pipeline and is reported with the label of the stage that produced it.

use crate::bundler::{
    Error, PlatformKey, Result, Settings,
    stages::{
        BuildContext, app, archive, archive::Archive, deps, launcher,
        launcher::GeneratedLauncher, manifest, manifest::Manifest, runtime,
        runtime::RuntimeBinary, staging,
    },
};
use std::fmt;
use std::future::Future;

/// Ordered pipeline stages, used for progress and failure labels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Staging Director
    Staging,
    /// Dependency Bundler
    Dependencies,
    /// Runtime Fetcher
    Runtime,
    /// App Assembler
    Application,
    /// Manifest Writer
    Manifest,
    /// Launcher Generator
    Launcher,
    /// Archiver
    Archive,
}

impl Stage {
    /// Number of stages in a build.
    pub const COUNT: usize = 7;

    /// Short label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Staging => "staging",
            Stage::Dependencies => "dependency bundling",
            Stage::Runtime => "runtime fetch",
            Stage::Application => "application assembly",
            Stage::Manifest => "manifest",
            Stage::Launcher => "launcher generation",
            Stage::Archive => "archive",
        }
    }

    fn position(self) -> usize {
        self as usize + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Version, platform and staging tree of the build
    pub context: BuildContext,
    /// Installed runtime binary
    pub runtime: RuntimeBinary,
    /// Dispatcher script and launcher
    pub launcher: GeneratedLauncher,
    /// Final archive and digest
    pub archive: Archive,
}

/// Main bundler orchestrator.
///
/// # Examples
///
/// ```no_run
/// use runtime_bundler::bundler::{Bundler, PackageSettings, SettingsBuilder};
///
/// # async fn example() -> runtime_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .package_settings(PackageSettings {
///         product_name: "reviewer".into(),
///         version: "1.2.3".into(),
///     })
///     .build()?;
///
/// let output = Bundler::new(settings)?.build().await?;
/// println!("{}", output.archive.digest_line());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
    platform: PlatformKey,
}

impl Bundler {
    /// Creates a bundler for the host platform.
    ///
    /// Resolves the platform key before anything touches the filesystem, so
    /// an unsupported host fails with no side effects. A build without an
    /// application directory is rejected here too, before any download.
    pub fn new(settings: Settings) -> Result<Self> {
        let platform = PlatformKey::detect()?;
        log::debug!("Resolved platform {}", platform);
        if settings.app().cli_dir.is_none() {
            return Err(Error::MissingApplication {
                entry: settings.app().entry.clone(),
            });
        }
        Ok(Self { settings, platform })
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Platform the bundle is built for.
    pub fn platform(&self) -> PlatformKey {
        self.platform
    }

    /// Runs every stage in order and returns the produced archive.
    pub async fn build(&self) -> Result<BuildOutput> {
        let settings = &self.settings;
        let python = settings.python();

        let tree = run_stage(
            Stage::Staging,
            staging::prepare(
                settings.staging_directory(),
                settings.product_name(),
                self.platform,
            ),
        )
        .await?;
        let context = BuildContext::new(settings.version_string(), self.platform, tree);

        run_stage(
            Stage::Dependencies,
            deps::bundle(&context.tree, &python.requirements, &python.candidates),
        )
        .await?;

        let runtime = run_stage(
            Stage::Runtime,
            runtime::fetch(&context.tree, context.platform, settings.runtime()),
        )
        .await?;

        run_stage(
            Stage::Application,
            app::assemble(&context.tree, settings.app()),
        )
        .await?;

        let manifest = Manifest::new(&context.version, context.platform, chrono::Utc::now());
        run_stage(Stage::Manifest, manifest::write(&context.tree, &manifest)).await?;

        let launcher = run_stage(
            Stage::Launcher,
            launcher::generate(&context.tree, settings, context.platform),
        )
        .await?;

        let archive = run_stage(
            Stage::Archive,
            archive::pack(
                &context.tree,
                settings.out_directory(),
                &settings.archive_name(context.platform),
            ),
        )
        .await?;

        Ok(BuildOutput {
            context,
            runtime,
            launcher,
            archive,
        })
    }
}

async fn run_stage<T, F>(stage: Stage, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    log::info!("[{}/{}] {}", stage.position(), Stage::COUNT, stage);
    work.await.map_err(|source| Error::StageFailed {
        stage: stage.label(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_numbered_in_pipeline_order() {
        assert_eq!(Stage::Staging.position(), 1);
        assert_eq!(Stage::Archive.position(), Stage::COUNT);
    }

    #[test]
    fn missing_application_fails_before_any_stage() {
        if PlatformKey::detect().is_err() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let settings = crate::bundler::SettingsBuilder::new()
            .project_root(tmp.path())
            .launcher_binary("/opt/runtime-launcher")
            .package_settings(crate::bundler::PackageSettings {
                product_name: "reviewer".into(),
                version: "1.2.3".into(),
            })
            .build()
            .unwrap();

        let err = Bundler::new(settings).err().unwrap();
        assert!(matches!(err, Error::MissingApplication { .. }));
        assert!(!tmp.path().join("build").exists());
    }

    #[tokio::test]
    async fn failing_stage_is_labeled() {
        let err = run_stage(Stage::Runtime, async {
            Err::<(), _>(Error::GenericError("boom".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "runtime fetch failed: boom");
    }
}
