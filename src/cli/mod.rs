//! Command line interface for the bundle builder.
//!
//! Parses arguments, merges them with `bundle.toml`, runs the build pipeline
//! and prints the archive path and digest.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::bundler::{Bundler, DEFAULT_PRODUCT, PackageSettings, Settings, SettingsBuilder};
use crate::error::{BundlerError, CliError, Result};
use crate::{metadata, source::ProjectSources};
use clap::{Parser, error::ErrorKind};
use path_absolutize::Absolutize;
use std::ffi::OsString;

/// Main CLI entry point; returns the process exit code.
pub async fn run() -> Result<i32> {
    run_from(std::env::args_os()).await
}

/// Runs the CLI against an explicit argument list.
pub async fn run_from<I, T>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            return Err(crate::bundler::Error::MissingVersionArgument { reason: None }.into());
        }
        Err(e) => {
            e.print()?;
            return Ok(e.exit_code());
        }
    };

    init_logging(args.log_filter());
    let output = OutputManager::new(args.quiet);

    let settings = resolve_settings(&args)?;
    let bundler = Bundler::new(settings)?;
    log::info!(
        "Building {} {} for {}",
        bundler.settings().product_name(),
        bundler.settings().version_string(),
        bundler.platform()
    );

    let built = bundler.build().await?;
    output.success(&format!(
        "Bundled {} ({} bytes)",
        built.context.tree.root().display(),
        built.archive.size
    ))?;
    output.result(&format!("Archive: {}", built.archive.path.display()))?;
    output.result(&built.archive.digest_line())?;
    Ok(0)
}

/// Merges command line options over `bundle.toml`.
pub fn resolve_settings(args: &Args) -> Result<Settings> {
    let project_root = args
        .project_root
        .absolutize()
        .map_err(|e| CliError::InvalidArguments {
            reason: format!("--project-root {}: {e}", args.project_root.display()),
        })?
        .into_owned();
    if !project_root.is_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!("project root {} is not a directory", project_root.display()),
        }
        .into());
    }

    let config = metadata::load_config(&project_root.join(&args.config))?;

    let mut runtime = config.runtime;
    if let Some(archive) = &args.runtime_archive {
        runtime.archive = Some(absolute_from_cwd(archive)?);
    }

    let mut app = config.app;
    ProjectSources::discover(&project_root).fill_in(&mut app);

    let mut builder = SettingsBuilder::new()
        .project_root(&project_root)
        .out_directory(&args.out_dir)
        .staging_directory(&args.staging_dir)
        .package_settings(PackageSettings {
            product_name: config.product.unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
            version: args.version.clone(),
        })
        .runtime_settings(runtime)
        .python_settings(config.python)
        .app_settings(app);
    if let Some(launcher) = &args.launcher_binary {
        builder = builder.launcher_binary(absolute_from_cwd(launcher)?);
    }

    Ok(builder.build()?)
}

fn absolute_from_cwd(path: &std::path::Path) -> Result<std::path::PathBuf> {
    Ok(path.absolutize().map_err(BundlerError::Io)?.into_owned())
}

fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // Already initialized when run_from is called more than once in a process.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_version_is_reported_before_any_work() {
        let err = run_from(["runtime-bundler"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(matches!(
            err,
            BundlerError::Bundler(crate::bundler::Error::MissingVersionArgument { .. })
        ));
    }

    #[test]
    fn settings_merge_config_and_flags() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("bundle.toml"),
            "product = \"reviewer\"\n[app]\nentry = \"main.js\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("cli/dist")).unwrap();

        let root = tmp.path().to_string_lossy().into_owned();
        let args = Args::try_parse_from([
            "runtime-bundler",
            "2.0.0",
            "--project-root",
            root.as_str(),
            "--launcher-binary",
            "/opt/launcher",
        ])
        .unwrap();
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.product_name(), "reviewer");
        assert_eq!(settings.version_string(), "2.0.0");
        assert_eq!(settings.app().entry, "main.js");
        assert_eq!(settings.app().cli_dir.as_deref(), Some(tmp.path().join("cli/dist").as_path()));
        assert_eq!(settings.out_directory(), tmp.path().join("dist"));
        assert_eq!(settings.launcher_binary(), std::path::Path::new("/opt/launcher"));
    }

    #[test]
    fn bad_version_is_rejected() {
        let args = Args::try_parse_from(["runtime-bundler", "1.0 beta"]).unwrap();
        let err = resolve_settings(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
