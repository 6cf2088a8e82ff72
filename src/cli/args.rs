//! Command line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Builds a self-contained runtime bundle for the host platform
#[derive(Parser, Debug)]
#[command(
    name = "runtime-bundler",
    version,
    about = "Builds a self-contained runtime bundle for the host platform",
    long_about = "Stages the embedded runtime, the application and its interpreter dependencies,
generates a self-healing launcher and packs everything into one archive.

Usage:
  runtime-bundler 1.2.3
  runtime-bundler 1.2.3 --runtime-archive vendor/deno.zip --out-dir release

Output: <out-dir>/<product>-runtime-v<VERSION>-<os>-<arch>.tar.gz, followed by
its SHA-256 on stdout."
)]
pub struct Args {
    /// Release version embedded in the manifest and archive name
    #[arg(id = "release", value_name = "VERSION")]
    pub version: String,

    /// Project configuration file, relative to the project root
    #[arg(short = 'c', long, env = "RUNTIME_BUNDLER_CONFIG", default_value = crate::metadata::CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Base directory for relative paths
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_root: PathBuf,

    /// Directory receiving the archive
    #[arg(long, value_name = "DIR", default_value = "dist")]
    pub out_dir: PathBuf,

    /// Parent of the staging tree
    #[arg(long, value_name = "DIR", default_value = "build")]
    pub staging_dir: PathBuf,

    /// Local runtime zip used instead of downloading
    #[arg(long, value_name = "ZIP", env = "RUNTIME_BUNDLER_RUNTIME_ARCHIVE")]
    pub runtime_archive: Option<PathBuf>,

    /// Compiled launcher copied into the bundle
    #[arg(long, value_name = "PATH", env = "RUNTIME_BUNDLER_LAUNCHER")]
    pub launcher_binary: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and the result
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default `env_logger` filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
