//! Runtime launcher - shipped inside every bundle as `bin/.<product>-launcher`.
//!
//! Invoked by the generated dispatcher script with the build-time settings as
//! flags and the user's arguments after `--`.

use clap::Parser;
use runtime_bundler::bundler::DEFAULT_INTERPRETERS;
use runtime_bundler::launcher::{
    self, BundleLayout, Dispatch, LauncherSettings, SystemToolchain,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

/// Environment variable holding the launcher's log filter.
const LOG_ENV: &str = "RUNTIME_LAUNCHER_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "runtime-launcher",
    version,
    about = "Verifies a runtime bundle and runs its application"
)]
struct LauncherArgs {
    /// Product name
    #[arg(long)]
    product: String,

    /// Runtime executable inside bin/
    #[arg(long, default_value = "deno")]
    runtime: String,

    /// Entrypoint relative to app/
    #[arg(long, default_value = "cli.js")]
    entry: String,

    /// Compiled module imported to detect an interpreter mismatch
    #[arg(long, default_value = "pydantic_core")]
    probe_module: String,

    /// Variable naming the runtime's cache directory
    #[arg(long, default_value = "DENO_DIR")]
    cache_env: String,

    /// Interpreter candidate, in order (repeatable)
    #[arg(long = "interpreter", value_name = "NAME")]
    interpreters: Vec<String>,

    /// Argument placed before the entrypoint (repeatable)
    #[arg(long = "runtime-arg", value_name = "ARG", allow_hyphen_values = true)]
    runtime_args: Vec<String>,

    /// Run the application as a child instead of replacing this process
    #[arg(long, hide = true)]
    forward: bool,

    /// Bundle root, instead of deriving it from this executable
    #[arg(long, hide = true, value_name = "DIR")]
    bundle_root: Option<PathBuf>,

    /// Arguments for the application
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<OsString>,
}

impl LauncherArgs {
    fn settings(&self) -> LauncherSettings {
        let candidates = if self.interpreters.is_empty() {
            DEFAULT_INTERPRETERS.iter().map(|s| s.to_string()).collect()
        } else {
            self.interpreters.clone()
        };
        LauncherSettings {
            product: self.product.clone(),
            runtime: self.runtime.clone(),
            entry: self.entry.clone(),
            probe_module: self.probe_module.clone(),
            cache_env: self.cache_env.clone(),
            candidates,
            runtime_args: self.runtime_args.clone(),
        }
    }

    fn dispatch(&self) -> Dispatch {
        if self.forward {
            Dispatch::Forward
        } else {
            Dispatch::platform_default()
        }
    }
}

fn run(args: &LauncherArgs) -> launcher::Result<i32> {
    let layout = match &args.bundle_root {
        Some(root) => BundleLayout::from_root(root),
        None => BundleLayout::from_launcher_exe(&std::env::current_exe()?)?,
    };
    log::debug!("Bundle root: {}", layout.root().display());

    launcher::launch(
        &layout,
        &args.settings(),
        &SystemToolchain,
        args.dispatch(),
        &args.args,
    )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = LauncherArgs::parse();
    let exit_code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("  {}", e.remediation());
            1
        }
    };

    process::exit(exit_code);
}
