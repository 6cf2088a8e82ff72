//! Launcher generation.
//!
//! Writes the dispatcher script `bin/<product>` and copies the compiled
//! launcher next to it. The script only resolves its own location and hands
//! the baked-in settings plus the user's arguments to the launcher, which
//! runs the verify/repair protocol and then replaces itself with the
//! application.

use super::StagingTree;
use crate::bundler::{Error, PlatformKey, Result, Settings, error::ErrorExt, utils::fs};
use crate::layout;
use handlebars::Handlebars;
use std::path::PathBuf;

/// POSIX sh dispatcher. Symlinks to the script are followed so the bundle
/// can be linked into a directory on `PATH`.
pub const DISPATCHER_TEMPLATE: &str = r#"#!/bin/sh
# {{product}} {{version}} ({{platform}}) dispatcher. Generated by {{generator}}; do not edit.
set -e
self="$0"
while [ -h "$self" ]; do
    link_dir=$(CDPATH= cd -- "$(dirname -- "$self")" && pwd -P)
    link=$(readlink "$self")
    case "$link" in
        /*) self="$link" ;;
        *) self="$link_dir/$link" ;;
    esac
done
bin_dir=$(CDPATH= cd -- "$(dirname -- "$self")" && pwd -P)
exec "$bin_dir/{{launcher}}" \
{{#each launcher_args}}
    {{this}} \
{{/each}}
    -- "$@"
"#;

/// Paths written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLauncher {
    /// Dispatcher script `bin/<product>`
    pub script: PathBuf,
    /// Compiled launcher `bin/.<product>-launcher`
    pub executable: PathBuf,
}

/// Quotes a value for POSIX sh.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '=' | ':' | ','));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r#"'\''"#))
    }
}

/// Launcher flags carrying the build-time configuration.
pub fn launcher_args(settings: &Settings) -> Vec<String> {
    let runtime = settings.runtime();
    let python = settings.python();

    let mut args = vec![
        format!("--product={}", settings.product_name()),
        format!("--runtime={}", runtime.name),
        format!("--entry={}", settings.app().entry),
        format!("--probe-module={}", python.probe_module),
        format!("--cache-env={}", runtime.cache_env),
    ];
    args.extend(python.candidates.iter().map(|c| format!("--interpreter={c}")));
    args.extend(runtime.args.iter().map(|a| format!("--runtime-arg={a}")));
    args.iter().map(|a| shell_quote(a)).collect()
}

/// Renders the dispatcher script.
pub fn render_dispatcher(settings: &Settings, platform: PlatformKey) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("dispatcher", DISPATCHER_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register dispatcher template: {e}")))?;

    let data = serde_json::json!({
        "product": settings.product_name(),
        "version": settings.version_string(),
        "platform": platform.to_string(),
        "generator": concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
        "launcher": layout::launcher_file_name(settings.product_name()),
        "launcher_args": launcher_args(settings),
    });

    Ok(handlebars.render("dispatcher", &data)?)
}

/// Writes the dispatcher script and installs the compiled launcher.
pub async fn generate(
    tree: &StagingTree,
    settings: &Settings,
    platform: PlatformKey,
) -> Result<GeneratedLauncher> {
    let source = settings.launcher_binary();
    if !source.is_file() {
        return Err(Error::GenericError(format!(
            "launcher executable not found at {}; build the `{}` binary or pass --launcher-binary",
            source.display(),
            crate::bundler::LAUNCHER_BINARY_NAME
        )));
    }

    let executable = tree
        .bin_dir()
        .join(layout::launcher_file_name(settings.product_name()));
    fs::copy_file(source, &executable).await?;
    fs::set_executable(&executable).await?;

    let script = tree.bin_dir().join(settings.product_name());
    let body = render_dispatcher(settings, platform)?;
    tokio::fs::write(&script, body)
        .await
        .fs_context("writing dispatcher script", &script)?;
    fs::set_executable(&script).await?;

    log::info!("✓ Generated launcher {}", script.display());
    Ok(GeneratedLauncher { script, executable })
}
