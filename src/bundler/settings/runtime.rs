//! External scripting runtime settings.

use std::path::PathBuf;
use std::time::Duration;

/// Where and how to obtain the embedded runtime binary.
///
/// The default targets Deno release assets, which are published per target
/// triple as single-binary zip archives.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Executable name inside `bin/`, also substituted for `{name}`.
    pub name: String,

    /// Pinned runtime version, substituted for `{version}`.
    pub version: String,

    /// Download URL with `{name}`, `{version}` and `{target}` placeholders.
    pub url_template: String,

    /// Environment variable naming the runtime's cache directory.
    pub cache_env: String,

    /// Arguments placed between the runtime and the application entrypoint.
    pub args: Vec<String>,

    /// Local archive used instead of downloading.
    pub archive: Option<PathBuf>,

    /// Upper bound for the whole download. `None` waits indefinitely.
    pub download_timeout: Option<Duration>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            name: "deno".into(),
            version: "2.1.4".into(),
            url_template:
                "https://github.com/denoland/deno/releases/download/v{version}/{name}-{target}.zip"
                    .into(),
            cache_env: "DENO_DIR".into(),
            args: vec!["run".into(), "--allow-all".into()],
            archive: None,
            download_timeout: None,
        }
    }
}

impl RuntimeSettings {
    /// Expands the URL template for a runtime target triple.
    pub fn download_url(&self, target: &str) -> String {
        self.url_template
            .replace("{name}", &self.name)
            .replace("{version}", &self.version)
            .replace("{target}", target)
    }
}
