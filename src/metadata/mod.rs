//! Project configuration from `bundle.toml`.
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! does not parse, or holds a value of the wrong type, is fatal.

use crate::bundler::{
    AppSettings, Error, PythonSettings, RequirementsSpec, Result, RuntimeSettings,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, relative to the project root.
pub const CONFIG_FILE_NAME: &str = "bundle.toml";

/// Settings read from the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Product name, `None` when unset
    pub product: Option<String>,
    /// `[runtime]` section
    pub runtime: RuntimeSettings,
    /// `[python]` section
    pub python: PythonSettings,
    /// `[app]` section
    pub app: AppSettings,
}

/// Loads `path`, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("No configuration at {}; using defaults", path.display());
            return Ok(ProjectConfig::default());
        }
        Err(e) => {
            return Err(Error::Fs {
                context: "reading configuration".into(),
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    parse_config(&contents, path)
}

/// Parses configuration text; `path` only labels errors.
pub fn parse_config(contents: &str, path: &Path) -> Result<ProjectConfig> {
    let toml_value: toml::Value = toml::from_str(contents).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let fields = Fields { path };

    let mut config = ProjectConfig {
        product: fields.string(&toml_value, "product")?,
        ..ProjectConfig::default()
    };

    if let Some(runtime) = fields.section(&toml_value, "runtime")? {
        let settings = &mut config.runtime;
        if let Some(v) = fields.string(runtime, "name")? {
            settings.name = v;
        }
        if let Some(v) = fields.string(runtime, "version")? {
            settings.version = v;
        }
        if let Some(v) = fields.string(runtime, "url_template")? {
            settings.url_template = v;
        }
        if let Some(v) = fields.string(runtime, "cache_env")? {
            settings.cache_env = v;
        }
        if let Some(v) = fields.strings(runtime, "args")? {
            settings.args = v;
        }
        settings.archive = fields.string(runtime, "archive")?.map(PathBuf::from);
        if let Some(secs) = fields.integer(runtime, "download_timeout_secs")? {
            let secs = u64::try_from(secs)
                .map_err(|_| fields.invalid("download_timeout_secs", "must not be negative"))?;
            settings.download_timeout = Some(Duration::from_secs(secs));
        }
    }

    if let Some(python) = fields.section(&toml_value, "python")? {
        let settings = &mut config.python;
        if let Some(lines) = fields.strings(python, "requirements")? {
            settings.requirements = RequirementsSpec::parse_all(&lines)
                .map_err(|e| fields.invalid("requirements", &e.to_string()))?;
        }
        if let Some(v) = fields.string(python, "probe_module")? {
            settings.probe_module = v;
        }
        if let Some(v) = fields.strings(python, "candidates")? {
            settings.candidates = v;
        }
    }

    if let Some(app) = fields.section(&toml_value, "app")? {
        let settings = &mut config.app;
        if let Some(v) = fields.string(app, "entry")? {
            settings.entry = v;
        }
        settings.cli_dir = fields.string(app, "cli_dir")?.map(PathBuf::from);
        settings.python_dir = fields.string(app, "python_dir")?.map(PathBuf::from);
    }

    Ok(config)
}

/// Typed lookups that report the offending key.
struct Fields<'a> {
    path: &'a Path,
}

impl Fields<'_> {
    fn invalid(&self, key: &str, reason: &str) -> Error {
        Error::Config {
            path: self.path.to_path_buf(),
            reason: format!("`{key}` {reason}"),
        }
    }

    fn section<'v>(&self, value: &'v toml::Value, key: &str) -> Result<Option<&'v toml::Value>> {
        match value.get(key) {
            None => Ok(None),
            Some(v) if v.is_table() => Ok(Some(v)),
            Some(_) => Err(self.invalid(key, "must be a table")),
        }
    }

    fn string(&self, value: &toml::Value, key: &str) -> Result<Option<String>> {
        match value.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.invalid(key, "must be a string")),
        }
    }

    fn strings(&self, value: &toml::Value, key: &str) -> Result<Option<Vec<String>>> {
        let Some(v) = value.get(key) else {
            return Ok(None);
        };
        let array = v
            .as_array()
            .ok_or_else(|| self.invalid(key, "must be an array of strings"))?;
        array
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| self.invalid(key, "must be an array of strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn integer(&self, value: &toml::Value, key: &str) -> Result<Option<i64>> {
        match value.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_integer()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "must be an integer")),
        }
    }
}
