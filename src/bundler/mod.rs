//! Bundle construction.
//!
//! Builds a relocatable archive holding the embedded runtime, the
//! application, its interpreter dependencies and the launcher:
//!
//! ```text
//! bin/<runtime>  bin/<product>  bin/.<product>-launcher
//! app/  app/python/
//! pydeps/
//! manifest.json  requirements.txt
//! ```

pub mod builder;
pub mod error;
pub mod settings;
pub mod stages;
pub mod utils;

pub use builder::{BuildOutput, Bundler, Stage, calculate_sha256};
pub use error::{Error, Result};
pub use settings::{
    AppSettings, Arch, DEFAULT_INTERPRETERS, DEFAULT_PRODUCT, LAUNCHER_BINARY_NAME, Os,
    PackageSettings, PlatformKey, PythonSettings, Requirement, RequirementsSpec,
    RuntimeSettings, SUPPORTED_PLATFORMS, Settings, SettingsBuilder, validate_version,
};
