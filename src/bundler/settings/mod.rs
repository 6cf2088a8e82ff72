//! Configuration structures for bundling operations.
//!
//! This module provides the settings consumed by the build pipeline: release
//! identity, platform key, runtime download, interpreter dependencies and the
//! application payload, plus a builder that resolves paths.

mod builder;
mod bundle;
mod core;
mod package;
mod platform;
mod requirements;
mod runtime;

// Re-export all public types
pub use builder::{LAUNCHER_BINARY_NAME, SettingsBuilder, validate_version};
pub use bundle::{AppSettings, PythonSettings};
pub use core::Settings;
pub use package::PackageSettings;
pub use platform::{Arch, Os, PlatformKey, SUPPORTED_PLATFORMS};
pub use requirements::{Requirement, RequirementsSpec};
pub use runtime::RuntimeSettings;

/// Product name used when the configuration does not set one.
pub const DEFAULT_PRODUCT: &str = "app";

/// Interpreter executables probed when the configuration does not list any.
pub const DEFAULT_INTERPRETERS: [&str; 2] = ["python3", "python"];
