//! Relative layout of an extracted bundle.
//!
//! The builder writes these paths and the launcher reads them, possibly many
//! releases later, so none of them may change between versions.

/// Executables: runtime binary, dispatcher script, launcher.
pub const BIN_DIR: &str = "bin";

/// Application code.
pub const APP_DIR: &str = "app";

/// Interpreter-side sources, nested under [`APP_DIR`].
pub const APP_PYTHON_DIR: &str = "python";

/// Bundled interpreter dependencies.
pub const PYDEPS_DIR: &str = "pydeps";

/// Fallback dependency description read by the repair path.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Build metadata.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Sentinel inside [`PYDEPS_DIR`]; its existence means "verified on this machine".
pub const VERIFICATION_MARKER: &str = ".verified";

/// Lock file inside [`PYDEPS_DIR`] serializing concurrent repairs.
pub const REPAIR_LOCK: &str = ".verify.lock";

/// File name of the compiled launcher inside [`BIN_DIR`].
pub fn launcher_file_name(product: &str) -> String {
    format!(".{product}-launcher{}", std::env::consts::EXE_SUFFIX)
}
