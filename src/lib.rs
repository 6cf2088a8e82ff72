//! Self-contained runtime bundles with a self-healing launcher.
//!
//! The [`bundler`] module stages an embedded scripting runtime, an
//! application and its interpreter dependencies into one relocatable archive.
//! The [`launcher`] module runs inside an extracted bundle: it verifies that
//! the bundled dependencies load on the local interpreter, reinstalls them
//! when they do not, and then hands over to the application.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod interpreter;
pub mod launcher;
pub mod layout;
pub mod metadata;
pub mod source;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
