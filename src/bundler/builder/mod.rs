//! Bundle orchestration and coordination.
//!
//! - [`checksum`] - SHA-256 digest of the final archive
//! - [`orchestrator`] - [`Bundler`] and the ordered stage pipeline

mod checksum;
mod orchestrator;

pub use checksum::calculate_sha256;
pub use orchestrator::{BuildOutput, Bundler, Stage};
