//! Build stages, in pipeline order.
//!
//! Each stage is a free async function over the [`StagingTree`]; the
//! orchestrator sequences them and short-circuits on the first error.

pub mod app;
pub mod archive;
pub mod deps;
pub mod launcher;
pub mod manifest;
pub mod runtime;
pub mod staging;

pub use staging::StagingTree;

use crate::bundler::PlatformKey;

/// Immutable facts shared by every stage after staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Release version
    pub version: String,
    /// Platform the bundle targets
    pub platform: PlatformKey,
    /// Staging tree being populated
    pub tree: StagingTree,
}

impl BuildContext {
    /// Bundles the build identity with its staging tree.
    pub fn new(version: &str, platform: PlatformKey, tree: StagingTree) -> Self {
        Self {
            version: version.to_string(),
            platform,
            tree,
        }
    }
}
