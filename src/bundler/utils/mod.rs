//! Shared helpers for the build stages.

pub mod fs;
pub mod http;
pub mod scratch;
