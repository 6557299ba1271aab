//! Prune stale artifacts from GitHub: untagged GHCR container images and old
//! GitHub Actions workflow runs.

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod prune;
pub mod registry;
pub mod retention;
pub mod types;

pub use error::{PruneError, Result};
