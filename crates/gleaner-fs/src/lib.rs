//! File-backed change feeds for gleaner.
//!
//! Implements [`gleaner_core::ChangeSource`] over NDJSON files, one per
//! entity kind, one change record per line. Meant for local development,
//! fixtures and integration tests; production deployments implement the
//! source contract against their real search index and relational store.

pub mod error;
pub mod feed;

pub use error::{FsError, Result};
pub use feed::FileFeed;
