//! Resource handling for the ACS report engine.
//!
//! - [`ResourceScope`]: owns transient generation resources and releases them
//!   newest-first when a document finishes (successfully or not)
//! - [`FilesystemAssetProvider`]: loads static assets (the logo) from disk
//!
//! The in-memory provider lives in `acs-report-traits` and is re-exported here.

mod filesystem;
mod scope;

pub use filesystem::FilesystemAssetProvider;
pub use scope::{
    CleanupFailure, CleanupReport, ReleaseError, ResourceCleanupError, ResourceKind, ResourceScope,
};

pub use acs_report_traits::InMemoryAssetProvider;
