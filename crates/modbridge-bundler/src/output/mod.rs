//! Output artifacts written next to the rewritten bundle.

pub mod metadata;

pub use metadata::{BundleMetadata, PackMetadata, write_metadata};
