//! Image Retag Core - streaming layer rename for `docker save` bundles.
//!
//! Renames one layer directory of an image tarball from an old identifier
//! to a new one and patches the layer's `json` metadata record, in a single
//! pass over the archive.

pub mod compression;
pub mod config;
pub mod error;
pub mod id;
pub mod metadata;
pub mod rename;
pub mod stream;

// Re-export commonly used types
pub use compression::{detect_compression, open_input, Compression, InputStream};
pub use config::{MetadataOverrides, RetagConfig};
pub use error::{Result, RetagError};
pub use id::ImageId;
pub use metadata::{is_metadata_member, patch_metadata, MetadataPatch};
pub use rename::{rename_path, MemberPath};
pub use stream::{retag_archive, MetadataOutcome, RetagSummary};

/// Image retag version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
