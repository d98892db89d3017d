//! Move large objects between blob-storage endpoints.
//!
//! `blobport` re-exports the two building crates behind one front door:
//!
//! - [`blobport_core`]: credentials, shared-key request signing and SAS
//!   token issuing
//! - [`blobport_transfer`]: chunk planning, parallel block staging and the
//!   ordered commit
//!
//! plus [`Config`], the glue that turns a connection string into the
//! explicit values the transfer layer wants. Nothing below this crate reads
//! the environment; see `examples/blob_to_blob.rs` for the wiring an actual
//! program does.

mod config;
pub use config::Config;

pub use blobport_core::{
    Credential, RequestSigner, SasPermissions, ServiceSas, SAS_VERSION, STORAGE_VERSION,
};
pub use blobport_transfer::{
    BlobClient, BlobLocator, BlockStore, BlockTransferEngine, ChunkSource, FileSource,
    MemorySource, Transfer, TransferOptions, TransferOutcome, TransferPlan, TransferResult,
};
