//! Chunked block transfer towards blob storage.
//!
//! A transfer splits an arbitrary-length byte source into fixed-size chunks,
//! stages every chunk as a remote block under bounded parallelism, and
//! finally commits an ordered block list to materialize the object. The
//! destination makes nothing visible until the commit succeeds, so readers
//! never observe a partially assembled object.
//!
//! The moving parts, bottom up:
//!
//! - [`TransferPlan`]: the immutable partition of the source into chunks,
//!   each with a deterministic block identifier
//! - [`ChunkSource`]: where chunk bytes come from ([`MemorySource`],
//!   [`FileSource`])
//! - [`BlockStore`]: where blocks go; [`BlobClient`] is the HTTP
//!   implementation with request signing from `blobport-core`
//! - [`BlockTransferEngine`]: the bounded worker pool and the ordered commit
//! - [`Transfer`]: sequences existence check, planning, staging and commit
//!   into one [`TransferResult`]
//!
//! ## Example
//!
//! ```no_run
//! use blobport_core::Credential;
//! use blobport_transfer::{BlobClient, BlobLocator, MemorySource, Transfer};
//!
//! # async fn example() -> blobport_transfer::Result<()> {
//! let locator = BlobLocator::for_account("account", "backups", "large.bin")?;
//! let credential = Credential::with_shared_key("account", "YWNjb3VudC1rZXk=");
//!
//! let transfer = Transfer::new(BlobClient::new(locator, credential));
//! let result = transfer.run(MemorySource::new(vec![0u8; 1024])).await?;
//! assert!(result.outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::{Error, ErrorKind, Result};

mod locator;
pub use locator::BlobLocator;

mod plan;
pub use plan::{block_id, ChunkDescriptor, TransferPlan};

mod block_list;
pub use block_list::block_list_xml;

mod source;
pub use source::{ChunkSource, FileSource, MemorySource};

mod client;
pub use client::{BlobClient, BlockStore};

mod engine;
pub use engine::{BlockTransferEngine, ChunkFailure, StageReport};

mod orchestrator;
pub use orchestrator::{Transfer, TransferOptions, TransferOutcome, TransferResult};
