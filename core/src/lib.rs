//! Core components for authenticated blob-storage requests.
//!
//! This crate carries the signing subsystem shared by the transfer engine:
//!
//! - **Credential**: the shared-key or SAS secret attached to one transfer
//! - **RequestSigner**: shared-key request signing over a canonical
//!   string-to-sign
//! - **ServiceSas**: issuing time-bounded, permission-scoped container tokens
//! - **SigningRequest**: the canonical rendering of request metadata that both
//!   signing paths build on
//!
//! Signing never touches the network. A request is modelled as
//! [`http::request::Parts`], signed in place, and handed back to whatever
//! transport the caller uses.
//!
//! ## Example
//!
//! ```no_run
//! use blobport_core::{Credential, RequestSigner};
//!
//! # fn main() -> blobport_core::Result<()> {
//! let cred = Credential::with_shared_key("account", "YWNjb3VudC1rZXk=");
//! let signer = RequestSigner::new();
//!
//! let req = http::Request::put("https://account.blob.core.windows.net/data/report.bin")
//!     .body(())
//!     .unwrap();
//! let (mut parts, _) = req.into_parts();
//!
//! signer.sign(&mut parts, &cred)?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod constants;
pub use constants::{SAS_VERSION, STORAGE_VERSION, X_MS_BLOB_TYPE, X_MS_DATE, X_MS_VERSION};

mod error;
pub use error::{Error, ErrorKind, Result};

mod credential;
pub use credential::Credential;

mod request;
pub use request::SigningRequest;

mod sign_request;
pub use sign_request::RequestSigner;

mod sas;
pub use sas::{SasPermissions, ServiceSas};

mod utils;
pub use utils::Redact;
