use percent_encoding::percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::Error;
use crate::Result;

/// Characters written verbatim in a blob path. `/` stays so nested blob
/// names keep their segments.
const PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Identifies one remote object. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocator {
    endpoint: String,
    account: String,
    container: String,
    blob: String,
}

impl BlobLocator {
    /// Create a locator from its four parts.
    ///
    /// Every part must be non-empty; a trailing `/` on the endpoint is
    /// dropped so URL rendering stays uniform.
    pub fn new(endpoint: &str, account: &str, container: &str, blob: &str) -> Result<Self> {
        for (field, value) in [
            ("endpoint", endpoint),
            ("account", account),
            ("container", container),
            ("blob", blob),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!("blob locator {field} is empty")));
            }
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            account: account.to_string(),
            container: container.to_string(),
            blob: blob.to_string(),
        })
    }

    /// Create a locator with the default public endpoint for an account.
    pub fn for_account(account: &str, container: &str, blob: &str) -> Result<Self> {
        if account.is_empty() {
            return Err(Error::config("blob locator account is empty"));
        }

        Self::new(
            &format!("https://{account}.blob.core.windows.net"),
            account,
            container,
            blob,
        )
    }

    /// The service endpoint, without trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The storage account name.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The blob name.
    pub fn blob(&self) -> &str {
        &self.blob
    }

    /// The full URL of the blob, path percent-encoded.
    pub fn blob_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.container,
            percent_encode(self.blob.as_bytes(), &PATH_ENCODE_SET)
        )
    }
}
