use async_trait::async_trait;
use blobport_core::Credential;
use blobport_core::RequestSigner;
use blobport_core::STORAGE_VERSION;
use blobport_core::X_MS_BLOB_TYPE;
use blobport_core::X_MS_VERSION;
use bytes::Bytes;
use http::header;
use http::StatusCode;
use log::debug;
use serde::Deserialize;

use crate::block_list::block_list_xml;
use crate::BlobLocator;
use crate::Error;
use crate::Result;

/// The destination side of a transfer.
///
/// This is the seam between the engine and the wire: the engine only ever
/// probes for existence, stages blocks and commits an ordered block list.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Whether the destination object already exists.
    async fn exists(&self) -> Result<bool>;

    /// Stage one block of bytes under the given identifier.
    async fn put_block(&self, block_id: &str, data: Bytes) -> Result<()>;

    /// Commit the given identifiers, in the order given, into the final
    /// object.
    async fn put_block_list(&self, block_ids: &[String]) -> Result<()>;
}

/// HTTP client for one remote blob.
///
/// Each request is signed with the attached credential before dispatch:
/// shared keys become an `Authorization` header, SAS tokens are appended to
/// the query string.
#[derive(Debug)]
pub struct BlobClient {
    locator: BlobLocator,
    credential: Credential,
    signer: RequestSigner,
    client: reqwest::Client,
}

impl BlobClient {
    /// Create a client for the blob the locator points at.
    pub fn new(locator: BlobLocator, credential: Credential) -> Self {
        Self {
            locator,
            credential,
            signer: RequestSigner::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a custom transport client instead of the default one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The locator this client addresses.
    pub fn locator(&self) -> &BlobLocator {
        &self.locator
    }

    /// Download the blob's content into memory.
    ///
    /// This is the source side of a blob-to-blob transfer; the result is
    /// usually handed to a `MemorySource`.
    pub async fn get(&self) -> Result<Bytes> {
        let req = http::Request::get(self.locator.blob_url())
            .header(X_MS_VERSION, STORAGE_VERSION)
            .body(reqwest::Body::default())?;

        let resp = check(self.send(req).await?, "download blob").await?;
        resp.bytes()
            .await
            .map_err(|e| Error::unexpected("failed to read download body").with_source(e))
    }

    async fn send(&self, req: http::Request<reqwest::Body>) -> Result<reqwest::Response> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, &self.credential)?;

        let req = http::Request::from_parts(parts, body)
            .try_into()
            .map_err(|e: reqwest::Error| {
                Error::unexpected("failed to convert signed request").with_source(e)
            })?;

        self.client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("request dispatch failed").with_source(e))
    }
}

#[async_trait]
impl BlockStore for BlobClient {
    async fn exists(&self) -> Result<bool> {
        let req = http::Request::head(self.locator.blob_url())
            .header(X_MS_VERSION, STORAGE_VERSION)
            .body(reqwest::Body::default())?;

        let resp = self.send(req).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check(resp, "probe destination blob").await.map(|_| true)
    }

    async fn put_block(&self, block_id: &str, data: Bytes) -> Result<()> {
        let len = data.len();
        let url = format!("{}?comp=block&blockid={block_id}", self.locator.blob_url());
        let req = http::Request::put(url)
            .header(header::CONTENT_LENGTH, len)
            .header(X_MS_BLOB_TYPE, "BlockBlob")
            .header(X_MS_VERSION, STORAGE_VERSION)
            .body(reqwest::Body::from(data))?;

        check(self.send(req).await?, "stage block").await?;
        debug!("staged block {block_id} ({len} bytes)");

        Ok(())
    }

    async fn put_block_list(&self, block_ids: &[String]) -> Result<()> {
        let body = block_list_xml(block_ids);
        let url = format!("{}?comp=blocklist", self.locator.blob_url());
        let req = http::Request::put(url)
            .header(header::CONTENT_LENGTH, body.len())
            .header(header::CONTENT_TYPE, "application/xml")
            .header(X_MS_VERSION, STORAGE_VERSION)
            .body(reqwest::Body::from(body))?;

        check(self.send(req).await?, "commit block list").await?;
        debug!("committed block list of {} blocks", block_ids.len());

        Ok(())
    }
}

/// Error document the service returns on non-success responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageError {
    code: String,
    message: String,
}

/// Pass a successful response through, turn anything else into an error.
async fn check(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(interpret_failure(status, &body, context))
}

fn interpret_failure(status: StatusCode, body: &str, context: &str) -> Error {
    let storage_error = quick_xml::de::from_str::<StorageError>(body).ok();

    let detail = match &storage_error {
        Some(e) => format!(
            "{} ({})",
            e.code,
            e.message.lines().next().unwrap_or_default()
        ),
        None => status.to_string(),
    };

    let rejected = status == StatusCode::FORBIDDEN
        || status == StatusCode::UNAUTHORIZED
        || storage_error
            .as_ref()
            .is_some_and(|e| e.code == "AuthenticationFailed");
    if rejected {
        return Error::authentication(format!("{context}: {detail}"));
    }

    Error::unexpected(format!("{context}: {detail}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorKind;

    const AUTH_FAILED_BODY: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
        <Error><Code>AuthenticationFailed</Code>\
        <Message>Server failed to authenticate the request.\nRequestId:42</Message></Error>";

    #[test]
    fn test_interpret_authentication_failure() {
        let err = interpret_failure(StatusCode::FORBIDDEN, AUTH_FAILED_BODY, "stage block");
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(
            err.to_string(),
            "stage block: AuthenticationFailed (Server failed to authenticate the request.)"
        );
    }

    #[test]
    fn test_interpret_failure_without_error_document() {
        let err = interpret_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops", "commit block list");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(
            err.to_string(),
            "commit block list: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_interpret_failure_maps_auth_code_regardless_of_status() {
        let err = interpret_failure(StatusCode::BAD_REQUEST, AUTH_FAILED_BODY, "stage block");
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
}
