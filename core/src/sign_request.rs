use std::fmt::Write;

use http::header;
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use percent_encoding::percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::constants::X_MS_DATE;
use crate::hash::base64_decode;
use crate::hash::base64_hmac_sha256;
use crate::time::format_http_date;
use crate::time::now;
use crate::time::DateTime;
use crate::Credential;
use crate::Error;
use crate::Result;
use crate::SigningRequest;

/// Characters kept verbatim when query values are written back to the
/// request after signing.
const QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signer that implements the storage Shared Key authorization scheme.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
///
/// Signing is a pure function of the request and the credential: the signer
/// performs no network I/O, and the timestamp it signs is the `x-ms-date`
/// header already on the request. The header is only filled in from the clock
/// when the caller left it unset.
#[derive(Debug)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request in place with the given credential.
    ///
    /// A shared key produces an `Authorization: SharedKey {account}:{sig}`
    /// header; a SAS token is appended to the query string instead.
    pub fn sign(&self, parts: &mut Parts, cred: &Credential) -> Result<()> {
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential is missing required fields",
            ));
        }

        let mut ctx = SigningRequest::build(parts)?;

        match cred {
            Credential::SasToken { token } => {
                ctx.query_append(token);
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => {
                let now_time = self.time.unwrap_or_else(now);
                let string_to_sign = string_to_sign(&mut ctx, account_name, now_time)?;
                let decoded_key = base64_decode(account_key).map_err(|e| {
                    Error::credential_invalid("account key is not valid base64").with_source(e)
                })?;
                let signature = base64_hmac_sha256(&decoded_key, string_to_sign.as_bytes());

                ctx.headers.insert(header::AUTHORIZATION, {
                    let mut value: HeaderValue =
                        format!("SharedKey {account_name}:{signature}").parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
        }

        // Apply percent encoding for query values.
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(parts)
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct string to sign.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
fn string_to_sign(ctx: &mut SigningRequest, account_name: &str, now_time: DateTime) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", {
        // A zero content length is rendered as the empty placeholder.
        let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
        if content_length == "0" {
            ""
        } else {
            content_length
        }
    })?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&header::HeaderName::from_static("content-md5"))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx, now_time)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &mut SigningRequest, now_time: DateTime) -> Result<String> {
    // Keep a caller-supplied date so signing stays deterministic.
    if !ctx.headers.contains_key(X_MS_DATE) {
        ctx.headers
            .insert(X_MS_DATE, format_http_date(now_time).parse()?);
    }

    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-"),
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &mut SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_percent_decoded_string(query, ":", "\n")
    )
}
