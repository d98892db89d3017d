use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// Signing context for a request.
///
/// Canonicalization is order sensitive, so the request is pulled apart into a
/// form the signers can render deterministically and then written back.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from [`http::request::Parts`].
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri
                .authority
                .ok_or_else(|| Error::request_invalid("request without authority can't be signed"))?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return them when the context is applied.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to [`http::request::Parts`].
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into the query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Push a raw query string into the query list.
    ///
    /// The string is written back verbatim, which is how pre-issued SAS
    /// tokens keep their own encoding intact.
    #[inline]
    pub fn query_append(&mut self, query: &str) {
        self.query.push((query.to_string(), "".to_string()));
    }

    /// Get header value by name.
    ///
    /// Returns empty string if the header is not set, which is exactly the
    /// placeholder rendering the canonical string expects.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get headers with the given name prefix, names lowercased.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(prefix))
            .map(|(k, v)| {
                (
                    k.as_str().to_lowercase(),
                    v.to_str().expect("must be valid header").to_string(),
                )
            })
            .collect()
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }

    /// Convert sorted query to percent decoded string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn query_to_percent_decoded_string(
        mut query: Vec<(String, String)>,
        sep: &str,
        join: &str,
    ) -> String {
        let mut s = String::with_capacity(16);

        // Sort via query name.
        query.sort();

        for (idx, (k, v)) in query.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            if !v.is_empty() {
                s.push_str(sep);
                s.push_str(&percent_encoding::percent_decode_str(&v).decode_utf8_lossy());
            }
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_apply_round_trip() {
        let req = http::Request::put("https://account.blob.core.windows.net/data/blob?comp=block")
            .header("x-ms-version", "2020-04-08")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let ctx = SigningRequest::build(&mut parts).unwrap();
        assert_eq!(ctx.method, Method::PUT);
        assert_eq!(ctx.path, "/data/blob");
        assert_eq!(ctx.query, vec![("comp".to_string(), "block".to_string())]);

        ctx.apply(&mut parts).unwrap();
        assert_eq!(
            parts.uri.to_string(),
            "https://account.blob.core.windows.net/data/blob?comp=block"
        );
        assert_eq!(parts.headers.get("x-ms-version").unwrap(), "2020-04-08");
    }

    #[test]
    fn test_build_rejects_missing_authority() {
        let req = http::Request::get("/data/blob").body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        assert!(SigningRequest::build(&mut parts).is_err());
    }

    #[test]
    fn test_header_to_string_sorts_by_name() {
        let headers = vec![
            ("x-ms-version".to_string(), "2020-04-08".to_string()),
            ("x-ms-blob-type".to_string(), "BlockBlob".to_string()),
        ];
        assert_eq!(
            SigningRequest::header_to_string(headers, ":", "\n"),
            "x-ms-blob-type:BlockBlob\nx-ms-version:2020-04-08"
        );
    }

    #[test]
    fn test_query_to_percent_decoded_string() {
        let query = vec![
            ("comp".to_string(), "block".to_string()),
            ("blockid".to_string(), "MDAwMDAw".to_string()),
        ];
        assert_eq!(
            SigningRequest::query_to_percent_decoded_string(query, ":", "\n"),
            "blockid:MDAwMDAw\ncomp:block"
        );
    }
}
