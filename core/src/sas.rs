use std::fmt;
use std::fmt::Display;
use std::time::Duration;

use crate::constants::SAS_VERSION;
use crate::hash;
use crate::time;
use crate::time::DateTime;
use crate::Error;
use crate::Result;

/// Default validity window when the caller doesn't pick one.
const DEFAULT_VALIDITY: Duration = Duration::from_secs(3600);

/// How long a token is allowed to grant: `sr=c` scopes it to one container.
const SAS_RESOURCE: &str = "c";

/// Permission set carried by a service SAS token.
///
/// The rendering order is fixed (`racwdl`) no matter how the set was built,
/// because the same string participates in the signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SasPermissions {
    read: bool,
    add: bool,
    create: bool,
    write: bool,
    delete: bool,
    list: bool,
}

impl SasPermissions {
    /// Read-only permissions, what a transfer source needs.
    pub fn read() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    /// Write-only permissions, what a transfer destination needs.
    pub fn write() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    /// Parse a permission set from its symbols, e.g. `"rw"`.
    ///
    /// Symbols may arrive in any order; unknown symbols and the empty string
    /// are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::permission_invalid("permission set is empty"));
        }

        let mut perms = Self::default();
        for c in s.chars() {
            match c {
                'r' => perms.read = true,
                'a' => perms.add = true,
                'c' => perms.create = true,
                'w' => perms.write = true,
                'd' => perms.delete = true,
                'l' => perms.list = true,
                _ => {
                    return Err(Error::permission_invalid(format!(
                        "unrecognized permission symbol: {c}"
                    )))
                }
            }
        }

        Ok(perms)
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Display for SasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical order, as signed.
        for (set, symbol) in [
            (self.read, 'r'),
            (self.add, 'a'),
            (self.create, 'c'),
            (self.write, 'w'),
            (self.delete, 'd'),
            (self.list, 'l'),
        ] {
            if set {
                write!(f, "{symbol}")?;
            }
        }

        Ok(())
    }
}

/// Issuer for container-scoped service SAS tokens.
///
/// The string-to-sign layout is versioned by the service; this implementation
/// targets signed version `2020-12-06` and renders its sixteen-field layout.
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
pub struct ServiceSas {
    account: String,
    key: String,
    container: String,
    permissions: SasPermissions,
    start: Option<DateTime>,
    expiry: Option<DateTime>,
}

impl ServiceSas {
    /// Create an issuer for one container.
    ///
    /// Without an explicit window the token starts at issuance time and
    /// expires an hour later.
    pub fn new(account: &str, key: &str, container: &str, permissions: SasPermissions) -> Self {
        Self {
            account: account.to_string(),
            key: key.to_string(),
            container: container.to_string(),
            permissions,
            start: None,
            expiry: None,
        }
    }

    /// Specify the start of the validity window.
    pub fn with_start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Specify the end of the validity window.
    pub fn with_expiry(mut self, expiry: DateTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    // https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas#construct-the-signature-string
    fn signature(&self, start: DateTime, expiry: DateTime) -> Result<String> {
        let string_to_sign = [
            self.permissions.to_string(),
            time::format_rfc3339(start),
            time::format_rfc3339(expiry),
            format!("/blob/{}/{}", self.account, self.container),
            String::new(), // signed identifier
            String::new(), // signed IP
            String::new(), // signed protocol
            SAS_VERSION.to_string(),
            SAS_RESOURCE.to_string(),
            String::new(), // signed snapshot time
            String::new(), // signed encryption scope
            String::new(), // rscc
            String::new(), // rscd
            String::new(), // rsce
            String::new(), // rscl
            String::new(), // rsct
        ]
        .join("\n");

        let decoded_key = hash::base64_decode(&self.key).map_err(|e| {
            Error::credential_invalid("account key is not valid base64").with_source(e)
        })?;

        Ok(hash::base64_hmac_sha256(
            &decoded_key,
            string_to_sign.as_bytes(),
        ))
    }

    /// Issue the token as an ordered set of query parameters.
    pub fn token(&self) -> Result<Vec<(String, String)>> {
        if self.permissions.is_empty() {
            return Err(Error::permission_invalid("permission set is empty"));
        }

        let start = self.start.unwrap_or_else(time::now);
        let expiry = self.expiry.unwrap_or_else(|| {
            start + chrono::TimeDelta::from_std(DEFAULT_VALIDITY).expect("in bounds")
        });

        let sig = self.signature(start, expiry)?;

        Ok(vec![
            ("sv".to_string(), SAS_VERSION.to_string()),
            ("sr".to_string(), SAS_RESOURCE.to_string()),
            ("st".to_string(), urlencoded(time::format_rfc3339(start))),
            ("se".to_string(), urlencoded(time::format_rfc3339(expiry))),
            ("sp".to_string(), self.permissions.to_string()),
            ("sig".to_string(), urlencoded(sig)),
        ])
    }

    /// Issue the token rendered as a query string, ready to append to a URL.
    pub fn token_string(&self) -> Result<String> {
        let token = self
            .token()?
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<String>>()
            .join("&");

        Ok(token)
    }
}

fn urlencoded(s: String) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
