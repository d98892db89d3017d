use std::collections::HashMap;
use std::fmt::Debug;
use std::fmt::Formatter;

use blobport_core::Credential;
use blobport_core::Redact;
use blobport_transfer::BlobLocator;
use blobport_transfer::Error;
use blobport_transfer::Result;

/// Explicit configuration for one storage endpoint.
///
/// This is the value surrounding code builds (from a connection string, CLI
/// flags, whatever) and passes down; the transfer layer itself never reads
/// the environment or files.
#[derive(Clone, Default)]
pub struct Config {
    /// Service endpoint, e.g. `https://account.blob.core.windows.net`.
    /// Derived from the account name when not set explicitly.
    pub endpoint: Option<String>,
    /// Storage account name.
    pub account_name: Option<String>,
    /// Base64 encoded storage account key.
    pub account_key: Option<String>,
    /// Pre-issued SAS token, used when no account key is configured.
    pub sas_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .finish()
    }
}

impl Config {
    /// Parse a [connection string][1] into a configuration object.
    ///
    /// Not every parameter has to be present; the caller can still fill
    /// fields directly afterwards. An example connection string:
    ///
    /// ```txt
    /// DefaultEndpointsProtocol=https;
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// EndpointSuffix=core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let key_values = parse_into_key_values(conn_str)?;

        let account_name = key_values.get("AccountName").cloned();
        let endpoint = match key_values.get("BlobEndpoint") {
            // An explicit endpoint always wins.
            Some(endpoint) => Some(endpoint.clone()),
            None => account_name.as_ref().map(|name| {
                let protocol = key_values
                    .get("DefaultEndpointsProtocol")
                    .map(String::as_str)
                    .unwrap_or("https");
                let suffix = key_values
                    .get("EndpointSuffix")
                    .map(String::as_str)
                    .unwrap_or("core.windows.net");
                format!("{protocol}://{name}.blob.{suffix}")
            }),
        };

        Ok(Self {
            endpoint,
            account_name,
            account_key: key_values.get("AccountKey").cloned(),
            sas_token: key_values.get("SharedAccessSignature").cloned(),
        })
    }

    /// The credential this configuration carries.
    ///
    /// A shared key takes precedence over a SAS token when both are set.
    pub fn credential(&self) -> Result<Credential> {
        if let (Some(name), Some(key)) = (&self.account_name, &self.account_key) {
            return Ok(Credential::with_shared_key(name, key));
        }
        if let Some(token) = &self.sas_token {
            return Ok(Credential::with_sas_token(token));
        }

        Err(Error::config(
            "neither an account key nor a SAS token is configured",
        ))
    }

    /// Build a locator for one blob behind this endpoint.
    pub fn locator(&self, container: &str, blob: &str) -> Result<BlobLocator> {
        let account = self
            .account_name
            .as_deref()
            .ok_or_else(|| Error::config("account name is not configured"))?;

        match &self.endpoint {
            Some(endpoint) => BlobLocator::new(endpoint, account, container, blob),
            None => BlobLocator::for_account(account, container, blob),
        }
    }
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}
