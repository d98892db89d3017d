use std::fmt::{Debug, Formatter};

use crate::Redact;

/// Credential enum for the two supported authentication methods.
///
/// Exactly one credential is attached to a request. Shared-key credentials
/// produce an `Authorization` header; SAS tokens are appended to the request
/// query instead.
#[derive(Clone)]
pub enum Credential {
    /// Shared key authentication with account name and key.
    SharedKey {
        /// Storage account name.
        account_name: String,
        /// Base64 encoded storage account key.
        account_key: String,
    },
    /// SAS (shared access signature) token authentication.
    SasToken {
        /// The pre-issued token, as query parameters.
        token: String,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::SharedKey")
                .field("account_name", account_name)
                .field("account_key", &Redact::from(account_key))
                .finish(),
            Credential::SasToken { token } => f
                .debug_struct("Credential::SasToken")
                .field("token", &Redact::from(token))
                .finish(),
        }
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Self {
        Self::SharedKey {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }

    /// Create a new credential with SAS token authentication.
    ///
    /// A leading `?` is stripped so tokens copied straight out of a URL work.
    pub fn with_sas_token(sas_token: &str) -> Self {
        Self::SasToken {
            token: sas_token.trim_start_matches('?').to_string(),
        }
    }

    /// Check if the credential carries the fields its variant requires.
    pub fn is_valid(&self) -> bool {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => !account_name.is_empty() && !account_key.is_empty(),
            Credential::SasToken { token } => !token.is_empty(),
        }
    }
}
