//! Connection credentials
//!
//! Held by a connected session only; dropped in full on disconnect.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::validator::{normalize_sas_token, validate_name};
use crate::error::AuthError;

/// A shared-access-signature token, always stored with its leading `?`.
#[derive(Clone, PartialEq, Eq)]
pub struct SasToken(String);

impl SasToken {
    /// Accepts `?sv=...` or the raw `sv=...` parameter form.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        normalize_sas_token(raw).map(SasToken)
    }

    /// The token including its leading `?`.
    pub fn as_query(&self) -> &str {
        &self.0
    }

    /// The token without its leading `?`.
    pub fn as_params(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Debug for SasToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SasToken(<redacted>)")
    }
}

/// Account, container and token for one storage container.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    account: String,
    container: String,
    sas_token: SasToken,
}

impl Credentials {
    pub fn new(account: &str, container: &str, sas_token: &str) -> Result<Self, AuthError> {
        Ok(Self {
            account: validate_name(account, "account_name")?,
            container: validate_name(container, "container_name")?,
            sas_token: SasToken::parse(sas_token)?,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn sas_token(&self) -> &SasToken {
        &self.sas_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("container", &self.container)
            .field("sas_token", &self.sas_token)
            .finish()
    }
}

/// Wire form of [`Credentials`] used by the broker API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub account_name: String,
    pub container_name: String,
    pub sas_token: String,
}

impl From<&Credentials> for ConnectionInfo {
    fn from(credentials: &Credentials) -> Self {
        Self {
            account_name: credentials.account.clone(),
            container_name: credentials.container.clone(),
            sas_token: credentials.sas_token.as_query().to_string(),
        }
    }
}

impl TryFrom<ConnectionInfo> for Credentials {
    type Error = AuthError;

    fn try_from(info: ConnectionInfo) -> Result<Self, Self::Error> {
        Credentials::new(&info.account_name, &info.container_name, &info.sas_token)
    }
}
