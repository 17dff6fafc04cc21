//! Credential material
//!
//! Handles account/container identifiers and SAS token normalization.

pub mod credentials;
pub mod validator;

pub use credentials::{ConnectionInfo, Credentials, SasToken};
pub use validator::normalize_sas_token;
