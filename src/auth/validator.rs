//! Credential shape validation
//!
//! Only the shape of the token is checked here; the storage service decides
//! whether it is authentic.

use crate::error::AuthError;

/// Performs basic input sanitation on account and container identifiers.
fn is_valid_input(input: &str) -> bool {
    !input.is_empty() && !input.contains(['/', '\r', '\n', '\0', ' '])
}

/// Trims and checks an account or container identifier.
pub fn validate_name(raw: &str, field: &'static str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    if !is_valid_input(trimmed) {
        return Err(AuthError::InvalidName(field));
    }
    Ok(trimmed.to_string())
}

/// Returns the token with exactly one leading `?`.
///
/// Accepted shapes are `?<params>` and the raw `name=value[&...]` form.
pub fn normalize_sas_token(raw: &str) -> Result<String, AuthError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(AuthError::MissingField("sas_token"));
    }
    if token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedToken("contains whitespace".into()));
    }

    let params = match token.strip_prefix('?') {
        Some(params) if params.is_empty() || params.starts_with('?') => {
            return Err(AuthError::MalformedToken("no parameters after '?'".into()));
        }
        Some(params) => params,
        None => token,
    };

    if !is_query_pair(params.split('&').next().unwrap_or_default()) {
        return Err(AuthError::MalformedToken(
            "expected a query string of name=value pairs".into(),
        ));
    }

    Ok(format!("?{}", params))
}

fn is_query_pair(pair: &str) -> bool {
    matches!(pair.split_once('='), Some((name, _)) if !name.is_empty())
}
