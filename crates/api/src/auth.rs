//! HTTP Basic authentication middleware

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the authenticated user, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Reject requests without valid Basic credentials
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(ApiError::missing_auth)?;
    let (username, password) = parse_basic(header).ok_or_else(ApiError::malformed_auth)?;

    if !state.credentials().matches(&username, &password) {
        tracing::warn!(username, "Rejected invalid credentials");
        return Err(ApiError::invalid_credentials());
    }

    req.extensions_mut().insert(AuthUser(username));
    Ok(next.run(req).await)
}

/// Decode `Basic base64(user:password)`
pub(crate) fn parse_basic(header: &HeaderValue) -> Option<(String, String)> {
    let encoded = header.to_str().ok()?.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let value = format!("Basic {}", STANDARD.encode("admin:pa:ss"));
        assert_eq!(
            parse_basic(&header(&value)),
            Some(("admin".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn test_parse_basic_rejects_malformed() {
        assert_eq!(parse_basic(&header("Bearer abc")), None);
        assert_eq!(parse_basic(&header("Basic !!!not-base64")), None);

        let no_colon = format!("Basic {}", STANDARD.encode("admin"));
        assert_eq!(parse_basic(&header(&no_colon)), None);
    }
}
