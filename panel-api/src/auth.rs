use crate::error::ApiError;
use axum::{extract::Request, middleware::Next, response::Response};

/// Operator identity forwarded by the auth proxy in front of the API.
#[derive(Clone, Debug)]
pub struct Operator {
    pub username: String,
}

pub const OPERATOR_HEADER: &str = "x-panel-user";

/// Rejects requests that carry no operator header.
///
/// The panel API is meant to sit behind an auth proxy that verifies the
/// operator and sets `x-panel-user`; this middleware only checks presence.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let username = req
        .headers()
        .get(OPERATOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", OPERATOR_HEADER)))?;

    req.extensions_mut().insert(Operator { username });

    Ok(next.run(req).await)
}
