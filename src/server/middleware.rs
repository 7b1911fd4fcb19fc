//! Bearer-token gate for protected routes.
//!
//! The dispatcher calls [`authenticate`] before any route marked
//! `auth_required`. On success the caller's id and email are added to the
//! path parameters; on failure the handler never runs.

use http::header::AUTHORIZATION;
use tracing::{debug, warn};

use super::context::RequestContext;
use crate::auth::{extract_bearer, TokenError, TokenService};
use crate::error::ServiceError;
use crate::routing::{PathParams, AUTHENTICATED_USER_EMAIL, AUTHENTICATED_USER_ID};

const MISSING_HEADER: &str = "Authorization header is required";
const BAD_HEADER: &str = "Invalid authorization header format";
const BAD_TOKEN: &str = "Invalid or expired token";

/// Verify the request's bearer token and return `params` extended with the
/// caller's identity.
pub fn authenticate(
    ctx: &RequestContext,
    params: PathParams,
    tokens: &TokenService,
) -> Result<PathParams, ServiceError> {
    let header = match ctx.headers.get(AUTHORIZATION) {
        None => return Err(ServiceError::unauthorized(MISSING_HEADER)),
        Some(value) if value.is_empty() => return Err(ServiceError::unauthorized(MISSING_HEADER)),
        Some(value) => value
            .to_str()
            .map_err(|_| ServiceError::unauthorized(BAD_HEADER))?,
    };
    if header.trim().is_empty() {
        return Err(ServiceError::unauthorized(MISSING_HEADER));
    }

    let token = extract_bearer(header).map_err(|_| ServiceError::unauthorized(BAD_HEADER))?;

    let claims = tokens.verify(token).map_err(|err| {
        match &err {
            // Could indicate tampering
            TokenError::InvalidSignature => {
                warn!(path = %ctx.path, "Rejected token with invalid signature")
            }
            _ => debug!(path = %ctx.path, error = %err, "Rejected token"),
        }
        ServiceError::unauthorized(BAD_TOKEN)
    })?;

    let mut params = params;
    params.insert(AUTHENTICATED_USER_ID, claims.user_id.to_string());
    params.insert(AUTHENTICATED_USER_EMAIL, claims.email);
    Ok(params)
}
