//! Bearer-token authentication for the protected API surface.
//!
//! Identity is issued by an external provider; this layer only
//! validates the token and exposes its claims to handlers. Rejections
//! use the same error envelope as the route handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{AppState, routes::error_response};
use callsheet_shared::{Claims, JwtError};

/// Splits an Authorization header into scheme and token, accepting the
/// bearer scheme in any casing.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Validates the bearer token and stores its claims in the request
/// extensions, where the `AuthUser` extractor picks them up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return error_response(
            401,
            "missing_token",
            "Authorization header with a bearer token is required",
        );
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => error_response(401, "token_expired", "Token has expired"),
        Err(_) => error_response(401, "invalid_token", "Token is invalid"),
    }
}

/// The authenticated caller, for handlers behind `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the caller's user id.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the full claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| error_response(401, "unauthorized", "Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn test_bearer_token_accepts_any_scheme_casing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("BEARER abc.def"), Some("abc.def"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token("abc.def"), None);
    }
}
