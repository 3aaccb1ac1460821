//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::DecodingKey;

use crate::{AppState, Error, auth::decode_token};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying bearer tokens.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.jwt_keys.decoding.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The user ID from the token is placed into the request extensions and the
/// request is executed normally. A request without an `Authorization` header
/// gets a 401 response and one with an invalid or expired token gets a 403.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    if !parts.headers.contains_key(AUTHORIZATION) {
        return Error::MissingToken.into_response();
    }

    let claims = match parts.headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => decode_token(bearer.token(), &state.decoding_key),
        None => {
            tracing::warn!("Rejected malformed authorization header.");
            Err(Error::InvalidToken)
        }
    };

    match claims {
        Ok(claims) => {
            parts.extensions.insert(claims.user_id);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(error) => error.into_response(),
    }
}
