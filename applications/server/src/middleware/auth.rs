/// Authentication middleware
use crate::{error::ServerError, services::TokenError, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use shelf_core::{PublicUser, UserId};

/// The caller resolved by [`auth_middleware`], without credential material.
/// Can be used as an extractor in handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

impl CurrentUser {
    pub fn user_id(&self) -> &UserId {
        &self.0.id
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that verifies the bearer token and resolves the user it names.
///
/// Missing, invalid or expired tokens and tokens for unknown users are 401.
/// A failing user lookup is a 500.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ServerError::Auth("Not authorized, no token".to_string()))?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        match e {
            TokenError::Expired => ServerError::Auth("Not authorized, token expired".to_string()),
            TokenError::Invalid => ServerError::Auth("Not authorized, invalid token".to_string()),
        }
    })?;

    let user = state.credentials.find(&user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %user_id, "Token names an unknown user");
        ServerError::Auth("Not authorized, no user".to_string())
    })?;

    request.extensions_mut().insert(CurrentUser(user.into()));

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so CurrentUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
