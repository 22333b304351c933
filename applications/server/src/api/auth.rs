/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shelf_core::PublicUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
}

/// `Some` only for a present, non-blank value
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// POST /api/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;

    let (Some(username), Some(email), Some(password)) = (
        present(req.username.as_ref()),
        present(req.email.as_ref()),
        present(req.password.as_ref()),
    ) else {
        return Err(ServerError::BadRequest("Please fill all fields".to_string()));
    };

    let user = app_state
        .credentials
        .register(username, email, password)
        .await?;
    let token = app_state.tokens.issue(&user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = payload?;

    let (Some(email), Some(password)) = (
        present(req.email.as_ref()),
        present(req.password.as_ref()),
    ) else {
        return Err(ServerError::BadRequest(
            "Please provide both email and password".to_string(),
        ));
    };

    let user = app_state
        .credentials
        .verify_credentials(email, password)
        .await?;
    let token = app_state.tokens.issue(&user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: user.into(),
    }))
}
