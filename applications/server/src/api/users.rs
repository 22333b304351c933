/// User profile API routes
use crate::{
    error::{Result, ServerError},
    middleware::CurrentUser,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shelf_core::PublicUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileImageRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
    pub user: PublicUser,
}

/// GET /api/users/profile
pub async fn get_profile(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PublicUser>> {
    let profile = app_state.credentials.profile(user.user_id()).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(app_state): State<AppState>,
    user: CurrentUser,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;

    let username = req
        .username
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Username is required".to_string()))?;

    let updated = app_state
        .credentials
        .update_profile(user.user_id(), username, req.profile_image.as_deref())
        .await?;

    Ok(Json(ProfileResponse {
        success: None,
        message: "Profile updated successfully".to_string(),
        user: updated.into(),
    }))
}

/// PUT /api/users/profile/image
pub async fn update_profile_image(
    State(app_state): State<AppState>,
    user: CurrentUser,
    payload: std::result::Result<Json<UpdateProfileImageRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;

    let image = req
        .image
        .as_deref()
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Image is required".to_string()))?;

    let updated = app_state
        .credentials
        .update_profile_image(user.user_id(), image)
        .await?;

    Ok(Json(ProfileResponse {
        success: Some(true),
        message: "Profile image updated successfully".to_string(),
        user: updated.into(),
    }))
}
