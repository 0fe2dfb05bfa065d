//! Profile API endpoints.

use api_protocol::{ProfileResponse, UpdateProfileRequest, UserProfile};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use contact_store::ContactStore;
use entities::User;

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentUser;
use crate::state::SharedState;

fn user_to_profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username.clone(),
        name: user.name.clone(),
        country_code: user.country_code.clone(),
        mobile_number: user.mobile_number.clone(),
        status: user.status.clone(),
        bio: user.bio.clone(),
    }
}

/// Gets the caller's profile.
pub async fn get_me(
    Extension(current): Extension<CurrentUser>,
) -> ServerResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        user: user_to_profile(&current.user),
    }))
}

/// Updates the caller's display attributes.
pub async fn update_me<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> ServerResult<Json<ProfileResponse>> {
    let mut user = current.user;
    if let Some(name) = request.name {
        user.name = name;
    }
    if let Some(status) = request.status {
        user.status = status;
    }
    if let Some(bio) = request.bio {
        user.bio = bio;
    }
    let user = state.store.update_user(user).await?;

    tracing::info!(user_id = user.id, "profile updated");

    Ok(Json(ProfileResponse {
        user: user_to_profile(&user),
    }))
}

/// Looks up a user by mobile number.
pub async fn get_by_mobile<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Path(mobile_number): Path<String>,
) -> ServerResult<Json<ProfileResponse>> {
    let user = state
        .store
        .get_user_by_mobile(&mobile_number)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: user_to_profile(&user),
    }))
}
