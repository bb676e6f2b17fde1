use axum::extract::State;
use tracing::instrument;

use crate::{
    auth::middleware::AuthUser,
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUserRequest},
        services,
    },
};

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let user = services::get_profile(state.users.as_ref(), user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let user = services::update_profile(state.users.as_ref(), user_id, payload).await?;
    Ok(ApiResponse::ok(user.into()))
}
