use axum::extract::State;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::middleware::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath},
    inventory::{
        dto::{
            CreateInventoryRequest, CreateWithIngredientRequest, DeletedResponse,
            InventoryItemDto, UpdateInventoryRequest,
        },
        services,
    },
    response::ApiResponse,
    state::AppState,
};

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<Vec<InventoryItemDto>>, AppError> {
    let items = services::list(&state, user_id).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<InventoryItemDto>, AppError> {
    let item = services::get(&state, user_id, id).await?;
    Ok(ApiResponse::ok(item.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateInventoryRequest>,
) -> Result<ApiResponse<InventoryItemDto>, AppError> {
    let item = services::create(&state, user_id, payload).await?;
    Ok(ApiResponse::created(item.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_item_with_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateWithIngredientRequest>,
) -> Result<ApiResponse<InventoryItemDto>, AppError> {
    let item = services::create_with_ingredient(&state, user_id, payload).await?;
    Ok(ApiResponse::created(item.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateInventoryRequest>,
) -> Result<ApiResponse<InventoryItemDto>, AppError> {
    let item = services::update(&state, user_id, id, payload).await?;
    Ok(ApiResponse::ok(item.into()))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<DeletedResponse>, AppError> {
    let id = services::delete(&state, user_id, id).await?;
    Ok(ApiResponse::ok(DeletedResponse { id }))
}
