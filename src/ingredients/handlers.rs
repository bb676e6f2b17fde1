use axum::extract::State;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    ingredients::{
        dto::{CreateIngredientRequest, IngredientDto, IngredientQuery},
        services,
    },
    response::ApiResponse,
    state::AppState,
};

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IngredientQuery>,
) -> Result<ApiResponse<Vec<IngredientDto>>, AppError> {
    let items = services::list(state.ingredients.as_ref(), query).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<IngredientDto>, AppError> {
    let ingredient = services::get(state.ingredients.as_ref(), id).await?;
    Ok(ApiResponse::ok(ingredient.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateIngredientRequest>,
) -> Result<ApiResponse<IngredientDto>, AppError> {
    let ingredient = services::create(state.ingredients.as_ref(), payload).await?;
    Ok(ApiResponse::created(ingredient.into()))
}
