use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    ingredients::{
        dto::IngredientDto,
        repo_types::{Category, Ingredient},
    },
    inventory::repo_types::{InventoryItem, Unit},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Unit,
    pub ingredient: IngredientDto,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<(InventoryItem, Ingredient)> for InventoryItemDto {
    fn from((item, ingredient): (InventoryItem, Ingredient)) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            ingredient_id: item.ingredient_id,
            quantity: item.quantity,
            unit: item.unit,
            ingredient: ingredient.into(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryRequest {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Unit,
}

/// Adds stock for an ingredient named by the client, creating the
/// ingredient if it does not exist yet.
#[derive(Debug, Deserialize)]
pub struct CreateWithIngredientRequest {
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: Unit,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInventoryRequest {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}
