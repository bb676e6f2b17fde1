use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::repo_types::{Category, Ingredient};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Ingredient> for IngredientDto {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            category: i.category,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    pub category: Option<Category>,
    pub search: Option<String>,
}
