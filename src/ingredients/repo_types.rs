use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{db::RepoError, validation::UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vegetable,
    Fruit,
    Meat,
    Seafood,
    Dairy,
    Grain,
    Spice,
    Condiment,
    Beverage,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Vegetable,
        Category::Fruit,
        Category::Meat,
        Category::Seafood,
        Category::Dairy,
        Category::Grain,
        Category::Spice,
        Category::Condiment,
        Category::Beverage,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vegetable => "vegetable",
            Category::Fruit => "fruit",
            Category::Meat => "meat",
            Category::Seafood => "seafood",
            Category::Dairy => "dairy",
            Category::Grain => "grain",
            Category::Spice => "spice",
            Category::Condiment => "condiment",
            Category::Beverage => "beverage",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Raw `ingredients` row; `category` is TEXT in the schema.
#[derive(Debug, FromRow)]
pub struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = RepoError;

    fn try_from(r: IngredientRow) -> Result<Self, Self::Error> {
        let category = r.category.parse().map_err(|_| RepoError::Decode {
            column: "ingredients.category",
            value: r.category.clone(),
        })?;
        Ok(Self {
            id: r.id,
            name: r.name,
            category,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Clone, Default)]
pub struct IngredientFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}
