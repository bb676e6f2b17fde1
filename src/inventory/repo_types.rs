use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{db::RepoError, validation::UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    Ml,
    Piece,
}

impl Unit {
    pub const ALL: [Unit; 5] = [Unit::Kg, Unit::G, Unit::L, Unit::Ml, Unit::Piece];

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Piece => "piece",
        }
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "unit",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Unit,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct InventoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = RepoError;

    fn try_from(r: InventoryRow) -> Result<Self, Self::Error> {
        let unit = r.unit.parse().map_err(|_| RepoError::Decode {
            column: "inventory.unit",
            value: r.unit.clone(),
        })?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            ingredient_id: r.ingredient_id,
            quantity: r.quantity,
            unit,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub user_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: f64,
    pub unit: Unit,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventoryChanges {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
}

impl InventoryChanges {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.unit.is_none()
    }
}
