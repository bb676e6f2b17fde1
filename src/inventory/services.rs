use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    ingredients::{repo_types::Ingredient, services as ingredients},
    inventory::{
        dto::{CreateInventoryRequest, CreateWithIngredientRequest, UpdateInventoryRequest},
        repo_types::{InventoryChanges, InventoryItem, NewInventoryItem},
    },
    state::AppState,
    validation::is_valid_quantity,
};

/// An inventory row paired with the ingredient it refers to.
pub type StockedItem = (InventoryItem, Ingredient);

fn check_quantity(quantity: f64) -> Result<f64, AppError> {
    if is_valid_quantity(quantity) {
        Ok(quantity)
    } else {
        Err(AppError::validation("Quantity must be a finite number >= 0"))
    }
}

/// Loads the item and checks that `user_id` owns it.
async fn owned_item(state: &AppState, user_id: Uuid, id: Uuid) -> Result<InventoryItem, AppError> {
    let item = state
        .inventory
        .find_by_id(id)
        .await?
        .ok_or(AppError::InventoryNotFound)?;
    if item.user_id != user_id {
        warn!(user_id = %user_id, item_id = %id, owner = %item.user_id, "inventory access denied");
        return Err(AppError::forbidden("You do not own this inventory item"));
    }
    Ok(item)
}

async fn with_ingredient(state: &AppState, item: InventoryItem) -> Result<StockedItem, AppError> {
    let ingredient = state
        .ingredients
        .find_by_id(item.ingredient_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "inventory item {} references missing ingredient {}",
                item.id,
                item.ingredient_id
            ))
        })?;
    Ok((item, ingredient))
}

pub async fn list(state: &AppState, user_id: Uuid) -> Result<Vec<StockedItem>, AppError> {
    let items = state.inventory.list_by_user(user_id).await?;

    let mut ids: Vec<Uuid> = items.iter().map(|i| i.ingredient_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let by_id: HashMap<Uuid, Ingredient> = state
        .ingredients
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    items
        .into_iter()
        .map(|item| -> Result<StockedItem, AppError> {
            let ingredient = by_id.get(&item.ingredient_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "inventory item {} references missing ingredient {}",
                    item.id,
                    item.ingredient_id
                ))
            })?;
            Ok((item, ingredient))
        })
        .collect()
}

pub async fn get(state: &AppState, user_id: Uuid, id: Uuid) -> Result<StockedItem, AppError> {
    let item = owned_item(state, user_id, id).await?;
    with_ingredient(state, item).await
}

pub async fn create(
    state: &AppState,
    user_id: Uuid,
    req: CreateInventoryRequest,
) -> Result<StockedItem, AppError> {
    let quantity = check_quantity(req.quantity)?;
    let ingredient = ingredients::get(state.ingredients.as_ref(), req.ingredient_id).await?;

    let item = state
        .inventory
        .create(NewInventoryItem {
            user_id,
            ingredient_id: ingredient.id,
            quantity,
            unit: req.unit,
        })
        .await?;
    info!(user_id = %user_id, item_id = %item.id, ingredient_id = %ingredient.id, "inventory item created");
    Ok((item, ingredient))
}

pub async fn create_with_ingredient(
    state: &AppState,
    user_id: Uuid,
    req: CreateWithIngredientRequest,
) -> Result<StockedItem, AppError> {
    let quantity = check_quantity(req.quantity)?;
    let ingredient =
        ingredients::find_or_create(state.ingredients.as_ref(), &req.name, req.category).await?;

    let item = state
        .inventory
        .create(NewInventoryItem {
            user_id,
            ingredient_id: ingredient.id,
            quantity,
            unit: req.unit,
        })
        .await?;
    info!(user_id = %user_id, item_id = %item.id, ingredient_id = %ingredient.id, "inventory item created with ingredient");
    Ok((item, ingredient))
}

pub async fn update(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: UpdateInventoryRequest,
) -> Result<StockedItem, AppError> {
    let changes = InventoryChanges {
        quantity: req.quantity.map(check_quantity).transpose()?,
        unit: req.unit,
    };
    if changes.is_empty() {
        return Err(AppError::validation(
            "At least one of quantity or unit is required",
        ));
    }

    owned_item(state, user_id, id).await?;
    // Deleted between the ownership check and the write.
    let item = state
        .inventory
        .update(id, user_id, changes)
        .await?
        .ok_or(AppError::InventoryNotFound)?;
    info!(user_id = %user_id, item_id = %id, "inventory item updated");
    with_ingredient(state, item).await
}

pub async fn delete(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Uuid, AppError> {
    owned_item(state, user_id, id).await?;
    if !state.inventory.delete(id, user_id).await? {
        return Err(AppError::InventoryNotFound);
    }
    info!(user_id = %user_id, item_id = %id, "inventory item deleted");
    Ok(id)
}
