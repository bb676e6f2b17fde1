//! In-memory repositories backing `AppState::fake`.

use std::sync::Mutex;

use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::RepoError;
use crate::ingredients::{
    repo::IngredientRepository,
    repo_types::{Ingredient, IngredientFilter, NewIngredient},
};
use crate::inventory::{
    repo::InventoryRepository,
    repo_types::{InventoryChanges, InventoryItem, NewInventoryItem},
};
use crate::users::{
    repo::UserRepository,
    repo_types::{NewUser, User},
};

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepoError::Conflict);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update_username(&self, id: Uuid, username: &str) -> Result<Option<User>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|u| {
            u.username = username.to_string();
            u.updated_at = OffsetDateTime::now_utc();
            u.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryIngredientRepository {
    rows: Mutex<Vec<Ingredient>>,
}

#[async_trait]
impl IngredientRepository for MemoryIngredientRepository {
    async fn list(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, RepoError> {
        let rows = self.rows.lock().unwrap();
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut out: Vec<Ingredient> = rows
            .iter()
            .filter(|i| filter.category.map_or(true, |c| i.category == c))
            .filter(|i| {
                needle
                    .as_deref()
                    .map_or(true, |n| i.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        out.sort_by_key(|i| i.name.to_lowercase());
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Ingredient>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|i| ids.contains(&i.id)).cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>, RepoError> {
        let rows = self.rows.lock().unwrap();
        let name = name.to_lowercase();
        Ok(rows.iter().find(|i| i.name.to_lowercase() == name).cloned())
    }

    async fn create(&self, new: NewIngredient) -> Result<Ingredient, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let lowered = new.name.to_lowercase();
        if rows.iter().any(|i| i.name.to_lowercase() == lowered) {
            return Err(RepoError::Conflict);
        }
        let now = OffsetDateTime::now_utc();
        let created = Ingredient {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }
}

/// Rows are kept in insertion order, so listing walks them backwards.
#[derive(Default)]
pub struct MemoryInventoryRepository {
    rows: Mutex<Vec<InventoryItem>>,
}

#[async_trait]
impl InventoryRepository for MemoryInventoryRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InventoryItem>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItem>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, new: NewInventoryItem) -> Result<InventoryItem, RepoError> {
        let now = OffsetDateTime::now_utc();
        let created = InventoryItem {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            ingredient_id: new.ingredient_id,
            quantity: new.quantity,
            unit: new.unit,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InventoryChanges,
    ) -> Result<Option<InventoryItem>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|i| i.id == id && i.user_id == owner)
            .map(|i| {
                if let Some(quantity) = changes.quantity {
                    i.quantity = quantity;
                }
                if let Some(unit) = changes.unit {
                    i.unit = unit;
                }
                i.updated_at = OffsetDateTime::now_utc();
                i.clone()
            }))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| !(i.id == id && i.user_id == owner));
        Ok(rows.len() != before)
    }
}
