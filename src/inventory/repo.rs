use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::RepoError;
use crate::inventory::repo_types::{
    InventoryChanges, InventoryItem, InventoryRow, NewInventoryItem,
};

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InventoryItem>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItem>, RepoError>;
    async fn create(&self, new: NewInventoryItem) -> Result<InventoryItem, RepoError>;
    /// Returns `None` when no item with this id belongs to `owner`.
    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InventoryChanges,
    ) -> Result<Option<InventoryItem>, RepoError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgInventoryRepository {
    db: PgPool,
}

impl PgInventoryRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InventoryItem>, RepoError> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, user_id, ingredient_id, quantity, unit, created_at, updated_at
            FROM inventory
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItem>, RepoError> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, user_id, ingredient_id, quantity, unit, created_at, updated_at
            FROM inventory
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(InventoryItem::try_from).transpose()
    }

    async fn create(&self, new: NewInventoryItem) -> Result<InventoryItem, RepoError> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            INSERT INTO inventory (user_id, ingredient_id, quantity, unit)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, ingredient_id, quantity, unit, created_at, updated_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.ingredient_id)
        .bind(new.quantity)
        .bind(new.unit.as_str())
        .fetch_one(&self.db)
        .await?;
        InventoryItem::try_from(row)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InventoryChanges,
    ) -> Result<Option<InventoryItem>, RepoError> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            UPDATE inventory
               SET quantity = COALESCE($3, quantity),
                   unit = COALESCE($4, unit),
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, ingredient_id, quantity, unit, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.quantity)
        .bind(changes.unit.map(|u| u.as_str()))
        .fetch_optional(&self.db)
        .await?;
        row.map(InventoryItem::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM inventory WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
