use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::RepoError;
use crate::ingredients::repo_types::{Ingredient, IngredientFilter, IngredientRow, NewIngredient};

#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ordered by name, case-insensitively.
    async fn list(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>, RepoError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Ingredient>, RepoError>;
    /// Case-insensitive exact match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>, RepoError>;
    /// Fails with `RepoError::Conflict` when the name is taken.
    async fn create(&self, new: NewIngredient) -> Result<Ingredient, RepoError>;
}

#[derive(Clone)]
pub struct PgIngredientRepository {
    db: PgPool,
}

impl PgIngredientRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_domain(rows: Vec<IngredientRow>) -> Result<Vec<Ingredient>, RepoError> {
    rows.into_iter().map(Ingredient::try_from).collect()
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl IngredientRepository for PgIngredientRepository {
    async fn list(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, RepoError> {
        let pattern = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, category, created_at, updated_at
            FROM ingredients
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY lower(name)
            "#,
        )
        .bind(filter.category.map(|c| c.as_str()))
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;
        into_domain(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>, RepoError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, category, created_at, updated_at
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Ingredient::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Ingredient>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, category, created_at, updated_at
            FROM ingredients
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;
        into_domain(rows)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>, RepoError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT id, name, category, created_at, updated_at
            FROM ingredients
            WHERE lower(name) = lower($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        row.map(Ingredient::try_from).transpose()
    }

    async fn create(&self, new: NewIngredient) -> Result<Ingredient, RepoError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            INSERT INTO ingredients (name, category)
            VALUES ($1, $2)
            RETURNING id, name, category, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(new.category.as_str())
        .fetch_one(&self.db)
        .await?;
        Ingredient::try_from(row)
    }
}
