use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    db::RepoError,
    error::AppError,
    ingredients::{
        dto::{CreateIngredientRequest, IngredientQuery},
        repo::IngredientRepository,
        repo_types::{Category, Ingredient, IngredientFilter, NewIngredient},
    },
    validation::{bounded_name, MAX_INGREDIENT_NAME_LEN},
};

fn validate_name(raw: &str) -> Result<String, AppError> {
    bounded_name(raw, MAX_INGREDIENT_NAME_LEN).ok_or_else(|| {
        AppError::validation(format!(
            "Ingredient name must be between 1 and {MAX_INGREDIENT_NAME_LEN} characters"
        ))
    })
}

pub async fn list(
    repo: &dyn IngredientRepository,
    query: IngredientQuery,
) -> Result<Vec<Ingredient>, AppError> {
    let filter = IngredientFilter {
        category: query.category,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    Ok(repo.list(&filter).await?)
}

pub async fn get(repo: &dyn IngredientRepository, id: Uuid) -> Result<Ingredient, AppError> {
    repo.find_by_id(id).await?.ok_or(AppError::IngredientNotFound)
}

pub async fn create(
    repo: &dyn IngredientRepository,
    req: CreateIngredientRequest,
) -> Result<Ingredient, AppError> {
    let name = validate_name(&req.name)?;
    if repo.find_by_name(&name).await?.is_some() {
        warn!(name = %name, "ingredient already exists");
        return Err(AppError::IngredientAlreadyExists);
    }
    let ingredient = repo
        .create(NewIngredient {
            name,
            category: req.category,
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::IngredientAlreadyExists,
            other => other.into(),
        })?;
    info!(ingredient_id = %ingredient.id, name = %ingredient.name, "ingredient created");
    Ok(ingredient)
}

/// Returns the ingredient with this name, creating it when absent. An
/// existing ingredient keeps its own category.
pub async fn find_or_create(
    repo: &dyn IngredientRepository,
    name: &str,
    category: Category,
) -> Result<Ingredient, AppError> {
    let name = validate_name(name)?;
    if let Some(existing) = repo.find_by_name(&name).await? {
        return Ok(existing);
    }
    match repo
        .create(NewIngredient {
            name: name.clone(),
            category,
        })
        .await
    {
        Ok(created) => {
            info!(ingredient_id = %created.id, name = %created.name, "ingredient created on first use");
            Ok(created)
        }
        // Lost an insert race; the winner's row is now visible.
        Err(RepoError::Conflict) => repo.find_by_name(&name).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "ingredient `{name}` conflicted on insert but cannot be read back"
            ))
        }),
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::async_trait;
    use time::OffsetDateTime;

    use crate::testing::MemoryIngredientRepository;

    fn req(name: &str, category: Category) -> CreateIngredientRequest {
        CreateIngredientRequest {
            name: name.into(),
            category,
        }
    }

    #[tokio::test]
    async fn create_trims_and_rejects_duplicates() {
        let repo = MemoryIngredientRepository::default();
        let basil = create(&repo, req("  Basil ", Category::Spice)).await.unwrap();
        assert_eq!(basil.name, "Basil");

        let err = create(&repo, req("basil", Category::Vegetable)).await.unwrap_err();
        assert!(matches!(err, AppError::IngredientAlreadyExists));
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let repo = MemoryIngredientRepository::default();
        let err = create(&repo, req("   ", Category::Other)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = MemoryIngredientRepository::default();
        let err = get(&repo, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::IngredientNotFound));
    }

    #[tokio::test]
    async fn list_filters_by_category_and_search() {
        let repo = MemoryIngredientRepository::default();
        for (name, category) in [
            ("Tomato", Category::Vegetable),
            ("Apple", Category::Fruit),
            ("Green apple", Category::Fruit),
            ("Beef", Category::Meat),
        ] {
            create(&repo, req(name, category)).await.unwrap();
        }

        let fruit = list(
            &repo,
            IngredientQuery {
                category: Some(Category::Fruit),
                search: None,
            },
        )
        .await
        .unwrap();
        let names: Vec<_> = fruit.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Green apple"]);

        let apples = list(
            &repo,
            IngredientQuery {
                category: None,
                search: Some(" APPLE ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(apples.len(), 2);

        let all = list(&repo, IngredientQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name, "Apple");
    }

    #[tokio::test]
    async fn find_or_create_reuses_existing_row() {
        let repo = MemoryIngredientRepository::default();
        let first = find_or_create(&repo, "Onion", Category::Vegetable).await.unwrap();
        let again = find_or_create(&repo, "onion", Category::Other).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.category, Category::Vegetable);
    }

    /// The first name lookup misses; the insert then collides with a row
    /// another request committed, which later lookups see.
    struct RacingIngredients {
        winner: Ingredient,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl IngredientRepository for RacingIngredients {
        async fn list(&self, _filter: &IngredientFilter) -> Result<Vec<Ingredient>, RepoError> {
            Ok(vec![self.winner.clone()])
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>, RepoError> {
            Ok((id == self.winner.id).then(|| self.winner.clone()))
        }
        async fn find_by_ids(&self, _ids: &[Uuid]) -> Result<Vec<Ingredient>, RepoError> {
            Ok(vec![self.winner.clone()])
        }
        async fn find_by_name(&self, _name: &str) -> Result<Option<Ingredient>, RepoError> {
            let mut lookups = self.lookups.lock().unwrap();
            *lookups += 1;
            Ok((*lookups > 1).then(|| self.winner.clone()))
        }
        async fn create(&self, _new: NewIngredient) -> Result<Ingredient, RepoError> {
            Err(RepoError::Conflict)
        }
    }

    #[tokio::test]
    async fn find_or_create_rereads_winner_after_conflict() {
        let now = OffsetDateTime::now_utc();
        let winner = Ingredient {
            id: Uuid::new_v4(),
            name: "Shallot".into(),
            category: Category::Vegetable,
            created_at: now,
            updated_at: now,
        };
        let repo = RacingIngredients {
            winner: winner.clone(),
            lookups: Mutex::new(0),
        };

        let found = find_or_create(&repo, "shallot", Category::Other).await.unwrap();

        assert_eq!(found, winner);
        assert_eq!(*repo.lookups.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn create_conflict_is_already_exists() {
        let now = OffsetDateTime::now_utc();
        let repo = RacingIngredients {
            winner: Ingredient {
                id: Uuid::new_v4(),
                name: "Shallot".into(),
                category: Category::Vegetable,
                created_at: now,
                updated_at: now,
            },
            lookups: Mutex::new(0),
        };
        let err = create(&repo, req("Shallot", Category::Vegetable)).await.unwrap_err();
        assert!(matches!(err, AppError::IngredientAlreadyExists));
    }
}
