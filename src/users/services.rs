use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    users::{dto::UpdateUserRequest, repo::UserRepository, repo_types::User},
    validation::{bounded_name, MAX_USERNAME_LEN},
};

pub(crate) fn validate_username(raw: &str) -> Result<String, AppError> {
    bounded_name(raw, MAX_USERNAME_LEN).ok_or_else(|| {
        AppError::UserValidation(format!(
            "Username must be between 1 and {MAX_USERNAME_LEN} characters"
        ))
    })
}

pub async fn get_profile(users: &dyn UserRepository, id: Uuid) -> Result<User, AppError> {
    users.find_by_id(id).await?.ok_or_else(|| {
        warn!(user_id = %id, "authenticated user no longer exists");
        AppError::UserNotFound
    })
}

pub async fn update_profile(
    users: &dyn UserRepository,
    id: Uuid,
    req: UpdateUserRequest,
) -> Result<User, AppError> {
    let username = validate_username(&req.username)?;
    let user = users
        .update_username(id, &username)
        .await?
        .ok_or(AppError::UserNotFound)?;
    info!(user_id = %id, "username updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUserRepository;
    use crate::users::repo_types::NewUser;

    async fn seeded() -> (MemoryUserRepository, User) {
        let repo = MemoryUserRepository::default();
        let user = repo
            .create(NewUser {
                email: "cook@example.com".into(),
                username: "cook".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        (repo, user)
    }

    #[tokio::test]
    async fn get_profile_returns_user() {
        let (repo, user) = seeded().await;
        let found = get_profile(&repo, user.id).await.unwrap();
        assert_eq!(found.email, "cook@example.com");
    }

    #[tokio::test]
    async fn get_profile_of_missing_user() {
        let (repo, _) = seeded().await;
        let err = get_profile(&repo, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn update_profile_trims_username() {
        let (repo, user) = seeded().await;
        let updated = update_profile(
            &repo,
            user.id,
            UpdateUserRequest {
                username: "  head chef ".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.username, "head chef");
    }

    #[tokio::test]
    async fn update_profile_rejects_blank_username() {
        let (repo, user) = seeded().await;
        let err = update_profile(&repo, user.id, UpdateUserRequest { username: " ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserValidation(_)));
    }
}
