use tracing::{debug, error, info, warn};

use crate::{
    auth::{dto::SignupRequest, tokens::TokenPair},
    db::RepoError,
    error::AppError,
    state::AppState,
    users::{repo_types::NewUser, repo_types::User, services::validate_username},
    validation::{is_valid_email, normalize_email, MIN_PASSWORD_LEN},
};

pub async fn signup(state: &AppState, req: SignupRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "signup with invalid email");
        return Err(AppError::UserValidation("Invalid email".into()));
    }
    let username = validate_username(&req.username)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        warn!(email = %email, "signup password too short");
        return Err(AppError::UserValidation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::UserAlreadyExists);
    }

    let password_hash = state.hasher.hash(&req.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::UserCreationFailed
    })?;

    let user = state
        .users
        .create(NewUser {
            email,
            username,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::UserAlreadyExists,
            other => {
                error!(error = %other, "create user failed");
                AppError::UserCreationFailed
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks the credentials and issues a fresh token pair.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<TokenPair, AppError> {
    let email = normalize_email(email);

    let user = state.users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        AppError::UserNotFound
    })?;

    let ok = state
        .hasher
        .verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.context("verify password")))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Auth("Invalid credentials".into()));
    }

    let pair = state.tokens.generate_tokens(&user.id.to_string())?;
    info!(user_id = %user.id, "user logged in");
    Ok(pair)
}

/// Sessions are stateless, so there is nothing to invalidate here; the
/// HTTP layer clears the cookies.
pub fn logout() {
    debug!("logout requested");
}
