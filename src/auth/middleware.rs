use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::{get_cookie, CookiePolicy, ACCESS_COOKIE_NAME},
        tokens::{TokenError, TokenService},
    },
    error::AppError,
    state::AppState,
};

/// Identity attached to the request by [`authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Result of the silent probe done by [`status_check`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub user_id: Option<Uuid>,
}

/// Placed in the response extensions by handlers that establish an
/// identity (signup); [`attach_tokens`] turns it into session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedIdentity {
    pub id: Uuid,
}

/// Handler-side view of [`CurrentUser`].
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|user| AuthUser(user.id))
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn access_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, ACCESS_COOKIE_NAME).or_else(|| bearer_token(headers))
}

fn resolve_user(tokens: &TokenService, headers: &HeaderMap) -> Result<Uuid, AppError> {
    let token =
        access_token(headers).ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    let verified = tokens.verify_access_token(token).map_err(|e| {
        warn!(error = %e, "access token rejected");
        match e {
            TokenError::Invalid(_) => AppError::unauthorized("Invalid token payload"),
            _ => AppError::unauthorized("Invalid or expired token"),
        }
    })?;

    Uuid::parse_str(&verified.user_id).map_err(|_| {
        warn!("access token carries a non-uuid userId");
        AppError::unauthorized("Invalid token payload")
    })
}

/// Rejects the request with `UNAUTHORIZED` unless it carries a valid
/// access token; otherwise attaches [`CurrentUser`] and continues.
pub async fn authenticate(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = resolve_user(&tokens, req.headers())?;
    req.extensions_mut().insert(CurrentUser { id });
    Ok(next.run(req).await)
}

/// Like [`authenticate`] but never fails: records an [`AuthStatus`].
pub async fn status_check(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Response {
    let status = match resolve_user(&tokens, req.headers()) {
        Ok(id) => AuthStatus { user_id: Some(id) },
        Err(e) => {
            debug!(reason = %e, "status probe unauthenticated");
            AuthStatus::default()
        }
    };
    req.extensions_mut().insert(status);
    next.run(req).await
}

/// Mints a token pair for the identity the handler produced and sets both
/// session cookies. Error responses pass through untouched.
pub async fn attach_tokens(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut res = next.run(req).await;
    if !res.status().is_success() {
        return Ok(res);
    }

    let identity = res
        .extensions()
        .get::<IssuedIdentity>()
        .copied()
        .ok_or_else(|| AppError::unauthorized("No identity to issue tokens for"))?;

    let pair = state.tokens.generate_tokens(&identity.id.to_string())?;
    CookiePolicy::append(res.headers_mut(), state.cookies.session_cookies(&pair));
    debug!(user_id = %identity.id, "session cookies attached");
    Ok(res)
}
