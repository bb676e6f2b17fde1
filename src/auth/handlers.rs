use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::instrument;

use crate::{
    auth::{
        cookie::CookiePolicy,
        dto::{
            AuthStatusResponse, LoginRequest, LoginResponse, LogoutResponse, SignupRequest,
            SignupResponse,
        },
        middleware::{AuthStatus, IssuedIdentity},
        services,
    },
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    state::AppState,
};

/// Creates the account; the `attach_tokens` layer on this route turns the
/// returned identity into session cookies.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = services::signup(&state, payload).await?;
    Ok((
        Extension(IssuedIdentity { id: user.id }),
        ApiResponse::created(SignupResponse { user: user.into() }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, AppError> {
    let pair = services::login(&state, &payload.email, &payload.password).await?;

    let mut res = Json(LoginResponse {
        status: 1,
        message: "Login successful",
    })
    .into_response();
    CookiePolicy::append(res.headers_mut(), state.cookies.session_cookies(&pair));
    Ok(res)
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    services::logout();

    let mut res = Json(LogoutResponse {
        message: "Logout successful",
    })
    .into_response();
    CookiePolicy::append(res.headers_mut(), state.cookies.cleared_cookies());
    res
}

pub async fn status(Extension(status): Extension<AuthStatus>) -> ApiResponse<AuthStatusResponse> {
    ApiResponse::ok(AuthStatusResponse {
        is_authenticated: status.user_id.is_some(),
        user_id: status.user_id,
    })
}
