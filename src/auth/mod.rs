use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod cookie;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod services;
pub mod tokens;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/auth/signup",
            post(handlers::signup)
                .layer(from_fn_with_state(state.clone(), middleware::attach_tokens)),
        )
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/auth/status",
            get(handlers::status).layer(from_fn_with_state(state.clone(), middleware::status_check)),
        )
}
