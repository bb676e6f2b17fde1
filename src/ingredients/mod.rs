use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::{auth::middleware::authenticate, state::AppState};

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/ingredients",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/ingredients/:id", get(handlers::get_ingredient))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}
