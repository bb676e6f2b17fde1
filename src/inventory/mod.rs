use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{auth::middleware::authenticate, state::AppState};

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/inventory",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/inventory/with-ingredient",
            post(handlers::create_item_with_ingredient),
        )
        .route(
            "/inventory/:id",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}
