pub mod auth;
mod convert;
pub mod dashboard;
pub mod donations;
pub mod error;
mod forms;
pub mod items;
pub mod middleware;
pub mod needs;
pub mod records;
pub mod state;


use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::require_session;
use crate::state::AppState;

/// All application routes. Transport layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(needs::home))
        .route("/health", get(health))
        .route("/needs", get(needs::list_needs))
        .route("/categories", get(needs::list_categories))
        .route("/pledge/{item_id}", post(needs::pledge))
        .route("/dashboard/{orphanage_id}", get(dashboard::dashboard))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/donate/{orphanage_id}/{category_id}", get(donations::donate_form))
        .route("/submit_donation", post(donations::submit_donation))
        .route("/track", get(donations::track));

    let protected_routes = Router::new()
        .route("/dashboard", get(dashboard::my_dashboard))
        .route("/add_item", get(items::add_item_form).post(items::add_item))
        .route("/edit_item/{item_id}", get(items::edit_item_form).post(items::edit_item))
        .route("/delete_item/{item_id}", post(items::delete_item))
        .route("/add_update", get(records::add_update_form).post(records::add_update))
        .route("/inventory", post(records::set_inventory))
        .route("/children", post(records::add_child))
        .route("/staff", post(records::add_staff))
        .route("/donations/{donation_id}/received", post(donations::mark_received))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
