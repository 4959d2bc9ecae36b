use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod categories;
pub mod doc;
pub mod groups;
pub mod health;
pub mod menu_items;
pub mod orders;
pub mod params;
pub mod users;

// Build the API router without binding state; it will be provided at the
// top level. Registration gets its own tighter concurrency cap since it
// is reachable without a token.
pub fn create_api_router(anon_limit: usize) -> Router<AppState> {
    Router::new()
        .nest("/users", users::router(anon_limit))
        .nest("/token", auth::router())
        .nest("/categories", categories::router())
        .nest("/menu-items", menu_items::router())
        .nest("/groups", groups::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
}
