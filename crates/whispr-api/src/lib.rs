//! JSON HTTP surface over the content store.

pub mod caller;
pub mod comments;
pub mod confessions;
pub mod crushes;
pub mod error;
pub mod health;
pub mod market;
pub mod profiles;
pub mod realtime;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All routes, nested under `/api`.
pub fn router(state: AppState) -> Router {
    let profile_routes = Router::new()
        .route("/profiles", post(profiles::create_profile))
        .route(
            "/profiles/{id}",
            get(profiles::get_profile).patch(profiles::update_profile),
        )
        .route("/profiles/{id}/regenerate", post(profiles::regenerate_alias));

    let confession_routes = Router::new()
        .route(
            "/confessions",
            get(confessions::list_confessions).post(confessions::create_confession),
        )
        .route("/confessions/{id}", delete(confessions::delete_confession))
        .route("/confessions/{id}/reactions", post(confessions::toggle_reaction))
        .route(
            "/confessions/{id}/comments",
            get(comments::list_confession_comments).post(comments::create_confession_comment),
        );

    let crush_routes = Router::new()
        .route("/crushes", get(crushes::list_crushes).post(crushes::send_crush))
        .route("/crushes/{id}", delete(crushes::delete_crush))
        .route("/crushes/{id}/reveal", post(crushes::reveal_crush));

    let market_routes = Router::new()
        .route("/market", get(market::list_market_items).post(market::create_market_item))
        .route("/market/{id}", delete(market::delete_market_item))
        .route("/market/{id}/toggle-sold", post(market::toggle_sold))
        .route(
            "/market/{id}/comments",
            get(comments::list_market_comments).post(comments::create_market_comment),
        );

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/ws", get(realtime::ws_upgrade))
        .merge(profile_routes)
        .merge(confession_routes)
        .merge(crush_routes)
        .merge(market_routes)
        .with_state(state);

    Router::new().nest("/api", api)
}
