use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};

use whispr_gateway::handle_connection;

use crate::state::AppState;

/// Upgrade to a read-only observer socket. No caller id is needed; every
/// event is public.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, dispatcher))
}
