use std::sync::Arc;

use whispr_gateway::Dispatcher;
use whispr_store::Whispr;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub whispr: Whispr,
    pub dispatcher: Dispatcher,
}

impl AppStateInner {
    pub fn new(whispr: Whispr, dispatcher: Dispatcher) -> AppState {
        Arc::new(Self { whispr, dispatcher })
    }
}
