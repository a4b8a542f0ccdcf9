use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use sonde::{HandlerTable, Registry};

use crate::access::{AccessGate, require_superuser};
use crate::config::Config;
use crate::discovery::Discovered;
use crate::dispatch::dispatch;
use crate::index::index;
use crate::page::DiagnosticPage;

#[cfg(test)]
mod tests;

/// Shared, read-only request state. The registry and handler table are
/// frozen once discovery hands them over.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub pages: Arc<HandlerTable<dyn DiagnosticPage>>,
    pub gate: Arc<dyn AccessGate>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(discovered: Discovered, gate: Arc<dyn AccessGate>, config: Config) -> Self {
        Self {
            registry: Arc::new(discovered.registry),
            pages: Arc::new(discovered.pages),
            gate,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mount = state.config.mount.clone();
    let mut router = Router::new()
        .route(&format!("{mount}/"), get(index))
        .route(&format!("{mount}/{{app_name}}/{{slug}}/"), get(dispatch));
    if !mount.is_empty() {
        router = router.route(&mount, get(index));
    }
    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_superuser,
        ))
        .with_state(state)
}
