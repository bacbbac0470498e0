//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router from the route table
//! - Buffer inbound bodies and resolve endpoint names to actions
//! - Wire up middleware (tracing, consumer layers)
//!
//! The request timeout is enforced inside the dispatcher so a late request
//! still gets a composed response and an exit entry.
//! - Serve until Ctrl+C

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    response::Response,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use bytes::Bytes;
use http::Method;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::config::RouteConfig;
use crate::error::predefined;
use crate::http::action::{Action, NotImplementedAction};
use crate::http::dispatcher::dispatch;
use crate::session::RequestData;

/// Session name used when no route matches.
pub const ROUTE_NOT_FOUND_ENDPOINT: &str = "RouteNotFound";

/// State injected into every handler.
#[derive(Clone)]
pub struct DispatchState {
    pub app: AppState,
    pub actions: Arc<HashMap<String, Arc<dyn Action>>>,
    pub max_body_size: usize,
}

/// Build the router: one method router per path, every route dispatching
/// its endpoint name, unmatched requests answered as `NotFound`.
pub fn build_router(state: DispatchState, routes: &[RouteConfig]) -> Router {
    let mut by_path: BTreeMap<&str, MethodRouter<DispatchState>> = BTreeMap::new();
    for route in routes {
        let Some(filter) = method_filter(&route.method) else {
            tracing::warn!(
                endpoint = %route.endpoint,
                method = %route.method,
                "Skipping route with unsupported method"
            );
            continue;
        };
        let endpoint = route.endpoint.clone();
        let handler = move |State(state): State<DispatchState>,
                            params: Option<Path<HashMap<String, String>>>,
                            request: Request| {
            let endpoint = endpoint.clone();
            async move { endpoint_handler(state, endpoint, params, request).await }
        };
        let method_router = by_path
            .remove(route.path.as_str())
            .unwrap_or_else(MethodRouter::new)
            .on(filter, handler);
        by_path.insert(route.path.as_str(), method_router);
    }

    let customization = state.app.customization.clone();
    let router = by_path
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(path, method_router.fallback(not_found_handler))
        })
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    customization.instrument_router(router)
}

/// The Axum method filter for a configured method name, if it has one.
pub(crate) fn method_filter(method: &str) -> Option<MethodFilter> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok()?;
    MethodFilter::try_from(method).ok()
}

async fn endpoint_handler(
    state: DispatchState,
    endpoint: String,
    params: Option<Path<HashMap<String, String>>>,
    request: Request,
) -> Response {
    let path_params = params.map(|Path(params)| params).unwrap_or_default();
    let action = state
        .actions
        .get(&endpoint)
        .cloned()
        .unwrap_or_else(|| Arc::new(NotImplementedAction));

    let (parts, body) = request.into_parts();
    let (body, action) = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(body) => (body, Ok(action)),
        Err(e) => (Bytes::new(), Err(predefined::body_unreadable(e))),
    };
    let request = RequestData::new(parts.method, parts.uri, parts.headers, path_params, body);
    dispatch(state.app, &endpoint, request, action).await
}

async fn not_found_handler(State(state): State<DispatchState>, request: Request) -> Response {
    let (parts, _) = request.into_parts();
    let err = predefined::route_not_found(parts.method.as_str(), parts.uri.path());
    let request = RequestData::new(parts.method, parts.uri, parts.headers, HashMap::new(), Bytes::new());
    dispatch(state.app, ROUTE_NOT_FOUND_ENDPOINT, request, Err(err)).await
}

/// Serve `router` on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C; serving until the process exits");
            std::future::pending::<()>().await;
        }
    }
}
