//! Application handle.
//!
//! # Responsibilities
//! - Build shared state once: customization, webcall clients, log filter
//! - Hold the action table and route table
//! - Run bootstrap hooks around serving
//!
//! # Design Decisions
//! - Explicit handle instead of a process-wide registry
//! - Fail fast: a failing bootstrap hook aborts startup
//! - `app_closing` runs even when serving fails

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppConfig, RouteConfig, ServerConfig};
use crate::customization::Customization;
use crate::error::BoxError;
use crate::http::action::Action;
use crate::http::server::{build_router, serve, DispatchState};
use crate::logging::{LogFilter, LogLevel};
use crate::session::Session;
use crate::webcall::{ClientBuildError, WebcallClients};

/// State shared by every session of one application.
#[derive(Clone)]
pub struct AppState {
    pub(crate) customization: Arc<dyn Customization>,
    pub(crate) clients: Arc<WebcallClients>,
    pub(crate) log_filter: LogFilter,
    pub(crate) request_timeout: Duration,
}

impl AppState {
    pub fn new(
        customization: Arc<dyn Customization>,
        clients: Arc<WebcallClients>,
        log_filter: LogFilter,
    ) -> Self {
        Self {
            customization,
            clients,
            log_filter,
            request_timeout: Duration::from_secs(ServerConfig::default().request_timeout_secs),
        }
    }

    /// Upper bound on the action stages of one request.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Build the webcall clients described by `config`.
    pub fn from_config(
        config: &AppConfig,
        customization: Arc<dyn Customization>,
    ) -> Result<Self, ClientBuildError> {
        let clients = WebcallClients::new(&config.webcall, customization.as_ref())?;
        Ok(Self::new(customization, Arc::new(clients), config.logging.log_filter())
            .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs)))
    }

    pub fn log_filter(&self) -> LogFilter {
        self.log_filter
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{stage} hook failed: {source}")]
    Hook {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Application {
    config: AppConfig,
    state: AppState,
    root: Session,
    actions: HashMap<String, Arc<dyn Action>>,
    routes: Vec<RouteConfig>,
}

impl Application {
    /// Runs `pre_bootstrap`, then builds the shared state.
    pub fn new<C: Customization>(config: AppConfig, customization: C) -> Result<Self, ApplicationError> {
        customization
            .pre_bootstrap()
            .map_err(|source| ApplicationError::Hook { stage: "pre_bootstrap", source })?;

        let state = AppState::from_config(&config, Arc::new(customization))?;
        let root = Session::root(state.clone());
        root.log_app_root(LogLevel::Info, "Application", "Bootstrap", "Shared state initialized");

        let routes = config.routes.clone();
        Ok(Self {
            config,
            state,
            root,
            actions: HashMap::new(),
            routes,
        })
    }

    pub fn register_action(&mut self, endpoint: impl Into<String>, action: impl Action + 'static) -> &mut Self {
        self.actions.insert(endpoint.into(), Arc::new(action));
        self
    }

    pub fn add_route(
        &mut self,
        endpoint: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> &mut Self {
        self.routes.push(RouteConfig {
            endpoint: endpoint.into(),
            method: method.into(),
            path: path.into(),
        });
        self
    }

    pub fn routes(&self) -> &[RouteConfig] {
        &self.routes
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Session for logging outside of requests.
    pub fn root_session(&self) -> &Session {
        &self.root
    }

    pub fn router(&self) -> axum::Router {
        let state = DispatchState {
            app: self.state.clone(),
            actions: Arc::new(self.actions.clone()),
            max_body_size: self.config.server.max_body_size,
        };
        build_router(state, &self.routes)
    }

    /// Serve until Ctrl+C, with `post_bootstrap` before and `app_closing` after.
    pub async fn run(self, listener: TcpListener) -> Result<(), ApplicationError> {
        let customization = self.state.customization.clone();
        let router = self.router();

        customization
            .post_bootstrap()
            .map_err(|source| ApplicationError::Hook { stage: "post_bootstrap", source })?;
        self.root.log_app_root(
            LogLevel::Info,
            "Application",
            "Bootstrap",
            &format!("{} routes, {} actions", self.routes.len(), self.actions.len()),
        );

        let served = serve(listener, router).await;

        self.root.log_app_root(LogLevel::Info, "Application", "Closing", "");
        let closed = customization.app_closing();
        served?;
        closed.map_err(|source| ApplicationError::Hook { stage: "app_closing", source })
    }
}
