//! Consumer hooks.
//!
//! # Data Flow
//! ```text
//! Application::run  → BootstrapHooks (pre/post bootstrap, closing)
//!                   → HostingHooks (router instrumentation)
//! dispatcher        → HandlerHooks (pre/post action, interpret success/error)
//! Session::log*     → LoggingHook
//! webcall           → WebcallHooks (client builder, request decoration)
//! ```
//!
//! # Design Decisions
//! - One trait per capability group, every method defaulted
//! - `Customization` is implemented for anything providing all five groups
//! - Implementations are shared by every request task, hence `Send + Sync`

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::error::Error as StdError;

use crate::error::{AppError, BoxError, ErrorCode};
use crate::logging::{emit_tracing_event, LogEntry};
use crate::session::Session;

/// Hooks around application start and stop.
pub trait BootstrapHooks: Send + Sync {
    fn pre_bootstrap(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn post_bootstrap(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn app_closing(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Sink for taxonomy log entries that passed the session's filter.
pub trait LoggingHook: Send + Sync {
    fn log(&self, entry: &LogEntry<'_>) {
        emit_tracing_event(entry);
    }
}

/// Hosting adjustments, e.g. extra middleware layers.
pub trait HostingHooks: Send + Sync {
    fn instrument_router(&self, router: axum::Router) -> axum::Router {
        router
    }
}

/// Hooks around each action and response interpretation.
#[async_trait]
pub trait HandlerHooks: Send + Sync {
    async fn pre_action(&self, _session: &mut Session) -> Result<(), BoxError> {
        Ok(())
    }

    async fn post_action(&self, _session: &mut Session) -> Result<(), BoxError> {
        Ok(())
    }

    fn interpret_success(&self, response: Option<&Value>) -> (StatusCode, String) {
        default_interpret_success(response)
    }

    fn interpret_error(&self, error: &(dyn StdError + Send + Sync + 'static)) -> (StatusCode, String) {
        default_interpret_error(error)
    }
}

/// Hooks over outbound webcalls.
pub trait WebcallHooks: Send + Sync {
    /// Adjust a webcall client before it is built (proxies, middleware-like transports).
    fn configure_client(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        builder
    }

    /// Decorate an outbound request just before it is sent (tracing headers and such).
    fn wrap_request(&self, _session: &Session, request: reqwest::Request) -> reqwest::Request {
        request
    }
}

/// The full hook surface consumed by the pipeline.
pub trait Customization:
    BootstrapHooks + LoggingHook + HostingHooks + HandlerHooks + WebcallHooks + 'static
{
}

impl<T> Customization for T where
    T: BootstrapHooks + LoggingHook + HostingHooks + HandlerHooks + WebcallHooks + 'static
{
}

/// Every hook at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCustomization;

impl BootstrapHooks for DefaultCustomization {}
impl LoggingHook for DefaultCustomization {}
impl HostingHooks for DefaultCustomization {}
impl HandlerHooks for DefaultCustomization {}
impl WebcallHooks for DefaultCustomization {}

/// `204` with no body for an absent or empty result, otherwise `200` with its JSON.
pub fn default_interpret_success(response: Option<&Value>) -> (StatusCode, String) {
    let Some(value) = response else {
        return (StatusCode::NO_CONTENT, String::new());
    };
    match serde_json::to_string(value) {
        Ok(body) if body.is_empty() => (StatusCode::NO_CONTENT, body),
        Ok(body) => (StatusCode::OK, body),
        Err(e) => default_interpret_error(&e),
    }
}

/// Status and envelope of an `AppError`; anything else is a `GeneralFailure`.
pub fn default_interpret_error(error: &(dyn StdError + Send + Sync + 'static)) -> (StatusCode, String) {
    let app_error = match error.downcast_ref::<AppError>() {
        Some(app_error) => app_error.clone(),
        None => AppError::new(ErrorCode::GeneralFailure, error.to_string()),
    };
    let body = serde_json::to_string(&app_error).unwrap_or_default();
    (app_error.http_status_code(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_without_object_is_no_content() {
        assert_eq!(default_interpret_success(None), (StatusCode::NO_CONTENT, String::new()));
    }

    #[test]
    fn success_serializes_object() {
        let value = json!("x");
        assert_eq!(
            default_interpret_success(Some(&value)),
            (StatusCode::OK, "\"x\"".to_string())
        );
    }

    #[test]
    fn app_error_keeps_its_status() {
        let err = AppError::new(ErrorCode::NotFound, "gone");
        let (status, body) = default_interpret_error(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"code":"NotFound","message":"gone"}"#);
    }

    #[test]
    fn foreign_error_is_general_failure() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let (status, body) = default_interpret_error(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"code":"GeneralFailure","message":"socket closed"}"#);
    }
}
