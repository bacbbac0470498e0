//! REST request pipeline.
//!
//! A thin hosting layer that turns each inbound HTTP request into a
//! [`Session`], runs the registered [`Action`] between consumer hooks, and
//! composes a JSON response. Actions can make outbound webcalls with
//! independent connectivity and per-status retry budgets.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ──▶ http::dispatcher ──▶ Action
//!                    (axum routes)    (session, hooks,       │
//!                                      panic boundary)       │ Session::create_webcall_request
//!                                            │               ▼
//!     Client Response                        │           webcall ──────────▶ Remote API
//!     ◀──────────────────────────────────────┘           (retry, replay,
//!                                                          templates)
//!
//!     Cross-cutting: config · customization hooks · logging taxonomy · error taxonomy
//! ```

pub mod app;
pub mod config;
pub mod customization;
pub mod error;
pub mod http;
pub mod logging;
pub mod session;
pub mod webcall;

#[cfg(test)]
mod testing;

pub use app::{AppState, Application, ApplicationError};
pub use config::AppConfig;
pub use customization::{Customization, DefaultCustomization};
pub use error::{AppError, BoxError, ErrorCode};
pub use http::{action_fn, json, Action, ActionResult};
pub use logging::{LogLevel, LogType};
pub use session::Session;
pub use webcall::{StatusCodeRange, WebRequest};
