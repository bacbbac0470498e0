//! Inbound HTTP handling.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router built from the route table, body buffering)
//!     → dispatcher.rs (session, hooks, action, panic boundary)
//!     → action.rs (consumer code)
//!     → dispatcher.rs (response composition)
//!     → Send to client
//! ```

pub mod action;
pub mod dispatcher;
pub mod server;

pub use action::{action_fn, json, Action, ActionResult, NotImplementedAction};
pub use dispatcher::{construct_response, dispatch, JSON_CONTENT_TYPE};
pub use server::{build_router, serve, DispatchState};
