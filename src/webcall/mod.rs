//! Outbound HTTP calls made on behalf of a session.
//!
//! # Data Flow
//! ```text
//! Session::create_webcall_request
//!     → WebRequest builder (query, header, retry, anticipate)
//!     → create_http_request (URL + query, headers, WebcallHooks::wrap_request)
//!     → do_with_retry (connectivity budget, per-status budget, delay)
//!     → response buffered, logged, replayed
//!     → first DataReceiver whose range holds the status parses the body
//! ```

pub mod client;
pub mod receiver;
pub mod request;
pub mod retry;

pub use client::{ClientBuildError, WebcallClients};
pub use receiver::{get_data_template, DataReceiver, DataTemplate, StatusCodeRange};
pub use request::WebRequest;
pub use retry::{do_with_retry, HasStatus};
