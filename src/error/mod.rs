//! Error taxonomy.
//!
//! # Design Decisions
//! - Every domain error is an `AppError` whose code maps to one HTTP status
//! - Inner errors form a tree; foreign errors are kept as-is and serialize
//!   as `GeneralFailure`
//! - `contains` answers "was this failure part of the aggregate?"

pub mod app_error;
pub mod code;
pub mod predefined;

pub use app_error::{cleanup_inner_errors, AppError, BoxError, ErrorEnvelope, InnerError};
pub use code::{http_status_for, ErrorCode};
