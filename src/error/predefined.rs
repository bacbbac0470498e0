//! Errors raised by the pipeline itself.

use super::{AppError, BoxError, ErrorCode};

pub fn body_not_found() -> AppError {
    AppError::new(ErrorCode::BadRequest, "The request body is not found")
}

pub fn body_invalid(cause: impl Into<BoxError>) -> AppError {
    AppError::new(ErrorCode::BadRequest, "The request body is invalid").wrap_error(cause)
}

pub fn body_unreadable(cause: impl Into<BoxError>) -> AppError {
    AppError::new(ErrorCode::BadRequest, "The request body cannot be read").wrap_error(cause)
}

pub fn parameter_not_found(name: &str) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request parameter [{name}] is not found"),
    )
}

pub fn parameter_invalid(name: &str, cause: impl Into<BoxError>) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request parameter [{name}] is invalid"),
    )
    .wrap_error(cause)
}

pub fn query_not_found(name: &str) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request query [{name}] is not found"),
    )
}

pub fn query_invalid(name: &str, cause: impl Into<BoxError>) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request query [{name}] is invalid"),
    )
    .wrap_error(cause)
}

pub fn header_not_found(name: &str) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request header [{name}] is not found"),
    )
}

pub fn header_invalid(name: &str, cause: impl Into<BoxError>) -> AppError {
    AppError::new(
        ErrorCode::BadRequest,
        format!("The request header [{name}] is invalid"),
    )
    .wrap_error(cause)
}

pub fn route_not_found(method: &str, path: &str) -> AppError {
    AppError::new(
        ErrorCode::NotFound,
        format!("No route is registered for [{method} {path}]"),
    )
}

pub fn action_not_implemented(endpoint: &str) -> AppError {
    AppError::new(
        ErrorCode::NotImplemented,
        format!("No action is registered for endpoint [{endpoint}]"),
    )
}

pub fn endpoint_panic(payload: &str) -> AppError {
    AppError::new(ErrorCode::GeneralFailure, format!("Endpoint panic: {payload}"))
}

pub fn endpoint_timeout(limit: std::time::Duration) -> AppError {
    AppError::new(
        ErrorCode::GeneralFailure,
        format!("Endpoint timeout: no response within {limit:?}"),
    )
}

pub fn webcall_request_invalid(cause: impl Into<BoxError>) -> AppError {
    AppError::new(ErrorCode::GeneralFailure, "The webcall request is invalid").wrap_error(cause)
}

pub fn webcall_transport_failure(cause: impl Into<BoxError>) -> AppError {
    AppError::new(ErrorCode::GeneralFailure, "The webcall could not be delivered").wrap_error(cause)
}

pub fn webcall_not_replayable() -> AppError {
    AppError::new(
        ErrorCode::GeneralFailure,
        "The webcall request body cannot be replayed",
    )
}

pub fn response_invalid(cause: impl Into<BoxError>) -> AppError {
    AppError::new(ErrorCode::GeneralFailure, "The webcall response is invalid").wrap_error(cause)
}
