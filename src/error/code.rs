//! Error codes and their HTTP status mapping.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of application error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCode {
    #[default]
    GeneralFailure,
    Unauthorized,
    InvalidOperation,
    BadRequest,
    NotFound,
    CircuitBreak,
    OperationLock,
    AccessForbidden,
    DataCorruption,
    NotImplemented,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::GeneralFailure,
        ErrorCode::Unauthorized,
        ErrorCode::InvalidOperation,
        ErrorCode::BadRequest,
        ErrorCode::NotFound,
        ErrorCode::CircuitBreak,
        ErrorCode::OperationLock,
        ErrorCode::AccessForbidden,
        ErrorCode::DataCorruption,
        ErrorCode::NotImplemented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::GeneralFailure => "GeneralFailure",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::InvalidOperation => "InvalidOperation",
            ErrorCode::BadRequest => "BadRequest",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::CircuitBreak => "CircuitBreak",
            ErrorCode::OperationLock => "OperationLock",
            ErrorCode::AccessForbidden => "AccessForbidden",
            ErrorCode::DataCorruption => "DataCorruption",
            ErrorCode::NotImplemented => "NotImplemented",
        }
    }

    /// HTTP status reported for this code.
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            ErrorCode::GeneralFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidOperation => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::CircuitBreak => StatusCode::FORBIDDEN,
            ErrorCode::OperationLock => StatusCode::LOCKED,
            ErrorCode::AccessForbidden => StatusCode::FORBIDDEN,
            ErrorCode::DataCorruption => StatusCode::CONFLICT,
            ErrorCode::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

/// Status for a textual code; unknown codes report 500.
pub fn http_status_for(code: &str) -> StatusCode {
    code.parse::<ErrorCode>()
        .map(|c| c.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let expected = [500, 401, 405, 400, 404, 403, 423, 403, 409, 501];
        for (code, status) in ErrorCode::ALL.iter().zip(expected) {
            assert_eq!(code.http_status_code().as_u16(), status, "{code}");
        }
    }

    #[test]
    fn textual_lookup() {
        assert_eq!(http_status_for("NotFound"), StatusCode::NOT_FOUND);
        assert_eq!(http_status_for("bogus"), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!("OperationLock".parse::<ErrorCode>().unwrap(), ErrorCode::OperationLock);
    }
}
