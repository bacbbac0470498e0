//! Application error with nested inner errors.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use super::code::ErrorCode;

/// Boxed error accepted by actions and hooks.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Shared handle to a wrapped inner error.
pub type InnerError = Arc<dyn StdError + Send + Sync>;

/// Error carrying a taxonomy code, a message and the errors it aggregates.
#[derive(Debug, Clone)]
pub struct AppError {
    code: ErrorCode,
    message: String,
    inner_errors: Vec<InnerError>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            inner_errors: Vec::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn inner_errors(&self) -> &[InnerError] {
        &self.inner_errors
    }

    pub fn http_status_code(&self) -> StatusCode {
        self.code.http_status_code()
    }

    /// Append the present errors of `errors` as inner errors; `None` entries are dropped.
    pub fn wrap<I, E>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = Option<E>>,
        E: Into<BoxError>,
    {
        self.inner_errors.extend(cleanup_inner_errors(errors));
        self
    }

    /// Append a single inner error.
    pub fn wrap_error(self, error: impl Into<BoxError>) -> Self {
        self.wrap([Some(error)])
    }

    /// Whether `err` is this error or any transitively nested inner error.
    ///
    /// A match is reference equality, equal display text, or a match against
    /// any error in `err`'s source chain.
    pub fn contains(&self, err: &(dyn StdError + 'static)) -> bool {
        if matches_chain(self, err) {
            return true;
        }
        self.inner_errors.iter().any(|inner| {
            let inner: &(dyn StdError + 'static) = inner.as_ref();
            matches_chain(inner, err)
                || inner
                    .downcast_ref::<AppError>()
                    .is_some_and(|nested| nested.contains(err))
        })
    }

    /// JSON envelope for the wire.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code.to_string(),
            message: self.message.clone(),
            inner_errors: self
                .inner_errors
                .iter()
                .map(|inner| match inner.downcast_ref::<AppError>() {
                    Some(app) => app.to_envelope(),
                    None => ErrorEnvelope {
                        code: ErrorCode::GeneralFailure.to_string(),
                        message: inner.to_string(),
                        inner_errors: Vec::new(),
                    },
                })
                .collect(),
        }
    }
}

/// Collect the present errors, dropping every `None`.
pub fn cleanup_inner_errors<I, E>(errors: I) -> Vec<InnerError>
where
    I: IntoIterator<Item = Option<E>>,
    E: Into<BoxError>,
{
    errors
        .into_iter()
        .flatten()
        .map(|e| InnerError::from(e.into()))
        .collect()
}

fn matches_chain(candidate: &(dyn StdError + 'static), err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if std::ptr::addr_eq(candidate, e) || candidate.to_string() == e.to_string() {
            return true;
        }
        current = e.source();
    }
    false
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.code, self.message)
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner_errors
            .first()
            .map(|inner| inner.as_ref() as &(dyn StdError + 'static))
    }
}

impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.to_envelope() == other.to_envelope()
    }
}

/// Wire shape of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerErrors", default, skip_serializing_if = "Vec::is_empty")]
    pub inner_errors: Vec<ErrorEnvelope>,
}

impl From<ErrorEnvelope> for AppError {
    fn from(envelope: ErrorEnvelope) -> Self {
        let code = envelope.code.parse().unwrap_or(ErrorCode::GeneralFailure);
        AppError::new(code, envelope.message).wrap(
            envelope
                .inner_errors
                .into_iter()
                .map(|inner| Some(AppError::from(inner))),
        )
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ErrorEnvelope::deserialize(deserializer).map(AppError::from)
    }
}
