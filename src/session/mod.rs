//! Per-request session.
//!
//! # Responsibilities
//! - Typed accessors over the buffered request (body, path, query, header)
//! - Named attachments shared between hooks and actions
//! - Taxonomy logging filtered by the application's `LogFilter`
//! - Entry point for outbound webcalls bound to this request
//!
//! # Design Decisions
//! - A session lives inside one request task; no interior locking
//! - Accessor failures are `AppError`s with `BadRequest` codes
//! - Method logging is categorized by the caller's qualified function name,
//!   resolved by the `log_method_*!` macros

pub mod convert;
mod macros;
pub mod request;

pub use convert::{unmarshal_into, ConversionError};
pub use request::RequestData;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::customization::Customization;
use crate::error::{predefined, AppError};
use crate::logging::{LogEntry, LogLevel, LogType};
use crate::webcall::WebRequest;

/// Name of the process-wide session used outside of requests.
pub const APP_ROOT_SESSION_NAME: &str = "AppRoot";

struct Attachment {
    raw: Box<dyn Any + Send + Sync>,
    snapshot: Option<Value>,
}

/// State of one inbound request as seen by hooks and actions.
pub struct Session {
    id: Uuid,
    name: String,
    request: RequestData,
    attachments: Option<HashMap<String, Attachment>>,
    state: AppState,
}

impl Session {
    pub fn new(name: impl Into<String>, request: RequestData, state: AppState) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            request,
            attachments: None,
            state,
        }
    }

    /// The session used for bootstrap and shutdown logging.
    pub fn root(state: AppState) -> Self {
        Self::new(APP_ROOT_SESSION_NAME, RequestData::default(), state)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request(&self) -> &RequestData {
        &self.request
    }

    pub fn customization(&self) -> &Arc<dyn Customization> {
        &self.state.customization
    }

    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    // ---- request accessors ----

    pub fn get_request_body<T>(&self, target: &mut T) -> Result<(), AppError>
    where
        T: DeserializeOwned + 'static,
    {
        if self.request.body.is_empty() {
            return Err(predefined::body_not_found());
        }
        let raw = String::from_utf8_lossy(&self.request.body);
        self.log_method_logic_at("Request", "Body", LogLevel::Info, &raw);
        unmarshal_into(&raw, target).map_err(predefined::body_invalid)
    }

    pub fn get_request_parameter<T>(&self, name: &str, target: &mut T) -> Result<(), AppError>
    where
        T: DeserializeOwned + 'static,
    {
        let raw = self
            .request
            .path_params
            .get(name)
            .ok_or_else(|| predefined::parameter_not_found(name))?;
        self.log_method_logic_at("Request", name, LogLevel::Info, raw);
        unmarshal_into(raw, target).map_err(|e| predefined::parameter_invalid(name, e))
    }

    /// Reads the first value of query key `name`.
    pub fn get_request_query<T>(&self, name: &str, target: &mut T) -> Result<(), AppError>
    where
        T: DeserializeOwned + 'static,
    {
        let raw = self
            .request
            .query
            .get(name)
            .and_then(|values| values.first())
            .ok_or_else(|| predefined::query_not_found(name))?;
        self.log_method_logic_at("Query", name, LogLevel::Info, raw);
        unmarshal_into(raw, target).map_err(|e| predefined::query_invalid(name, e))
    }

    pub fn get_request_query_values(&self, name: &str) -> Vec<String> {
        self.request.query.get(name).cloned().unwrap_or_default()
    }

    /// Reads the first value of header `name`.
    pub fn get_request_header<T>(&self, name: &str, target: &mut T) -> Result<(), AppError>
    where
        T: DeserializeOwned + 'static,
    {
        let values = self.request.header_values(name);
        let raw = values
            .first()
            .ok_or_else(|| predefined::header_not_found(name))?;
        self.log_method_logic_at("Header", name, LogLevel::Info, raw);
        unmarshal_into(raw, target).map_err(|e| predefined::header_invalid(name, e))
    }

    pub fn get_request_header_values(&self, name: &str) -> Vec<String> {
        self.request.header_values(name)
    }

    // ---- attachments ----

    /// Store `value` under `name`, replacing any previous attachment.
    ///
    /// A JSON snapshot is taken now; `get_attachment` reads it back, so fields
    /// skipped by serialization do not survive that path.
    pub fn attach<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Serialize + Any + Send + Sync,
    {
        let snapshot = serde_json::to_value(&value).ok();
        self.insert_attachment(name.into(), Box::new(value), snapshot);
    }

    /// Store a value that is only ever read back through `get_raw_attachment`.
    pub fn attach_raw<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.insert_attachment(name.into(), Box::new(value), None);
    }

    fn insert_attachment(&mut self, name: String, raw: Box<dyn Any + Send + Sync>, snapshot: Option<Value>) {
        self.attachments
            .get_or_insert_with(HashMap::new)
            .insert(name, Attachment { raw, snapshot });
    }

    /// Returns whether an attachment was removed.
    pub fn detach(&mut self, name: &str) -> bool {
        self.attachments
            .as_mut()
            .is_some_and(|attachments| attachments.remove(name).is_some())
    }

    pub fn get_raw_attachment<T: Any>(&self, name: &str) -> Option<&T> {
        self.attachments
            .as_ref()?
            .get(name)?
            .raw
            .downcast_ref::<T>()
    }

    /// Fill `target` from the attachment's snapshot; `false` when absent or
    /// when the snapshot does not fit `T`.
    pub fn get_attachment<T: DeserializeOwned>(&self, name: &str, target: &mut T) -> bool {
        let Some(snapshot) = self
            .attachments
            .as_ref()
            .and_then(|attachments| attachments.get(name))
            .and_then(|attachment| attachment.snapshot.as_ref())
        else {
            return false;
        };
        match T::deserialize(snapshot) {
            Ok(value) => {
                *target = value;
                true
            }
            Err(_) => false,
        }
    }

    // ---- logging ----

    pub fn is_logging_allowed(&self, log_type: LogType, log_level: LogLevel) -> bool {
        self.state.log_filter.allows(log_type, log_level)
    }

    /// Forward one entry to the logging hook when the filter allows it.
    pub fn log(
        &self,
        log_type: LogType,
        log_level: LogLevel,
        category: &str,
        subcategory: &str,
        description: &str,
    ) {
        if !self.is_logging_allowed(log_type, log_level) {
            return;
        }
        self.state.customization.log(&LogEntry {
            session_id: self.id,
            session_name: &self.name,
            log_type,
            log_level,
            category,
            subcategory,
            description,
        });
    }

    pub fn log_app_root(&self, log_level: LogLevel, category: &str, subcategory: &str, description: &str) {
        self.log(LogType::APP_ROOT, log_level, category, subcategory, description);
    }

    /// `caller` is the qualified function name; see [`log_method_enter!`](crate::log_method_enter).
    pub fn log_method_enter(&self, caller: &str) {
        self.log(LogType::METHOD_ENTER, LogLevel::Info, caller, "", "");
    }

    /// One entry per parameter, subcategorized by position.
    pub fn log_method_parameter(&self, caller: &str, parameters: &[&dyn fmt::Debug]) {
        self.log_indexed(LogType::METHOD_PARAMETER, caller, parameters);
    }

    pub fn log_method_logic(&self, log_level: LogLevel, category: &str, subcategory: &str, description: &str) {
        self.log(LogType::METHOD_LOGIC, log_level, category, subcategory, description);
    }

    pub fn log_method_return(&self, caller: &str, returns: &[&dyn fmt::Debug]) {
        self.log_indexed(LogType::METHOD_RETURN, caller, returns);
    }

    pub fn log_method_exit(&self, caller: &str) {
        self.log(LogType::METHOD_EXIT, LogLevel::Info, caller, "", "");
    }

    fn log_indexed(&self, log_type: LogType, caller: &str, values: &[&dyn fmt::Debug]) {
        if !self.is_logging_allowed(log_type, LogLevel::Info) {
            return;
        }
        for (index, value) in values.iter().enumerate() {
            self.log(
                log_type,
                LogLevel::Info,
                caller,
                &index.to_string(),
                &format!("{value:?}"),
            );
        }
    }

    fn log_method_logic_at(&self, category: &str, subcategory: &str, log_level: LogLevel, description: &str) {
        self.log(LogType::METHOD_LOGIC, log_level, category, subcategory, description);
    }

    // ---- webcalls ----

    /// A fresh outbound request bound to this session, with no retry policy.
    pub fn create_webcall_request(
        &self,
        method: Method,
        url: impl Into<String>,
        payload: impl Into<String>,
        send_client_cert: bool,
    ) -> WebRequest<'_> {
        WebRequest::new(self, method, url.into(), payload.into(), send_client_cert)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("method", &self.request.method)
            .field("uri", &self.request.uri)
            .finish_non_exhaustive()
    }
}
