//! Per-request pipeline.
//!
//! # Data Flow
//! ```text
//! resolved action (or resolution error)
//!     → Session::new, EndpointEnter + EndpointRequest logs
//!     → timeout(catch_unwind {
//!           pre_action → action → post_action
//!           → construct_response (interpret_success / interpret_error)
//!       })
//!     → finalize_session (panic or timeout → error response, EndpointExit)
//! ```
//!
//! # Design Decisions
//! - Exactly one response and one exit entry per request, panics and timeouts included
//! - A failing stage short-circuits the ones after it
//! - A post-action error replaces the action's successful result
//! - The panic trace is captured by a panic hook, before the stack unwinds

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::response::Response;
use futures_util::FutureExt;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::Value;

use crate::app::AppState;
use crate::error::{predefined, AppError, BoxError};
use crate::http::action::Action;
use crate::logging::{LogLevel, LogType};
use crate::session::{RequestData, Session};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

thread_local! {
    static PANIC_TRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Why the pipeline ended without a response of its own.
enum Interrupted {
    Panic { payload: Box<dyn Any + Send>, trace: String },
    Timeout(Duration),
}

/// Run one request through the pipeline.
///
/// `action` is the resolved action, or the error that prevented resolving
/// one; the error path still gets a session and is logged like any other.
pub async fn dispatch(
    state: AppState,
    endpoint: &str,
    request: RequestData,
    action: Result<Arc<dyn Action>, AppError>,
) -> Response {
    install_panic_hook();
    let started = Instant::now();
    let limit = state.request_timeout();
    let mut session = Session::new(endpoint, request, state);
    log_endpoint_enter(&session);
    log_endpoint_request(&session);

    let pipeline = AssertUnwindSafe(handle_action(&mut session, action))
        .catch_unwind()
        .map(|outcome| {
            outcome.map_err(|payload| Interrupted::Panic {
                payload,
                trace: take_panic_trace(),
            })
        });
    let outcome = match tokio::time::timeout(limit, pipeline).await {
        Ok(outcome) => outcome,
        Err(_) => Err(Interrupted::Timeout(limit)),
    };
    finalize_session(&session, started, outcome)
}

async fn handle_action(session: &mut Session, action: Result<Arc<dyn Action>, AppError>) -> Response {
    let action = match action {
        Ok(action) => action,
        Err(err) => return construct_response(session, None, Some(&err)),
    };
    let customization = session.customization().clone();

    if let Err(err) = customization.pre_action(session).await {
        return construct_response(session, None, Some(&*err));
    }
    let result = match action.invoke(session).await {
        Ok(result) => result,
        Err(err) => return construct_response(session, None, Some(&*err)),
    };
    let post_error = customization.post_action(session).await.err();
    construct_response(session, result.as_ref(), post_error.as_deref())
}

fn finalize_session(session: &Session, started: Instant, outcome: Result<Response, Interrupted>) -> Response {
    let response = match outcome {
        Ok(response) => response,
        Err(Interrupted::Panic { payload, trace }) => {
            let err = panic_error(payload);
            session.log(
                LogType::APP_ROOT,
                LogLevel::Error,
                "Endpoint",
                "Panic",
                &format!("{err}\n{trace}"),
            );
            construct_response(session, None, Some(&*err))
        }
        Err(Interrupted::Timeout(limit)) => {
            let err = predefined::endpoint_timeout(limit);
            construct_response(session, None, Some(&err))
        }
    };
    log_endpoint_exit(session, started);
    response
}

/// Chain a hook that keeps the panicking thread's backtrace for
/// [`take_panic_trace`].
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture();
            let _ = PANIC_TRACE.try_with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// The trace recorded at the last panic on this thread.
///
/// Falls back to the current stack when another hook replaced ours.
fn take_panic_trace() -> String {
    PANIC_TRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(Backtrace::force_capture)
        .to_string()
}

/// Turn a panic payload into the error answered to the client.
fn panic_error(payload: Box<dyn Any + Send>) -> BoxError {
    let payload = match payload.downcast::<AppError>() {
        Ok(err) => return err,
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    Box::new(predefined::endpoint_panic(&message))
}

/// Pick status and body through the handler hooks and log the result.
pub fn construct_response(
    session: &Session,
    result: Option<&Value>,
    error: Option<&(dyn StdError + Send + Sync + 'static)>,
) -> Response {
    let customization = session.customization();
    let (status, body) = match error {
        Some(err) => customization.interpret_error(err),
        None => customization.interpret_success(result),
    };
    session.log(
        LogType::ENDPOINT_RESPONSE,
        LogLevel::Info,
        "Response",
        status.as_str(),
        &body,
    );
    json_response(status, body)
}

fn json_response(status: StatusCode, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}

fn log_endpoint_enter(session: &Session) {
    session.log(LogType::ENDPOINT_ENTER, LogLevel::Info, "Endpoint", session.name(), "");
}

fn log_endpoint_request(session: &Session) {
    let request = session.request();
    session.log(
        LogType::ENDPOINT_REQUEST,
        LogLevel::Info,
        "Request",
        request.method.as_str(),
        &format!("{} {}", request.uri, String::from_utf8_lossy(&request.body)),
    );
}

fn log_endpoint_exit(session: &Session, started: Instant) {
    session.log(
        LogType::ENDPOINT_EXIT,
        LogLevel::Info,
        "Endpoint",
        session.name(),
        &format!("{:?}", started.elapsed()),
    );
}
