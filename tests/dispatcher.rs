//! End-to-end request pipeline through the Axum router.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use http::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json as json_value, Value};
use tower::ServiceExt;

use common::RecordingCustomization;
use rest_pipeline::customization::{BootstrapHooks, HandlerHooks, HostingHooks, LoggingHook, WebcallHooks};
use rest_pipeline::logging::LogEntry;
use rest_pipeline::{
    action_fn, json, Action, ActionResult, AppConfig, AppError, Application, BoxError, ErrorCode, LogLevel,
    LogType, Session,
};

#[derive(Debug, Serialize, Deserialize)]
struct Order {
    id: u32,
    item: String,
}

struct GetOrder;

#[async_trait]
impl Action for GetOrder {
    async fn invoke(&self, session: &mut Session) -> ActionResult {
        let mut id = 0u32;
        session.get_request_parameter("id", &mut id)?;
        let mut item = String::from("unknown");
        if session.get_request_query("item", &mut item).is_err() {
            item = "default".into();
        }
        json(&Order { id, item })
    }
}

struct CreateOrder;

#[async_trait]
impl Action for CreateOrder {
    async fn invoke(&self, session: &mut Session) -> ActionResult {
        let mut order = Order { id: 0, item: String::new() };
        session.get_request_body(&mut order)?;
        let mut caller = String::new();
        session.get_attachment("caller", &mut caller);
        json(&json_value!({ "created": order.id, "by": caller }))
    }
}

struct Boom;

#[async_trait]
impl Action for Boom {
    async fn invoke(&self, _session: &mut Session) -> ActionResult {
        panic!("boom");
    }
}

struct Slow;

#[async_trait]
impl Action for Slow {
    async fn invoke(&self, _session: &mut Session) -> ActionResult {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
}

/// Hooks keyed off request headers, counting action invocations.
#[derive(Clone, Default)]
struct GatedCustomization {
    recorder: RecordingCustomization,
    invoked: Arc<AtomicUsize>,
}

impl LoggingHook for GatedCustomization {
    fn log(&self, entry: &LogEntry<'_>) {
        self.recorder.log(entry);
    }
}

#[async_trait]
impl HandlerHooks for GatedCustomization {
    async fn pre_action(&self, session: &mut Session) -> Result<(), BoxError> {
        if !session.get_request_header_values("x-deny").is_empty() {
            return Err(AppError::new(ErrorCode::AccessForbidden, "denied").into());
        }
        session.attach("caller", "ana".to_string());
        self.invoked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn post_action(&self, session: &mut Session) -> Result<(), BoxError> {
        if !session.get_request_header_values("x-fail-post").is_empty() {
            return Err(AppError::new(ErrorCode::DataCorruption, "audit failed").into());
        }
        Ok(())
    }
}

impl BootstrapHooks for GatedCustomization {}
impl HostingHooks for GatedCustomization {}
impl WebcallHooks for GatedCustomization {}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.logging.allowed_log_type = LogType::GENERAL_LOGGING;
    config.logging.allowed_log_level = LogLevel::Info;
    config
}

fn app_with<C: rest_pipeline::Customization>(customization: C) -> Application {
    let mut app = Application::new(config(), customization).unwrap();
    app.register_action("GetOrder", GetOrder)
        .register_action("CreateOrder", CreateOrder)
        .register_action(
            "Empty",
            action_fn(|_session| Box::pin(async move { Ok(None) })),
        )
        .register_action("Boom", Boom)
        .add_route("GetOrder", "GET", "/orders/{id}")
        .add_route("CreateOrder", "POST", "/orders")
        .add_route("Empty", "GET", "/empty")
        .add_route("Boom", "GET", "/boom")
        .add_route("CancelOrder", "DELETE", "/orders/{id}");
    app
}

async fn send(app: &Application, request: Request<Body>) -> (StatusCode, String, String) {
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn path_and_query_reach_the_action() {
    let app = app_with(RecordingCustomization::default());
    let (status, content_type, body) = send(&app, get("/orders/42?item=lamp")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json; charset=utf-8");
    assert_eq!(body, r#"{"id":42,"item":"lamp"}"#);
}

#[tokio::test]
async fn invalid_parameter_is_bad_request() {
    let app = app_with(RecordingCustomization::default());
    let (status, _, body) = send(&app, get("/orders/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["code"], "BadRequest");
    assert_eq!(envelope["message"], "The request parameter [id] is invalid");
    assert_eq!(envelope["innerErrors"][0]["code"], "GeneralFailure");
}

#[tokio::test]
async fn absent_result_is_no_content() {
    let app = app_with(RecordingCustomization::default());
    let (status, _, body) = send(&app, get("/empty")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, "");
}

#[tokio::test]
async fn unknown_route_and_method_are_not_found() {
    let recorder = RecordingCustomization::default();
    let app = app_with(recorder.clone());

    let (status, _, body) = send(&app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["message"], "No route is registered for [GET /nowhere]");

    let put = Request::builder()
        .method("PUT")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, put).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(recorder.of_type(LogType::ENDPOINT_EXIT).len(), 2);
}

#[tokio::test]
async fn routed_endpoint_without_action_is_not_implemented() {
    let app = app_with(RecordingCustomization::default());
    let delete = Request::builder()
        .method("DELETE")
        .uri("/orders/1")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(body.contains("CancelOrder"));
}

#[tokio::test]
async fn panicking_action_is_contained() {
    let recorder = RecordingCustomization::default();
    let app = app_with(recorder.clone());

    let (status, _, body) = send(&app, get("/boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"code":"GeneralFailure","message":"Endpoint panic: boom"}"#);

    let errors: Vec<_> = recorder
        .entries()
        .into_iter()
        .filter(|entry| entry.log_level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].description.contains("Endpoint panic: boom"));
    assert_eq!(recorder.of_type(LogType::ENDPOINT_EXIT).len(), 1);

    // The application keeps serving.
    let (status, _, _) = send(&app, get("/empty")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn every_request_logs_enter_and_exit_once() {
    let recorder = RecordingCustomization::default();
    let app = app_with(recorder.clone());
    send(&app, get("/orders/1")).await;

    let entries = recorder.entries();
    let endpoint_entries: Vec<LogType> = entries
        .iter()
        .filter(|entry| entry.session_name == "GetOrder")
        .map(|entry| entry.log_type)
        .filter(|log_type| *log_type != LogType::METHOD_LOGIC)
        .collect();
    assert_eq!(
        endpoint_entries,
        vec![
            LogType::ENDPOINT_ENTER,
            LogType::ENDPOINT_REQUEST,
            LogType::ENDPOINT_RESPONSE,
            LogType::ENDPOINT_EXIT,
        ]
    );
}

#[tokio::test]
async fn pre_action_error_skips_the_action() {
    let customization = GatedCustomization::default();
    let invoked = customization.invoked.clone();
    let app = app_with(customization);

    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("x-deny", "1")
        .body(Body::from(r#"{"id":5,"item":"desk"}"#))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"code":"AccessForbidden","message":"denied"}"#);
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pre_action_attachment_reaches_the_action() {
    let app = app_with(GatedCustomization::default());
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .body(Body::from(r#"{"id":5,"item":"desk"}"#))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"by":"ana","created":5}"#);
}

#[tokio::test]
async fn post_action_error_overrides_result() {
    let app = app_with(GatedCustomization::default());
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("x-fail-post", "1")
        .body(Body::from(r#"{"id":5,"item":"desk"}"#))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"code":"DataCorruption","message":"audit failed"}"#);
}

#[tokio::test]
async fn missing_body_is_bad_request() {
    let app = app_with(RecordingCustomization::default());
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("The request body is not found"));
}

#[tokio::test(start_paused = true)]
async fn slow_action_gets_a_composed_timeout_response() {
    let recorder = RecordingCustomization::default();
    let mut config = config();
    config.server.request_timeout_secs = 1;
    let mut app = Application::new(config, recorder.clone()).unwrap();
    app.register_action("Slow", Slow).add_route("Slow", "GET", "/slow");

    let (status, content_type, body) = send(&app, get("/slow")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type, "application/json; charset=utf-8");
    assert_eq!(
        body,
        r#"{"code":"GeneralFailure","message":"Endpoint timeout: no response within 1s"}"#
    );
    assert_eq!(recorder.of_type(LogType::ENDPOINT_RESPONSE).len(), 1);
    assert_eq!(recorder.of_type(LogType::ENDPOINT_EXIT).len(), 1);
}
