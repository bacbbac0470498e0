//! Actions: the consumer code behind an endpoint.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::error::{predefined, BoxError};
use crate::session::Session;

/// The response object of an action, or why it failed.
pub type ActionResult = Result<Option<Value>, BoxError>;

#[async_trait]
pub trait Action: Send + Sync {
    async fn invoke(&self, session: &mut Session) -> ActionResult;
}

#[async_trait]
impl<F> Action for F
where
    F: for<'s> Fn(&'s mut Session) -> BoxFuture<'s, ActionResult> + Send + Sync,
{
    async fn invoke(&self, session: &mut Session) -> ActionResult {
        (self)(session).await
    }
}

/// Pin a closure to the action signature so its lifetimes infer.
///
/// ```ignore
/// app.register_action("Echo", action_fn(|session| Box::pin(async move {
///     let mut text = String::new();
///     session.get_request_body(&mut text)?;
///     json(&text)
/// })));
/// ```
pub fn action_fn<F>(f: F) -> F
where
    F: for<'s> Fn(&'s mut Session) -> BoxFuture<'s, ActionResult> + Send + Sync,
{
    f
}

/// Serialize `value` as the action's response object.
pub fn json<T: Serialize + ?Sized>(value: &T) -> ActionResult {
    Ok(Some(serde_json::to_value(value)?))
}

/// Stands in for a routed endpoint nobody registered an action for.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotImplementedAction;

#[async_trait]
impl Action for NotImplementedAction {
    async fn invoke(&self, session: &mut Session) -> ActionResult {
        Err(predefined::action_not_implemented(session.name()).into())
    }
}
