//! Dual-budget retry loop.
//!
//! Connectivity failures and retryable HTTP statuses draw from separate
//! budgets. The loop sleeps after every consumed unit, including the last one.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Anything that carries an HTTP status code.
pub trait HasStatus {
    fn status_code(&self) -> u16;
}

impl HasStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Run `attempt` until it yields an outcome no budget covers.
///
/// `conn_retry` counts extra attempts after errors; `http_retry` maps a
/// status code to extra attempts after responses carrying it.
pub async fn do_with_retry<R, E, F, Fut>(
    mut attempt: F,
    mut conn_retry: u32,
    http_retry: &HashMap<u16, u32>,
    delay: Duration,
) -> Result<R, E>
where
    R: HasStatus,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let mut http_retry = http_retry.clone();
    loop {
        let outcome = attempt().await;
        let retry = match &outcome {
            Err(_) => {
                if conn_retry > 0 {
                    conn_retry -= 1;
                    true
                } else {
                    false
                }
            }
            Ok(response) => match http_retry.get_mut(&response.status_code()) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            },
        };
        if !retry {
            return outcome;
        }
        tokio::time::sleep(delay).await;
    }
}
