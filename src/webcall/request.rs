//! Outbound request builder and execution.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use reqwest::ResponseBuilderExt;
use url::Url;

use crate::error::{predefined, AppError};
use crate::logging::{LogLevel, LogType};
use crate::session::Session;
use crate::webcall::receiver::{get_data_template, DataReceiver, DataTemplate, StatusCodeRange};
use crate::webcall::retry::do_with_retry;

/// One outbound call bound to a session.
///
/// Built with the chained methods below, then consumed by [`WebRequest::process`]
/// or [`WebRequest::process_raw`].
pub struct WebRequest<'a> {
    session: &'a Session,
    method: Method,
    url: String,
    payload: String,
    query: BTreeMap<String, Vec<String>>,
    header: BTreeMap<String, Vec<String>>,
    conn_retry: u32,
    http_retry: HashMap<u16, u32>,
    send_client_cert: bool,
    retry_delay: Duration,
    data_receivers: Vec<DataReceiver<'a>>,
}

impl<'a> WebRequest<'a> {
    pub(crate) fn new(
        session: &'a Session,
        method: Method,
        url: String,
        payload: String,
        send_client_cert: bool,
    ) -> Self {
        Self {
            session,
            method,
            url,
            payload,
            query: BTreeMap::new(),
            header: BTreeMap::new(),
            conn_retry: 0,
            http_retry: HashMap::new(),
            send_client_cert,
            retry_delay: Duration::ZERO,
            data_receivers: Vec::new(),
        }
    }

    pub fn add_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Retry without delay.
    pub fn enable_retry(self, conn_retry: u32, http_retry: HashMap<u16, u32>) -> Self {
        self.setup_retry(conn_retry, http_retry, Duration::ZERO)
    }

    pub fn setup_retry(mut self, conn_retry: u32, http_retry: HashMap<u16, u32>, delay: Duration) -> Self {
        self.conn_retry = conn_retry;
        self.http_retry = http_retry;
        self.retry_delay = delay;
        self
    }

    /// Parse the body into `template` when the status falls into one of
    /// `codes`; no codes means any status.
    pub fn anticipate<T>(mut self, template: &'a mut T, codes: &[StatusCodeRange]) -> Self
    where
        T: DataTemplate,
    {
        self.data_receivers.push(DataReceiver::new(template, codes.to_vec()));
        self
    }

    /// Send the request and parse the body into the matching template.
    ///
    /// A transport failure yields `500`, an empty header map and the error.
    pub async fn process(mut self) -> (StatusCode, HeaderMap, Result<(), AppError>) {
        let started = Instant::now();
        let session = self.session;
        self.log_start();

        let response = match self.send().await {
            Ok(response) => response,
            Err(err) => {
                self.log_finish(started, &format!("Error: {err}"));
                return (StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Err(err));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let result = match get_data_template(session, status.as_u16(), &mut self.data_receivers) {
            Some(receiver) => match response.text().await {
                Ok(body) => receiver.template.fill(&body).map_err(predefined::response_invalid),
                Err(e) => Err(predefined::response_invalid(e)),
            },
            None => Ok(()),
        };

        self.log_finish(started, status.as_str());
        (status, headers, result)
    }

    /// Send the request and hand back the response with its body still readable.
    pub async fn process_raw(self) -> Result<reqwest::Response, AppError> {
        let started = Instant::now();
        self.log_start();
        let outcome = self.send().await;
        match &outcome {
            Ok(response) => self.log_finish(started, response.status().as_str()),
            Err(err) => self.log_finish(started, &format!("Error: {err}")),
        }
        outcome
    }

    async fn send(&self) -> Result<reqwest::Response, AppError> {
        let request = self.create_http_request()?;
        if request.try_clone().is_none() {
            return Err(predefined::webcall_not_replayable());
        }
        let client = self.session.state().clients.select(self.session, self.send_client_cert);

        let outcome = do_with_retry(
            || {
                let next = request.try_clone();
                async move {
                    match next {
                        Some(next) => client.execute(next).await.map_err(predefined::webcall_transport_failure),
                        None => Err(predefined::webcall_not_replayable()),
                    }
                }
            },
            self.conn_retry,
            &self.http_retry,
            self.retry_delay,
        )
        .await;

        match outcome {
            Ok(response) => self.log_success_response(response).await,
            Err(err) => {
                self.log_error_response(&err);
                Err(err)
            }
        }
    }

    fn create_http_request(&self) -> Result<reqwest::Request, AppError> {
        let mut url = Url::parse(&self.url).map_err(predefined::webcall_request_invalid)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, values) in &self.query {
                for value in values {
                    pairs.append_pair(name, value);
                }
            }
        }
        self.log_request("URL", url.as_str());
        self.log_request("Payload", &self.payload);

        let mut request = reqwest::Request::new(self.method.clone(), url);
        if !self.payload.is_empty() {
            *request.body_mut() = Some(self.payload.clone().into());
        }
        for (name, values) in &self.header {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(predefined::webcall_request_invalid)?;
            for value in values {
                let value = HeaderValue::from_str(value).map_err(predefined::webcall_request_invalid)?;
                request.headers_mut().append(name.clone(), value);
            }
        }
        self.log_request("Header", &format!("{:?}", request.headers()));

        Ok(self.session.customization().wrap_request(self.session, request))
    }

    /// Buffer and log the body, then rebuild the response around the buffer.
    async fn log_success_response(&self, response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body: Bytes = response.bytes().await.map_err(predefined::response_invalid)?;

        self.log_response(LogLevel::Info, "Status", status.as_str());
        self.log_response(LogLevel::Info, "Header", &format!("{headers:?}"));
        self.log_response(LogLevel::Info, "Body", &String::from_utf8_lossy(&body));

        let mut replay = http::Response::builder()
            .status(status)
            .version(version)
            .url(url)
            .body(body)
            .map_err(predefined::response_invalid)?;
        *replay.headers_mut() = headers;
        Ok(reqwest::Response::from(replay))
    }

    fn log_error_response(&self, err: &AppError) {
        self.log_response(LogLevel::Warn, "Error", &err.to_string());
    }

    fn log_request(&self, subcategory: &str, description: &str) {
        self.session
            .log(LogType::WEBCALL_REQUEST, LogLevel::Info, "Request", subcategory, description);
    }

    fn log_response(&self, log_level: LogLevel, subcategory: &str, description: &str) {
        self.session
            .log(LogType::WEBCALL_RESPONSE, log_level, "Response", subcategory, description);
    }

    fn log_start(&self) {
        self.session.log(
            LogType::WEBCALL_START,
            LogLevel::Info,
            self.method.as_str(),
            &self.url,
            "",
        );
    }

    fn log_finish(&self, started: Instant, outcome: &str) {
        self.session.log(
            LogType::WEBCALL_FINISH,
            LogLevel::Info,
            self.method.as_str(),
            &self.url,
            &format!("{outcome} in {:?}", started.elapsed()),
        );
    }
}
