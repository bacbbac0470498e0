//! Buffered view of one inbound request.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// Everything a session reads from the inbound request.
///
/// The body is fully buffered before the session exists; query pairs are
/// decoded once at construction.
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub path_params: HashMap<String, String>,
    pub query: HashMap<String, Vec<String>>,
    pub body: Bytes,
}

impl RequestData {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        path_params: HashMap<String, String>,
        body: Bytes,
    ) -> Self {
        let query = parse_query(uri.query().unwrap_or_default());
        Self {
            method,
            uri,
            headers,
            path_params,
            query,
            body,
        }
    }

    /// Header values for `name` that are valid UTF-8, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

fn parse_query(query: &str) -> HashMap<String, Vec<String>> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        values.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    values
}
