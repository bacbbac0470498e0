//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, address parses)
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::http::server::method_filter;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("route '{endpoint}' has invalid method '{method}'")]
    RouteMethod { endpoint: String, method: String },

    #[error("route '{endpoint}' path '{path}' must start with '/'")]
    RoutePath { endpoint: String, path: String },

    #[error("endpoint '{0}' is declared more than once")]
    DuplicateEndpoint(String),

    #[error("route {method} {path} is declared more than once")]
    DuplicateRoute { method: String, path: String },

    #[error("client certificate {field} is empty")]
    ClientCert { field: &'static str },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "server.request_timeout_secs" });
    }
    if config.server.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "server.max_body_size" });
    }
    if config.webcall.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "webcall.timeout_secs" });
    }
    if let Some(cert) = &config.webcall.client_cert {
        if cert.cert_path.trim().is_empty() {
            errors.push(ValidationError::ClientCert { field: "cert_path" });
        }
        if cert.key_path.trim().is_empty() {
            errors.push(ValidationError::ClientCert { field: "key_path" });
        }
    }

    let mut endpoints = HashSet::new();
    let mut routes = HashSet::new();
    for route in &config.routes {
        if method_filter(&route.method).is_none() {
            errors.push(ValidationError::RouteMethod {
                endpoint: route.endpoint.clone(),
                method: route.method.clone(),
            });
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RoutePath {
                endpoint: route.endpoint.clone(),
                path: route.path.clone(),
            });
        }
        if !endpoints.insert(route.endpoint.as_str()) {
            errors.push(ValidationError::DuplicateEndpoint(route.endpoint.clone()));
        }
        let method = route.method.to_ascii_uppercase();
        if !routes.insert((method.clone(), route.path.as_str())) {
            errors.push(ValidationError::DuplicateRoute {
                method,
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
