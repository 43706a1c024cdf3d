//! Outbound request description.
//!
//! # Responsibilities
//! - Describe one logical call: verb, endpoint, body, target connection
//! - Carry per-call overrides (operation class, headers, cancellation)
//!
//! # Design Decisions
//! - Options are plain values: setters consume and return a new value, so a
//!   shared options value can never change under a running call
//! - The connection override is the per-request alternative to the shared
//!   active pointer

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lifecycle::Cancellation;
use crate::routing::{classify_endpoint, instance_from_endpoint, Operation, OperationClass};

/// Header carrying the per-attempt request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Verbs the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the client needs to perform one call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
    /// Connection to use instead of the active one.
    pub connection: Option<String>,
    /// Instance the endpoint addresses; scopes 404s to `NotFound`.
    pub instance: Option<String>,
    /// Rate-limit class; derived from the endpoint when absent.
    pub operation_class: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub cancellation: Option<Cancellation>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            connection: None,
            instance: None,
            operation_class: None,
            query: Vec::new(),
            headers: Vec::new(),
            cancellation: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, endpoint).with_body(body)
    }

    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, endpoint).with_body(body)
    }

    pub fn patch(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, endpoint).with_body(body)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    /// Options for a table operation, with its verb, rendered path and class.
    pub fn for_operation(operation: Operation, instance: Option<&str>) -> Result<Self> {
        let spec = operation.spec();
        let mut options = Self::new(spec.method, spec.render(instance)?)
            .with_class(spec.class.as_str());
        if spec.is_instance_scoped() {
            options.instance = instance.map(str::to_string);
        }
        Ok(options)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.operation_class = Some(class.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Rate-limit class for this call.
    pub fn class(&self) -> String {
        match &self.operation_class {
            Some(class) => class.clone(),
            None => classify_endpoint(&self.endpoint).as_str().to_string(),
        }
    }

    /// Instance this call addresses: the explicit one, else the one a known
    /// instance-scoped endpoint names.
    pub fn instance_name(&self) -> Option<&str> {
        self.instance.as_deref().or_else(|| instance_from_endpoint(&self.endpoint))
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get("/")
    }
}
