//! The request as handlers see it.

use axum::body::Bytes;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::error::ServiceError;
use crate::routing::PathParams;

/// Everything a handler may read about one request.
///
/// Built once by the dispatcher and never mutated afterwards. Path
/// parameters (including the caller's identity on protected routes) are
/// attached with [`RequestContext::with_params`], which returns a new value.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub params: PathParams,
}

impl RequestContext {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Option<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            headers,
            body,
            params: PathParams::new(),
        }
    }

    pub fn with_params(self, params: PathParams) -> Self {
        Self { params, ..self }
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Integer query parameter. Absent or empty is `None`; anything else
    /// that is not an integer is rejected.
    pub fn query_int(&self, name: &str) -> Result<Option<i64>, ServiceError> {
        match self.query_param(name) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                ServiceError::validation(format!("Parameter '{}' must be an integer", name))
            }),
        }
    }

    /// Integer path parameter.
    pub fn path_id(&self, name: &str) -> Result<i64, ServiceError> {
        self.params
            .get(name)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ServiceError::validation(format!("Invalid {} parameter", name)))
    }

    /// Id of the authenticated caller.
    pub fn caller_id(&self) -> Result<i64, ServiceError> {
        self.params
            .authenticated_user_id()
            .ok_or_else(|| ServiceError::unauthorized("Authentication required"))
    }

    /// Decode the JSON body. An empty body decodes as `T::default()`.
    pub fn json<T: DeserializeOwned + Default>(&self) -> Result<T, ServiceError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&self.body)
            .map_err(|_| ServiceError::validation("Invalid JSON format"))
    }
}
