//! Ordered route table.
//!
//! Routes are registered once at startup and matched first-hit in
//! registration order. When two patterns can match the same path (a
//! literal sibling next to a placeholder with the same shape), register
//! the literal first.

use http::Method;
use thiserror::Error;
use tracing::trace;

use super::pattern::{extract_params, normalize_path, PathParams, RoutePattern};

/// A single registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: H,
    pub auth_required: bool,
}

/// Result of a successful match.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub route: &'a Route<H>,
    pub params: PathParams,
}

/// Routing failure.
///
/// A path that matches a pattern under a different method is reported the
/// same way as a path that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Route not found: {method} {path}")]
    NotFound { method: Method, path: String },
}

/// Immutable, ordered collection of routes.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route that needs no authentication.
    pub fn route(self, method: Method, pattern: &str, handler: H) -> Self {
        self.add(method, pattern, handler, false)
    }

    /// Register a route gated by authentication.
    pub fn protected(self, method: Method, pattern: &str, handler: H) -> Self {
        self.add(method, pattern, handler, true)
    }

    fn add(mut self, method: Method, pattern: &str, handler: H, auth_required: bool) -> Self {
        self.routes.push(Route {
            method,
            pattern: RoutePattern::parse(pattern),
            handler,
            auth_required,
        });
        self
    }

    /// Find the first route whose method and pattern match.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<RouteMatch<'_, H>, RouteError> {
        let path = normalize_path(path);

        for route in &self.routes {
            if route.method != *method {
                continue;
            }
            if let Some(params) = extract_params(&route.pattern, path) {
                trace!(method = %method, path, pattern = route.pattern.as_str(), "Route matched");
                return Ok(RouteMatch { route, params });
            }
        }

        Err(RouteError::NotFound {
            method: method.clone(),
            path: path.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
