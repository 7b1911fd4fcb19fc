//! Router configuration for the coffee API.
//!
//! Routing is done by our own [`RouteTable`], not by axum's router: every
//! request lands in a single fallback handler which matches the table,
//! runs the token gate for protected routes and calls the handler.
//!
//! # Route Structure
//!
//! ```text
//! POST   /users/                        - Register (public)
//! POST   /login                         - Login (public)
//! GET    /users/                        - List users (protected)
//! GET    /users/:iduser                 - Get user (protected)
//! PUT    /users/:iduser                 - Update own account (protected)
//! DELETE /users/:iduser                 - Delete own account (protected)
//! POST   /users/:iduser/drink           - Record a drink (protected)
//! GET    /users/:iduser/drinks/daily    - Daily history (protected)
//! GET    /drinks/ranking                - Ranking (protected)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use coffee_api::auth::TokenService;
//! use coffee_api::server::{create_router, AppState, RouterConfig};
//! use coffee_api::store::Database;
//!
//! let state = AppState::new(Database::open(), TokenService::new("my-secret-key"));
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(state, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::context::RequestContext;
use super::handlers::{self, AppState};
use super::middleware::authenticate;
use super::response::ApiResponse;
use crate::error::ServiceError;
use crate::routing::RouteTable;

/// Default cap on request body size.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Handler Type
// =============================================================================

/// Boxed future returned by every handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ApiResponse, ServiceError>> + Send>>;

/// A route's handler: a plain function pointer, so the table is `Copy`-cheap
/// to consult and trivially shareable.
pub type Handler = fn(AppState, RequestContext) -> HandlerFuture;

/// Turn an `async fn(AppState, RequestContext)` into a [`Handler`].
macro_rules! handler {
    ($f:path) => {{
        fn boxed(state: AppState, ctx: RequestContext) -> HandlerFuture {
            Box::pin($f(state, ctx))
        }
        boxed as Handler
    }};
}

/// The application's routes, in match order.
pub fn build_route_table() -> RouteTable<Handler> {
    RouteTable::new()
        .route(Method::POST, "/users/", handler!(handlers::create_user))
        .route(Method::POST, "/login", handler!(handlers::login))
        .protected(Method::GET, "/users/", handler!(handlers::list_users))
        .protected(Method::GET, "/users/:iduser", handler!(handlers::get_user))
        .protected(Method::PUT, "/users/:iduser", handler!(handlers::update_user))
        .protected(Method::DELETE, "/users/:iduser", handler!(handlers::delete_user))
        .protected(
            Method::POST,
            "/users/:iduser/drink",
            handler!(handlers::increment_drink),
        )
        .protected(
            Method::GET,
            "/users/:iduser/drinks/daily",
            handler!(handlers::daily_drinks),
        )
        .protected(Method::GET, "/drinks/ranking", handler!(handlers::drink_ranking))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Match the request, gate protected routes and run the handler.
///
/// The handler is never called when authentication fails.
pub async fn dispatch(
    state: AppState,
    routes: &RouteTable<Handler>,
    ctx: RequestContext,
) -> Result<ApiResponse, ServiceError> {
    let matched = routes.match_route(&ctx.method, &ctx.path)?;
    let handler = matched.route.handler;

    let params = if matched.route.auth_required {
        authenticate(&ctx, matched.params, &state.tokens)?
    } else {
        matched.params
    };

    handler(state, ctx.with_params(params)).await
}

#[derive(Clone)]
struct Dispatcher {
    app: AppState,
    routes: Arc<RouteTable<Handler>>,
    body_limit: usize,
}

async fn dispatch_handler(State(dispatcher): State<Dispatcher>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, dispatcher.body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(error = %err, "Failed to read request body");
            return ServiceError::validation("Request body is too large or unreadable")
                .into_response();
        }
    };

    let ctx = RequestContext::new(
        parts.method,
        parts.uri.path(),
        parts.uri.query().map(str::to_string),
        parts.headers,
        body,
    );

    match dispatch(dispatcher.app, &dispatcher.routes, ctx).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes
    pub body_limit: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cors_origins: None,
            body_limit: DEFAULT_BODY_LIMIT,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// By default CORS allows any origin, bodies are capped at 64 KiB and
    /// tracing is enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// All requests go through the dispatcher; CORS preflight is answered by
/// the CORS layer before dispatch.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let dispatcher = Dispatcher {
        app: state,
        routes: Arc::new(build_route_table()),
        body_limit: config.body_limit,
    };

    let router = Router::new()
        .fallback(dispatch_handler)
        .with_state(dispatcher)
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        // No origins allowed
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
