//! HTTP server layer for the coffee API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     axum fallback -> RouteTable -> token gate -> handler        │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │ middleware  │  │        routes           │  │
//! │  │ (use cases) │  │  (bearer)   │  │ (table, dispatch, CORS) │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use context::RequestContext;
pub use handlers::AppState;
pub use middleware::authenticate;
pub use response::{ApiResponse, ErrorResponse, SuccessBody};
pub use routes::{
    build_route_table, create_router, dispatch, Handler, HandlerFuture, RouterConfig,
    DEFAULT_BODY_LIMIT,
};
