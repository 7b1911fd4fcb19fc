//! # Coffee API
//!
//! A small authenticated HTTP service that counts drinks per user.
//!
//! Callers register, log in to obtain an HMAC-signed session token, and
//! then record drinks, read their per-day history and see a ranking of
//! users by consumption.
//!
//! ## Architecture
//!
//! - [`auth`] - Session tokens (HS256) and password hashing (Argon2id)
//! - [`routing`] - Pattern router with `:name` placeholders and a route table
//! - [`domain`] - User and drink records
//! - [`store`] - Storage engine with scoped sessions and transactions, and
//!   the repository traits services use
//! - [`service`] - Use cases, including the transactional drink counter
//! - [`server`] - Axum adapter: dispatcher, token gate, response envelopes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use coffee_api::{create_router, AppState, Database, RouterConfig, TokenService};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let state = AppState::new(Database::open(), TokenService::new("change-me"));
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod routing;
pub mod server;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use auth::{Claims, TokenError, TokenService};
pub use config::Config;
pub use error::{ServiceError, StoreError};
pub use routing::{PathParams, RouteError, RoutePattern, RouteTable};
pub use server::{create_router, AppState, RequestContext, RouterConfig};
pub use service::{DrinkService, UserService};
pub use store::{Database, DrinkRepository, Session, UserRepository};
