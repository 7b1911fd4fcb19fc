//! Request routing.
//!
//! A small, framework-independent router: patterns with `:name`
//! placeholders, anchored matching against normalized paths, and an
//! ordered table where the first matching route wins.
//!
//! ```rust
//! use coffee_api::routing::RouteTable;
//! use http::Method;
//!
//! let table = RouteTable::new()
//!     .route(Method::POST, "/login", "login")
//!     .protected(Method::GET, "/users/:iduser", "get_user");
//!
//! let matched = table.match_route(&Method::GET, "/users/42/").unwrap();
//! assert_eq!(matched.route.handler, "get_user");
//! assert_eq!(matched.params.get("iduser"), Some("42"));
//! ```

mod pattern;
mod table;

pub use pattern::{
    extract_params, normalize_path, PathParams, RoutePattern, AUTHENTICATED_USER_EMAIL,
    AUTHENTICATED_USER_ID,
};
pub use table::{Route, RouteError, RouteMatch, RouteTable};
