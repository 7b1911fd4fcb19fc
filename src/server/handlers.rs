//! Request handlers, one per route.
//!
//! Every handler has the same shape: it takes the shared [`AppState`] and
//! the [`RequestContext`], calls one use case and wraps the result in the
//! success envelope.
//!
//! # Endpoints
//!
//! - `POST /users/` - Register
//! - `POST /login` - Obtain a token
//! - `GET /users/` - List users (protected)
//! - `GET /users/:iduser` - Get one user (protected)
//! - `PUT /users/:iduser` - Update own account (protected)
//! - `DELETE /users/:iduser` - Delete own account (protected)
//! - `POST /users/:iduser/drink` - Record a drink (protected)
//! - `GET /users/:iduser/drinks/daily` - Per-day history (protected)
//! - `GET /drinks/ranking` - Ranking (protected)

use std::sync::Arc;

use serde_json::json;

use super::context::RequestContext;
use super::response::ApiResponse;
use crate::auth::TokenService;
use crate::error::ServiceError;
use crate::service::{
    CreateUserInput, DrinkService, LoginInput, UpdateUserInput, UserService,
};
use crate::store::{
    Database, DrinkRepository, MemoryDrinkRepository, MemoryUserRepository, UserRepository,
};

/// Path parameter naming the target user.
const USER_ID: &str = "iduser";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the services.
///
/// Cloned into every handler call; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub drinks: Arc<DrinkService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// State over the in-memory repositories.
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self::with_repositories(
            db,
            tokens,
            Arc::new(MemoryUserRepository),
            Arc::new(MemoryDrinkRepository),
        )
    }

    /// State over caller-supplied repositories.
    pub fn with_repositories(
        db: Database,
        tokens: TokenService,
        users: Arc<dyn UserRepository>,
        drinks: Arc<dyn DrinkRepository>,
    ) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            users: Arc::new(UserService::new(
                db.clone(),
                Arc::clone(&users),
                Arc::clone(&tokens),
            )),
            drinks: Arc::new(DrinkService::new(db, users, drinks)),
            tokens,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

pub async fn create_user(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let input: CreateUserInput = ctx.json()?;
    let user = state.users.create(input).await?;
    ApiResponse::created("User created successfully", user)
}

pub async fn login(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let input: LoginInput = ctx.json()?;
    let result = state.users.login(input).await?;
    ApiResponse::ok("Login successful", result)
}

pub async fn list_users(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let page = ctx.query_int("page")?;
    let limit = ctx.query_int("limit")?;
    let users = state.users.list(page, limit).await?;
    ApiResponse::ok("Users retrieved successfully", users)
}

pub async fn get_user(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let id = ctx.path_id(USER_ID)?;
    let user = state.users.get(id).await?;
    ApiResponse::ok("User retrieved successfully", user)
}

pub async fn update_user(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let id = ctx.path_id(USER_ID)?;
    let caller = ctx.caller_id()?;
    state.users.authorize_update(id, caller)?;
    let input: UpdateUserInput = ctx.json()?;
    let user = state.users.update(id, input, caller).await?;
    ApiResponse::ok("User updated successfully", user)
}

pub async fn delete_user(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let id = ctx.path_id(USER_ID)?;
    let caller = ctx.caller_id()?;
    state.users.delete(id, caller).await?;
    ApiResponse::ok("User deleted successfully", json!({}))
}

// =============================================================================
// Drinks
// =============================================================================

pub async fn increment_drink(
    state: AppState,
    ctx: RequestContext,
) -> Result<ApiResponse, ServiceError> {
    let id = ctx.path_id(USER_ID)?;
    let user = state.drinks.increment(id).await?;
    ApiResponse::ok("Drink counter incremented successfully", user)
}

pub async fn daily_drinks(state: AppState, ctx: RequestContext) -> Result<ApiResponse, ServiceError> {
    let id = ctx.path_id(USER_ID)?;
    let from = ctx.query_param("from");
    let to = ctx.query_param("to");
    let history = state
        .drinks
        .daily_history(id, from.as_deref(), to.as_deref())
        .await?;
    ApiResponse::ok("Daily drinks history retrieved successfully", history)
}

pub async fn drink_ranking(
    state: AppState,
    ctx: RequestContext,
) -> Result<ApiResponse, ServiceError> {
    let date = ctx.query_param("date");
    let days = ctx.query_int("days")?;
    let limit = ctx.query_int("limit")?;
    let ranking = state.drinks.ranking(date.as_deref(), days, limit).await?;
    ApiResponse::ok("Drink ranking retrieved successfully", ranking)
}
