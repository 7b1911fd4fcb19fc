//! Account use cases: registration, login, listing, lookup, update and
//! deletion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::validation::{
    is_blank, require_field, validate_email, validate_name, validate_password,
};
use crate::auth::{hash_password, verify_password, TokenService};
use crate::domain::{self, NewUser, UserView};
use crate::error::ServiceError;
use crate::store::{Database, UserRepository};

/// Default page for user listings.
pub const DEFAULT_PAGE: i64 = 1;

/// Default and maximum page size for listings.
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

const LOGIN_FAILED: &str = "Invalid email or password";
const USER_NOT_FOUND: &str = "User not found";
const EMAIL_TAKEN: &str = "A user with this email already exists";

// =============================================================================
// Inputs and outputs
// =============================================================================

/// Body of a registration request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Body of a login request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of an update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub iduser: i64,
    pub name: String,
    #[serde(rename = "drinkCounter")]
    pub drink_counter: i64,
}

/// One page of the user listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub pages: u64,
}

// =============================================================================
// UserService
// =============================================================================

/// Account use cases over a [`UserRepository`].
pub struct UserService {
    db: Database,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(db: Database, users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { db, users, tokens }
    }

    /// Register a new account.
    pub async fn create(&self, input: CreateUserInput) -> Result<UserView, ServiceError> {
        let email = require_field("email", input.email.as_deref())?.trim().to_string();
        let name = require_field("name", input.name.as_deref())?.trim().to_string();
        let password = require_field("password", input.password.as_deref())?;

        validate_email(&email)?;
        validate_password(password)?;
        validate_name(&name)?;

        let password_hash = hash_off_thread(password.to_string()).await?;

        let mut session = self.db.session().await;
        if self.users.find_by_email(&mut session, &email).await?.is_some() {
            debug!(email = %email, "Registration rejected: email taken");
            return Err(ServiceError::conflict(EMAIL_TAKEN));
        }

        let user = self
            .users
            .create(
                &mut session,
                NewUser {
                    email,
                    name,
                    password_hash,
                    created_at: domain::now(),
                },
            )
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user.view())
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, input: LoginInput) -> Result<LoginResult, ServiceError> {
        let email = require_field("email", input.email.as_deref())?.trim().to_string();
        let password = require_field("password", input.password.as_deref())?;

        let user = {
            let mut session = self.db.session().await;
            self.users.find_by_email(&mut session, &email).await?
        };

        let Some(user) = user else {
            debug!(email = %email, "Login failed: unknown email");
            return Err(ServiceError::unauthorized(LOGIN_FAILED));
        };

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| ServiceError::internal(format!("password check panicked: {}", e)))?;
        if !matches {
            debug!(user_id = user.id, "Login failed: wrong password");
            return Err(ServiceError::unauthorized(LOGIN_FAILED));
        }

        let token = self.tokens.issue(user.id, &user.email);
        debug!(user_id = user.id, "Login succeeded");

        Ok(LoginResult {
            token,
            iduser: user.id,
            name: user.name,
            drink_counter: user.drink_counter,
        })
    }

    /// One page of users, newest first.
    pub async fn list(&self, page: Option<i64>, limit: Option<i64>) -> Result<UserPage, ServiceError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(ServiceError::validation("Page must be greater than 0"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ServiceError::validation(format!(
                "Limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let page_u32 = u32::try_from(page)
            .map_err(|_| ServiceError::validation("Page is out of range"))?;
        // limit is bounded by MAX_LIMIT
        let limit_u32 = limit as u32;

        let mut session = self.db.session().await;
        let users = self.users.find_all(&mut session, page_u32, limit_u32).await?;
        let total = self.users.count(&mut session).await?;

        Ok(UserPage {
            users: users.iter().map(|u| u.view()).collect(),
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit as u64),
            },
        })
    }

    /// Public view of one user.
    pub async fn get(&self, id: i64) -> Result<UserView, ServiceError> {
        let mut session = self.db.session().await;
        self.users
            .find_by_id(&mut session, id)
            .await?
            .map(|u| u.view())
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))
    }

    /// Refuse updates of any account but the caller's own.
    ///
    /// Runs before the request body is looked at, so a foreign update is a
    /// 403 whatever it carries.
    pub fn authorize_update(&self, id: i64, actor_id: i64) -> Result<(), ServiceError> {
        if id != actor_id {
            warn!(user_id = id, actor_id, "Update of another account refused");
            return Err(ServiceError::forbidden("You can only update your own account"));
        }
        Ok(())
    }

    /// Update the caller's own account.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
        actor_id: i64,
    ) -> Result<UserView, ServiceError> {
        self.authorize_update(id, actor_id)?;

        if input.email.is_none() && input.name.is_none() && input.password.is_none() {
            return Err(ServiceError::validation(
                "At least one field must be provided for update",
            ));
        }
        if input.email.as_deref().is_some_and(is_blank) {
            return Err(ServiceError::validation("Email cannot be empty"));
        }
        if input.name.as_deref().is_some_and(is_blank) {
            return Err(ServiceError::validation("Name cannot be empty"));
        }
        if input.password.as_deref().is_some_and(str::is_empty) {
            return Err(ServiceError::validation("Password cannot be empty"));
        }

        let email = input.email.map(|e| e.trim().to_string());
        let name = input.name.map(|n| n.trim().to_string());
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if let Some(name) = &name {
            validate_name(name)?;
        }
        let password_hash = match input.password {
            Some(password) => {
                validate_password(&password)?;
                Some(hash_off_thread(password).await?)
            }
            None => None,
        };

        let mut session = self.db.session().await;
        let mut user = self
            .users
            .find_by_id(&mut session, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))?;

        if let Some(email) = email {
            if let Some(existing) = self.users.find_by_email(&mut session, &email).await? {
                if existing.id != id {
                    return Err(ServiceError::validation("Email is already taken by another user"));
                }
            }
            user.email = email;
        }
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        user.updated_at = domain::now();

        let updated = self.users.update(&mut session, &user).await?;
        info!(user_id = id, "User updated");
        Ok(updated.view())
    }

    /// Delete the caller's own account and its drinks.
    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<(), ServiceError> {
        if id != actor_id {
            warn!(user_id = id, actor_id, "Deletion of another account refused");
            return Err(ServiceError::forbidden("You can only delete your own account"));
        }

        let mut session = self.db.session().await;
        if !self.users.delete(&mut session, id).await? {
            return Err(ServiceError::not_found(USER_NOT_FOUND));
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_off_thread(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::internal(format!("password hashing panicked: {}", e)))?
        .map_err(|e| ServiceError::internal(e.to_string()))
}
