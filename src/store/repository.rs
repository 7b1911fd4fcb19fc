//! Repository abstractions over a [`Session`].
//!
//! Services depend on these traits rather than on the storage engine, so a
//! different backend, or a wrapper that injects failures in tests, can be
//! swapped in without touching business logic. Every method runs inside the
//! caller's session and therefore inside the caller's transaction, if any.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::Session;
use crate::domain::{DailyConsumption, Drink, NewDrink, NewUser, RankingEntry, User};
use crate::error::StoreError;

/// Access to stored users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with a unique violation on a taken email.
    async fn create(&self, session: &mut Session, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, session: &mut Session, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(
        &self,
        session: &mut Session,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    /// One page of users, newest first. Pages start at 1.
    async fn find_all(
        &self,
        session: &mut Session,
        page: u32,
        limit: u32,
    ) -> Result<Vec<User>, StoreError>;

    async fn count(&self, session: &mut Session) -> Result<u64, StoreError>;

    /// Persist every field of `user`, matched by id.
    async fn update(&self, session: &mut Session, user: &User) -> Result<User, StoreError>;

    /// Delete a user together with their drinks. Returns whether a row was
    /// removed.
    async fn delete(&self, session: &mut Session, id: i64) -> Result<bool, StoreError>;
}

/// Access to recorded drinks.
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// Append a drink. The owning user must exist.
    async fn create(&self, session: &mut Session, drink: NewDrink) -> Result<Drink, StoreError>;

    /// One page of a user's drinks, most recent first. Pages start at 1.
    async fn find_by_user(
        &self,
        session: &mut Session,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Drink>, StoreError>;

    async fn count_by_user(&self, session: &mut Session, user_id: i64) -> Result<u64, StoreError>;

    /// Per-day totals for a user within `[start, end]`, oldest first.
    async fn daily_consumption(
        &self,
        session: &mut Session,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DailyConsumption>, StoreError>;

    /// All users ranked by drinks within `[start, end]`.
    async fn ranking(
        &self,
        session: &mut Session,
        start: NaiveDateTime,
        end: NaiveDateTime,
        limit: u32,
    ) -> Result<Vec<RankingEntry>, StoreError>;
}

// =============================================================================
// In-memory implementations
// =============================================================================

/// [`UserRepository`] backed by the in-process engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryUserRepository;

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, session: &mut Session, user: NewUser) -> Result<User, StoreError> {
        session.insert_user(user)
    }

    async fn find_by_id(&self, session: &mut Session, id: i64) -> Result<Option<User>, StoreError> {
        Ok(session.user(id))
    }

    async fn find_by_email(
        &self,
        session: &mut Session,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(session.user_by_email(email))
    }

    async fn find_all(
        &self,
        session: &mut Session,
        page: u32,
        limit: u32,
    ) -> Result<Vec<User>, StoreError> {
        Ok(session.users_page(page, limit))
    }

    async fn count(&self, session: &mut Session) -> Result<u64, StoreError> {
        Ok(session.user_count())
    }

    async fn update(&self, session: &mut Session, user: &User) -> Result<User, StoreError> {
        session.update_user(user)
    }

    async fn delete(&self, session: &mut Session, id: i64) -> Result<bool, StoreError> {
        Ok(session.delete_user(id))
    }
}

/// [`DrinkRepository`] backed by the in-process engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDrinkRepository;

#[async_trait]
impl DrinkRepository for MemoryDrinkRepository {
    async fn create(&self, session: &mut Session, drink: NewDrink) -> Result<Drink, StoreError> {
        session.insert_drink(drink)
    }

    async fn find_by_user(
        &self,
        session: &mut Session,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Drink>, StoreError> {
        Ok(session.drinks_by_user(user_id, page, limit))
    }

    async fn count_by_user(&self, session: &mut Session, user_id: i64) -> Result<u64, StoreError> {
        Ok(session.drink_count_by_user(user_id))
    }

    async fn daily_consumption(
        &self,
        session: &mut Session,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DailyConsumption>, StoreError> {
        Ok(session.daily_consumption(user_id, start, end))
    }

    async fn ranking(
        &self,
        session: &mut Session,
        start: NaiveDateTime,
        end: NaiveDateTime,
        limit: u32,
    ) -> Result<Vec<RankingEntry>, StoreError> {
        Ok(session.ranking(start, end, limit))
    }
}
