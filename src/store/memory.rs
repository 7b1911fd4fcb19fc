//! In-process storage engine.
//!
//! [`Database`] owns the tables. Every unit of work acquires a [`Session`],
//! which holds exclusive access to the tables until it is dropped, so
//! sessions are serialized against each other. Inside a session, `begin`
//! starts a transaction: each write records how to undo itself, `commit`
//! forgets the journal and `rollback` replays it in reverse. Dropping a
//! session with an open transaction rolls it back.
//!
//! Outside a transaction each write is final as soon as it returns
//! (autocommit).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{trace, warn};

use crate::domain::{DailyConsumption, Drink, NewDrink, NewUser, RankingEntry, User};
use crate::error::StoreError;

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    drinks: BTreeMap<i64, Drink>,
    last_user_id: i64,
    last_drink_id: i64,
}

/// How to reverse one write.
#[derive(Debug)]
enum Undo {
    UserInserted(i64),
    UserUpdated(User),
    UserDeleted { user: User, drinks: Vec<Drink> },
    DrinkInserted(i64),
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn apply(&mut self, undo: Undo) {
        match undo {
            Undo::UserInserted(id) => {
                self.users.remove(&id);
            }
            Undo::UserUpdated(previous) => {
                self.users.insert(previous.id, previous);
            }
            Undo::UserDeleted { user, drinks } => {
                self.users.insert(user.id, user);
                for drink in drinks {
                    self.drinks.insert(drink.id, drink);
                }
            }
            Undo::DrinkInserted(id) => {
                self.drinks.remove(&id);
            }
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Owned handle to the storage engine.
///
/// Cloning is cheap and every clone refers to the same tables.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Arc<Mutex<Tables>>,
}

impl Database {
    /// Open an empty database.
    pub fn open() -> Self {
        Self::default()
    }

    /// Acquire a session, waiting for any other session to finish.
    pub async fn session(&self) -> Session {
        Session {
            tables: Arc::clone(&self.tables).lock_owned().await,
            journal: None,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Exclusive, scoped access to the database.
pub struct Session {
    tables: OwnedMutexGuard<Tables>,
    journal: Option<Vec<Undo>>,
}

impl Session {
    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    /// Open a transaction.
    pub fn begin(&mut self) -> Result<(), StoreError> {
        if self.journal.is_some() {
            return Err(StoreError::TransactionState("transaction already open"));
        }
        self.journal = Some(Vec::new());
        Ok(())
    }

    /// Make every write since `begin` permanent.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        let journal = self
            .journal
            .take()
            .ok_or(StoreError::TransactionState("commit without open transaction"))?;
        trace!(writes = journal.len(), "Transaction committed");
        Ok(())
    }

    /// Undo every write since `begin`.
    pub fn rollback(&mut self) -> Result<(), StoreError> {
        let journal = self
            .journal
            .take()
            .ok_or(StoreError::TransactionState("rollback without open transaction"))?;
        let writes = journal.len();
        for undo in journal.into_iter().rev() {
            self.tables.apply(undo);
        }
        trace!(writes, "Transaction rolled back");
        Ok(())
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        if self.tables.email_taken(&new.email, None) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }

        self.tables.last_user_id += 1;
        let user = User {
            id: self.tables.last_user_id,
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            drink_counter: 0,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.tables.users.insert(user.id, user.clone());
        self.record(Undo::UserInserted(user.id));
        Ok(user)
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.tables.users.get(&id).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// One page of users, newest first. Pages start at 1.
    pub fn users_page(&self, page: u32, limit: u32) -> Vec<User> {
        let mut users: Vec<&User> = self.tables.users.values().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        users
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect()
    }

    pub fn user_count(&self) -> u64 {
        self.tables.users.len() as u64
    }

    /// Overwrite a stored user with `user`, matched by id.
    pub fn update_user(&mut self, user: &User) -> Result<User, StoreError> {
        if !self.tables.users.contains_key(&user.id) {
            return Err(StoreError::RowNotFound {
                table: "users",
                id: user.id,
            });
        }
        if self.tables.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }

        let previous = self.tables.users.insert(user.id, user.clone());
        if let Some(previous) = previous {
            self.record(Undo::UserUpdated(previous));
        }
        Ok(user.clone())
    }

    /// Delete a user and their drinks. Returns whether the user existed.
    pub fn delete_user(&mut self, id: i64) -> bool {
        let Some(user) = self.tables.users.remove(&id) else {
            return false;
        };

        let drink_ids: Vec<i64> = self
            .tables
            .drinks
            .values()
            .filter(|d| d.user_id == id)
            .map(|d| d.id)
            .collect();
        let drinks = drink_ids
            .iter()
            .filter_map(|drink_id| self.tables.drinks.remove(drink_id))
            .collect();

        self.record(Undo::UserDeleted { user, drinks });
        true
    }

    // -------------------------------------------------------------------------
    // Drinks
    // -------------------------------------------------------------------------

    pub fn insert_drink(&mut self, new: NewDrink) -> Result<Drink, StoreError> {
        if !self.tables.users.contains_key(&new.user_id) {
            return Err(StoreError::RowNotFound {
                table: "users",
                id: new.user_id,
            });
        }

        self.tables.last_drink_id += 1;
        let drink = Drink {
            id: self.tables.last_drink_id,
            user_id: new.user_id,
            consumed_at: new.consumed_at,
            quantity: new.quantity,
        };
        self.tables.drinks.insert(drink.id, drink.clone());
        self.record(Undo::DrinkInserted(drink.id));
        Ok(drink)
    }

    /// One page of a user's drinks, most recent first. Pages start at 1.
    pub fn drinks_by_user(&self, user_id: i64, page: u32, limit: u32) -> Vec<Drink> {
        let mut drinks: Vec<&Drink> = self
            .tables
            .drinks
            .values()
            .filter(|d| d.user_id == user_id)
            .collect();
        drinks.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at).then(b.id.cmp(&a.id)));

        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        drinks
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect()
    }

    pub fn drink_count_by_user(&self, user_id: i64) -> u64 {
        self.tables
            .drinks
            .values()
            .filter(|d| d.user_id == user_id)
            .count() as u64
    }

    /// Per-day totals for a user within `[start, end]`, oldest day first.
    /// Days without drinks are omitted.
    pub fn daily_consumption(
        &self,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<DailyConsumption> {
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for drink in self.tables.drinks.values() {
            if drink.user_id == user_id && drink.consumed_at >= start && drink.consumed_at <= end {
                *per_day.entry(drink.consumed_at.date()).or_default() += drink.quantity;
            }
        }

        per_day
            .into_iter()
            .map(|(date, total)| DailyConsumption { date, total })
            .collect()
    }

    /// Every user with their drink total within `[start, end]`, highest
    /// total first, ties broken by name.
    pub fn ranking(&self, start: NaiveDateTime, end: NaiveDateTime, limit: u32) -> Vec<RankingEntry> {
        let mut totals: HashMap<i64, i64> = HashMap::new();
        for drink in self.tables.drinks.values() {
            if drink.consumed_at >= start && drink.consumed_at <= end {
                *totals.entry(drink.user_id).or_default() += drink.quantity;
            }
        }

        let mut entries: Vec<RankingEntry> = self
            .tables
            .users
            .values()
            .map(|u| RankingEntry {
                user_id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                total_drinks: totals.get(&u.id).copied().unwrap_or(0),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.total_drinks
                .cmp(&a.total_drinks)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.user_id.cmp(&b.user_id))
        });
        entries.truncate(limit as usize);
        entries
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.journal.is_some() {
            warn!("Session dropped with an open transaction, rolling back");
            // A journal is present, so rollback cannot fail here.
            let _ = self.rollback();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
