use chrono::NaiveDateTime;
use serde::Serialize;

/// A registered user and their running drink counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub drink_counter: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Count one more drink and refresh the modification time.
    pub fn record_drink(&mut self, at: NaiveDateTime) {
        self.drink_counter += 1;
        self.updated_at = at;
    }

    /// Public representation, without the password hash.
    pub fn view(&self) -> UserView {
        UserView {
            iduser: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            drink_counter: self.drink_counter,
        }
    }
}

/// Fields for inserting a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// User as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub iduser: i64,
    pub email: String,
    pub name: String,
    #[serde(rename = "drinkCounter")]
    pub drink_counter: i64,
}
