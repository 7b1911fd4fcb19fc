use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One recorded drink. Never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub user_id: i64,
    pub consumed_at: NaiveDateTime,
    pub quantity: i64,
}

/// Fields for appending a drink; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewDrink {
    pub user_id: i64,
    pub consumed_at: NaiveDateTime,
    pub quantity: i64,
}

impl NewDrink {
    /// A single drink consumed at `at`.
    pub fn single(user_id: i64, at: NaiveDateTime) -> Self {
        Self {
            user_id,
            consumed_at: at,
            quantity: 1,
        }
    }
}

/// Total drinks for one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyConsumption {
    pub date: NaiveDate,
    pub total: i64,
}

/// One row of the drink ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub total_drinks: i64,
}
