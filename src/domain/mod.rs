//! Domain records: users (the counting aggregate) and drinks (the events).

mod drink;
mod user;

pub use drink::{DailyConsumption, Drink, NewDrink, RankingEntry};
pub use user::{NewUser, User, UserView};

use chrono::{NaiveDateTime, SubsecRound, Utc};

/// Format used for every timestamp leaving the service.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format accepted for calendar dates in query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}
