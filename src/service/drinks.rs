//! Drink use cases: the transactional counter, per-day history and the
//! ranking.

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, error};

use super::validation::parse_date;
use crate::domain::{self, DailyConsumption, NewDrink, RankingEntry, User, UserView};
use crate::error::ServiceError;
use crate::store::{Database, DrinkRepository, Session, UserRepository};

/// History window when no `from` date is given.
pub const DEFAULT_HISTORY_DAYS: u64 = 30;

pub const DEFAULT_RANKING_LIMIT: i64 = 10;
pub const MAX_RANKING_LIMIT: i64 = 100;
pub const MAX_RANKING_DAYS: i64 = 365;

/// A user's per-day totals.
#[derive(Debug, Clone, Serialize)]
pub struct DailyHistory {
    pub user_id: i64,
    pub history: Vec<DailyConsumption>,
}

/// Ranking rows plus the parameters that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub ranking: Vec<RankingEntry>,
    pub parameters: RankingParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingParameters {
    pub date: Option<String>,
    pub days: Option<i64>,
    pub limit: i64,
}

/// Drink use cases over the user and drink repositories.
pub struct DrinkService {
    db: Database,
    users: Arc<dyn UserRepository>,
    drinks: Arc<dyn DrinkRepository>,
}

impl DrinkService {
    pub fn new(
        db: Database,
        users: Arc<dyn UserRepository>,
        drinks: Arc<dyn DrinkRepository>,
    ) -> Self {
        Self { db, users, drinks }
    }

    // =========================================================================
    // Counter
    // =========================================================================

    /// Record one drink for `user_id` and bump their counter.
    ///
    /// The drink row and the counter change commit together or not at all.
    /// On failure the transaction is rolled back and the original error is
    /// returned. If the rollback itself fails (a repository that ended the
    /// transaction on its own), that failure is returned as an internal
    /// error instead.
    pub async fn increment(&self, user_id: i64) -> Result<UserView, ServiceError> {
        let mut session = self.db.session().await;
        session.begin()?;

        match self.record_drink(&mut session, user_id).await {
            Ok(user) => {
                session.commit()?;
                debug!(user_id, counter = user.drink_counter, "Drink recorded");
                Ok(user.view())
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback() {
                    error!(user_id, error = %rollback_err, "Rollback failed");
                    return Err(ServiceError::internal(format!(
                        "rollback failed: {}",
                        rollback_err
                    )));
                }
                Err(err)
            }
        }
    }

    async fn record_drink(&self, session: &mut Session, user_id: i64) -> Result<User, ServiceError> {
        let mut user = self
            .users
            .find_by_id(session, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let now = domain::now();
        self.drinks.create(session, NewDrink::single(user_id, now)).await?;
        user.record_drink(now);
        Ok(self.users.update(session, &user).await?)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Per-day totals for `user_id` between two `YYYY-MM-DD` dates,
    /// inclusive. Defaults to the last thirty days.
    pub async fn daily_history(
        &self,
        user_id: i64,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<DailyHistory, ServiceError> {
        let mut session = self.db.session().await;
        if self.users.find_by_id(&mut session, user_id).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }

        let today = domain::now().date();
        let from = match non_empty(from) {
            Some(value) => parse_date(value, "Invalid from date format. Use YYYY-MM-DD")?,
            None => days_before(today, DEFAULT_HISTORY_DAYS),
        };
        let to = match non_empty(to) {
            Some(value) => parse_date(value, "Invalid to date format. Use YYYY-MM-DD")?,
            None => today,
        };
        if from > to {
            return Err(ServiceError::validation("From date must be before to date"));
        }

        let history = self
            .drinks
            .daily_consumption(&mut session, user_id, start_of_day(from), end_of_day(to))
            .await?;

        Ok(DailyHistory { user_id, history })
    }

    // =========================================================================
    // Ranking
    // =========================================================================

    /// Users ranked by drinks on one `date`, over the last `days` days, or
    /// today when neither is given.
    pub async fn ranking(
        &self,
        date: Option<&str>,
        days: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Ranking, ServiceError> {
        let date = non_empty(date);
        let limit = limit.unwrap_or(DEFAULT_RANKING_LIMIT);

        if date.is_some() && days.is_some() {
            return Err(ServiceError::validation(
                "Cannot specify both date and days parameters",
            ));
        }
        if !(1..=MAX_RANKING_LIMIT).contains(&limit) {
            return Err(ServiceError::validation(format!(
                "Limit must be between 1 and {}",
                MAX_RANKING_LIMIT
            )));
        }

        let today = domain::now().date();
        let (start, end) = match (date, days) {
            (Some(value), _) => {
                let day = parse_date(value, "Invalid date format. Use YYYY-MM-DD")?;
                (start_of_day(day), end_of_day(day))
            }
            (None, Some(days)) => {
                if !(1..=MAX_RANKING_DAYS).contains(&days) {
                    return Err(ServiceError::validation(format!(
                        "Days must be between 1 and {}",
                        MAX_RANKING_DAYS
                    )));
                }
                // days is bounded above, so the cast is lossless
                (start_of_day(days_before(today, days as u64)), end_of_day(today))
            }
            (None, None) => (start_of_day(today), end_of_day(today)),
        };

        let mut session = self.db.session().await;
        // limit is bounded by MAX_RANKING_LIMIT
        let ranking = self
            .drinks
            .ranking(&mut session, start, end, limit as u32)
            .await?;

        Ok(Ranking {
            ranking,
            parameters: RankingParameters {
                date: date.map(str::to_string),
                days,
                limit,
            },
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn days_before(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    // 23:59:59 is always a valid time of day
    day.and_hms_opt(23, 59, 59).unwrap_or_else(|| start_of_day(day))
}
