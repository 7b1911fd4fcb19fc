//! Use cases.
//!
//! Each service owns a [`Database`](crate::store::Database) handle and talks
//! to storage through the repository traits only. Services return
//! [`ServiceError`](crate::error::ServiceError) values; turning them into
//! HTTP responses is the server's job.

mod drinks;
mod users;
mod validation;

pub use drinks::{
    DailyHistory, DrinkService, Ranking, RankingParameters, DEFAULT_HISTORY_DAYS,
    DEFAULT_RANKING_LIMIT, MAX_RANKING_DAYS, MAX_RANKING_LIMIT,
};
pub use users::{
    CreateUserInput, LoginInput, LoginResult, Pagination, UpdateUserInput, UserPage, UserService,
    DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
