//! Persistence layer.
//!
//! - [`Database`] / [`Session`]: the in-process storage engine with scoped
//!   sessions and begin/commit/rollback transactions
//! - [`UserRepository`] / [`DrinkRepository`]: the seams services use

mod memory;
mod repository;

pub use memory::{Database, Session};
pub use repository::{
    DrinkRepository, MemoryDrinkRepository, MemoryUserRepository, UserRepository,
};
