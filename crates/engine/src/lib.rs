//! Ledger, savings goals and statistics of a personal finance tracker.
//!
//! All state lives in the database passed to [`Engine::builder`]; the
//! `Engine` itself is a cheap handle that can be cloned into every task.

pub use currency::Currency;
pub use error::{EngineError, ErrorKind};
pub use goals::{Funding, Goal, GoalFilter, GoalStatus, NewGoal};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, PeriodStatistics};
pub use transactions::{NewTransaction, Transaction, TransactionKind};
pub use users::User;

mod currency;
mod error;
pub mod goals;
mod money;
mod ops;
pub mod transactions;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Maximum length of a transaction category, in characters.
pub const MAX_CATEGORY_LEN: usize = 30;
/// Maximum length of a transaction description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MIN_GOAL_NAME_LEN: usize = 3;
pub const MAX_GOAL_NAME_LEN: usize = 64;
pub const MAX_DISPLAY_NAME_LEN: usize = 64;
/// Number of rows in the statistics top lists.
pub const STATISTICS_TOP_N: u64 = 5;
