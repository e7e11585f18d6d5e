//! The module contains the error the engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`], which is what callers are
//! expected to branch on:
//!
//! - [`Validation`]: the input was wrong, re-prompt the user.
//! - [`NotFound`]: the user or goal does not exist (or belongs to someone
//!   else).
//! - [`InsufficientFunds`]: a withdrawal larger than the saved amount.
//! - [`Storage`]: the database failed; nothing was applied.
//!
//!  [`Validation`]: ErrorKind::Validation
//!  [`NotFound`]: ErrorKind::NotFound
//!  [`InsufficientFunds`]: ErrorKind::InsufficientFunds
//!  [`Storage`]: ErrorKind::Storage
use chrono::NaiveDate;
use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),
    #[error("Deadline {0} is in the past")]
    PastDeadline(NaiveDate),
    #[error("Target {target} is below the saved amount {saved}")]
    TargetBelowSaved { target: Money, saved: Money },
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Insufficient funds: {available} available")]
    InsufficientFunds { available: Money },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),
    #[error("Corrupted row: {0}")]
    Corrupted(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientFunds,
    Storage,
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidName(_)
            | Self::InvalidGoal(_)
            | Self::PastDeadline(_)
            | Self::TargetBelowSaved { .. }
            | Self::InvalidPeriod(_)
            | Self::InvalidCurrency(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::Conflict(_) | Self::Corrupted(_) | Self::Database(_) => ErrorKind::Storage,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidGoal(a), Self::InvalidGoal(b)) => a == b,
            (Self::PastDeadline(a), Self::PastDeadline(b)) => a == b,
            (
                Self::TargetBelowSaved {
                    target: a,
                    saved: c,
                },
                Self::TargetBelowSaved {
                    target: b,
                    saved: d,
                },
            ) => a == b && c == d,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (
                Self::InsufficientFunds { available: a },
                Self::InsufficientFunds { available: b },
            ) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Corrupted(a), Self::Corrupted(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_split_user_mistakes_from_service_failures() {
        assert_eq!(
            EngineError::InvalidGoal("x".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::InsufficientFunds {
                available: Money::new(100)
            }
            .kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            EngineError::TargetBelowSaved {
                target: Money::new(100),
                saved: Money::new(200)
            }
            .kind(),
            ErrorKind::Validation
        );
        assert!(EngineError::KeyNotFound("goal".to_string()).is_not_found());
        assert_eq!(
            EngineError::Database(DbErr::Custom("down".to_string())).kind(),
            ErrorKind::Storage
        );
    }
}
