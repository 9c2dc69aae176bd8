//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found in a repository.
//! - [`InvalidExpenseData`] thrown when group expenses break the share
//!   invariants (unknown member, shares not summing to the amount).
//! - [`InvalidDate`] thrown when a date computation leaves the calendar.
//! - [`Import`] thrown when a bank statement cannot be parsed at all.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidExpenseData`]: EngineError::InvalidExpenseData
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`Import`]: EngineError::Import
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid expense data: {0}")]
    InvalidExpenseData(String),
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Import failed: {0}")]
    Import(String),
}

impl From<csv::Error> for EngineError {
    fn from(value: csv::Error) -> Self {
        Self::Import(value.to_string())
    }
}
