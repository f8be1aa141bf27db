use std::time::Duration;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use super::Validator;

/// Which kind of database constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Unique,
    ForeignKey,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed validation")]
    ValidationFailed(Validator),
    #[error("record not found")]
    NotFound,
    #[error("{kind:?} constraint violation: {message}")]
    ConstraintViolation { kind: Constraint, message: String },
    #[error("store operation exceeded {0:?}")]
    Timeout(Duration),
    #[error("store error: {0}")]
    Internal(#[source] DbErr),
}

impl From<DbErr> for StoreError {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => StoreError::ConstraintViolation {
                kind: Constraint::Unique,
                message,
            },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                StoreError::ConstraintViolation {
                    kind: Constraint::ForeignKey,
                    message,
                }
            }
            _ => match value {
                DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => StoreError::NotFound,
                other => StoreError::Internal(other),
            },
        }
    }
}

impl From<Validator> for StoreError {
    fn from(value: Validator) -> Self {
        StoreError::ValidationFailed(value)
    }
}
