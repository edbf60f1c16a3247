//! Diesel and pool error mapping shared by the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{FeedbackRepositoryError, UserPersistenceError};

use super::pool::PoolError;

fn log_failure(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }
}

fn is_connection_failure(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    )
}

pub(super) fn feedback_pool_error(error: PoolError) -> FeedbackRepositoryError {
    FeedbackRepositoryError::connection(error.message())
}

pub(super) fn feedback_diesel_error(error: DieselError) -> FeedbackRepositoryError {
    log_failure(&error);
    if is_connection_failure(&error) {
        FeedbackRepositoryError::connection("database connection error")
    } else {
        FeedbackRepositoryError::query("database error")
    }
}

pub(super) fn user_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

/// Map Diesel errors for user writes and reads. A unique violation can only
/// come from the email index, since ids are upserted.
pub(super) fn user_diesel_error(error: DieselError, email: Option<&str>) -> UserPersistenceError {
    log_failure(&error);
    match (&error, email) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), Some(email)) => {
            UserPersistenceError::duplicate_email(email)
        }
        _ if is_connection_failure(&error) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        assert_eq!(
            feedback_pool_error(PoolError::checkout("timed out")),
            FeedbackRepositoryError::connection("timed out")
        );
        assert_eq!(
            user_pool_error(PoolError::build("bad url")),
            UserPersistenceError::connection("bad url")
        );
    }

    #[rstest]
    fn query_failures_do_not_leak_sql_details() {
        let err = feedback_diesel_error(DieselError::NotFound);
        assert_eq!(err, FeedbackRepositoryError::query("database error"));
    }

    #[rstest]
    fn broken_transactions_are_connection_failures() {
        assert_eq!(
            user_diesel_error(DieselError::BrokenTransactionManager, None),
            UserPersistenceError::connection("database connection error")
        );
    }
}
