//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    CredentialHash, DisplayName, EmailAddress, User, UserId, UserParts, UserValidationError,
};

use super::error_mapping::{user_diesel_error, user_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        display_name,
        email,
        credential_hash,
        is_admin,
    } = row;
    let invalid = |err: UserValidationError| {
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };

    Ok(User::new(UserParts {
        id: UserId::from_uuid(id),
        display_name: DisplayName::new(display_name).map_err(invalid)?,
        email: EmailAddress::new(email).map_err(invalid)?,
        credential_hash: CredentialHash::new(credential_hash).map_err(invalid)?,
        is_admin,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            credential_hash: user.credential_hash().as_ref(),
            is_admin: user.is_admin(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set((
                users::display_name.eq(excluded(users::display_name)),
                users::email.eq(excluded(users::email)),
                users::credential_hash.eq(excluded(users::credential_hash)),
                users::is_admin.eq(excluded(users::is_admin)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| user_diesel_error(err, Some(user.email().as_ref())))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| user_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| user_diesel_error(err, None))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&keys))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, None))?;
        rows.into_iter().map(row_to_user).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use rstest::rstest;

    fn row(display_name: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            display_name: display_name.to_owned(),
            email: "ada@example.com".to_owned(),
            credential_hash: "sha256$00$11".to_owned(),
            is_admin: true,
        }
    }

    #[rstest]
    fn converts_valid_rows() {
        let user = row_to_user(row("Ada Lovelace")).expect("valid row");
        assert_eq!(user.display_name().as_ref(), "Ada Lovelace");
        assert!(user.is_admin());
    }

    #[rstest]
    fn invalid_rows_are_query_errors() {
        let err = row_to_user(row("x")).expect_err("name too short");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
