//! PostgreSQL-backed `FeedbackRepository` implementation using Diesel ORM.
//!
//! Status changes and like toggles run in one transaction that first locks
//! the feedback row (`SELECT ... FOR UPDATE`), so concurrent mutations of the
//! same item serialize while different items proceed in parallel. The stored
//! `like_count` column is only ever changed alongside the `feedback_likes`
//! rows it mirrors.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError};
use crate::domain::{
    Feedback, FeedbackDraft, FeedbackId, FeedbackMessage, FeedbackParts, FeedbackStatus,
    FeedbackTitle, LikeState, LikeToggle, UserId,
};

use super::error_mapping::{feedback_diesel_error, feedback_pool_error};
use super::models::{FeedbackRow, NewFeedbackLikeRow, NewFeedbackRow};
use super::pool::DbPool;
use super::schema::{feedback, feedback_likes};

/// Diesel-backed implementation of the feedback repository port.
#[derive(Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction body.
enum TxError {
    Missing,
    Diesel(diesel::result::Error),
    Corrupt(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl TxError {
    fn into_repository_error(self, id: FeedbackId) -> FeedbackRepositoryError {
        match self {
            Self::Missing => FeedbackRepositoryError::not_found(id),
            Self::Diesel(err) => feedback_diesel_error(err),
            Self::Corrupt(message) => FeedbackRepositoryError::query(message),
        }
    }
}

/// Database key for `id`. Ids beyond `i64::MAX` cannot exist in the table.
fn db_key(id: FeedbackId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn row_to_feedback(
    row: FeedbackRow,
    likers: BTreeSet<UserId>,
) -> Result<Feedback, FeedbackRepositoryError> {
    let FeedbackRow {
        id,
        owner_id,
        title,
        message,
        status,
        like_count: _,
        created_at,
    } = row;

    let corrupt = |what: &str, err: &dyn std::fmt::Display| {
        FeedbackRepositoryError::query(format!("stored feedback {id} has invalid {what}: {err}"))
    };
    let id = u64::try_from(id)
        .map_err(|err| corrupt("id", &err))
        .and_then(|raw| FeedbackId::new(raw).map_err(|err| corrupt("id", &err)))?;
    let title = FeedbackTitle::new(title).map_err(|err| corrupt("title", &err))?;
    let message = FeedbackMessage::new(message).map_err(|err| corrupt("message", &err))?;
    let status = status
        .parse::<FeedbackStatus>()
        .map_err(|err| corrupt("status", &err))?;

    Ok(Feedback::from_parts(FeedbackParts {
        id,
        owner: UserId::from_uuid(owner_id),
        title,
        message,
        created_at,
        status,
        likers,
    }))
}

async fn load_likers(
    conn: &mut AsyncPgConnection,
    ids: &[i64],
) -> Result<BTreeMap<i64, BTreeSet<UserId>>, diesel::result::Error> {
    let pairs: Vec<(i64, Uuid)> = feedback_likes::table
        .filter(feedback_likes::feedback_id.eq_any(ids))
        .select((feedback_likes::feedback_id, feedback_likes::user_id))
        .load(conn)
        .await?;

    let mut grouped: BTreeMap<i64, BTreeSet<UserId>> = BTreeMap::new();
    for (feedback_id, user_id) in pairs {
        grouped
            .entry(feedback_id)
            .or_default()
            .insert(UserId::from_uuid(user_id));
    }
    Ok(grouped)
}

fn assemble(
    rows: Vec<FeedbackRow>,
    mut likers: BTreeMap<i64, BTreeSet<UserId>>,
) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
    rows.into_iter()
        .map(|row| {
            let set = likers.remove(&row.id).unwrap_or_default();
            row_to_feedback(row, set)
        })
        .collect()
}

impl DieselFeedbackRepository {
    /// Load rows matching `status` (or every row) together with their likers
    /// inside one transaction.
    async fn load_many(
        &self,
        status: Option<FeedbackStatus>,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;
        let (rows, likers) = conn
            .transaction(|conn| {
                async move {
                    let mut query = feedback::table
                        .select(FeedbackRow::as_select())
                        .order_by(feedback::id)
                        .into_boxed();
                    if let Some(status) = status {
                        query = query.filter(feedback::status.eq(status.as_str()));
                    }
                    let rows: Vec<FeedbackRow> = query.load(conn).await?;
                    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
                    let likers = load_likers(conn, &ids).await?;
                    Ok::<_, diesel::result::Error>((rows, likers))
                }
                .scope_boxed()
            })
            .await
            .map_err(feedback_diesel_error)?;

        assemble(rows, likers)
    }
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn create(&self, draft: FeedbackDraft) -> Result<Feedback, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;
        let new_row = NewFeedbackRow {
            owner_id: *draft.owner.as_uuid(),
            title: draft.title.as_ref(),
            message: draft.message.as_ref(),
            status: FeedbackStatus::Pending.as_str(),
            created_at: draft.created_at,
        };

        let row: FeedbackRow = diesel::insert_into(feedback::table)
            .values(&new_row)
            .returning(FeedbackRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(feedback_diesel_error)?;

        row_to_feedback(row, BTreeSet::new())
    }

    async fn delete(&self, id: FeedbackId) -> Result<(), FeedbackRepositoryError> {
        let key = db_key(id).ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;

        // Likes go with the row through ON DELETE CASCADE.
        let removed = diesel::delete(feedback::table.find(key))
            .execute(&mut conn)
            .await
            .map_err(feedback_diesel_error)?;
        if removed == 0 {
            return Err(FeedbackRepositoryError::not_found(id));
        }
        Ok(())
    }

    async fn set_status(
        &self,
        id: FeedbackId,
        status: FeedbackStatus,
    ) -> Result<Feedback, FeedbackRepositoryError> {
        let key = db_key(id).ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;

        let (row, mut likers) = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let row: FeedbackRow = diesel::update(feedback::table.find(key))
                        .set(feedback::status.eq(status.as_str()))
                        .returning(FeedbackRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or(TxError::Missing)?;
                    let likers = load_likers(conn, &[key]).await?;
                    Ok((row, likers))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| err.into_repository_error(id))?;

        row_to_feedback(row, likers.remove(&key).unwrap_or_default())
    }

    async fn toggle_like(
        &self,
        id: FeedbackId,
        user_id: &UserId,
    ) -> Result<LikeToggle, FeedbackRepositoryError> {
        let key = db_key(id).ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        let user = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                feedback::table
                    .find(key)
                    .select(feedback::id)
                    .for_update()
                    .first::<i64>(conn)
                    .await
                    .optional()?
                    .ok_or(TxError::Missing)?;

                let removed = diesel::delete(
                    feedback_likes::table
                        .filter(feedback_likes::feedback_id.eq(key))
                        .filter(feedback_likes::user_id.eq(user)),
                )
                .execute(conn)
                .await?;

                let (state, delta) = if removed > 0 {
                    (LikeState::Unliked, -1_i64)
                } else {
                    diesel::insert_into(feedback_likes::table)
                        .values(&NewFeedbackLikeRow {
                            feedback_id: key,
                            user_id: user,
                        })
                        .execute(conn)
                        .await?;
                    (LikeState::Liked, 1_i64)
                };

                let like_count: i64 = diesel::update(feedback::table.find(key))
                    .set(feedback::like_count.eq(feedback::like_count + delta))
                    .returning(feedback::like_count)
                    .get_result(conn)
                    .await?;
                let like_count = u64::try_from(like_count).map_err(|_| {
                    TxError::Corrupt(format!("feedback {key} has negative like count"))
                })?;

                Ok(LikeToggle { state, like_count })
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_repository_error(id))
    }

    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        let Some(key) = db_key(id) else {
            return Ok(None);
        };
        let mut conn = self.pool.get().await.map_err(feedback_pool_error)?;

        let found = conn
            .transaction(|conn| {
                async move {
                    let row: Option<FeedbackRow> = feedback::table
                        .find(key)
                        .select(FeedbackRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok::<_, diesel::result::Error>(None);
                    };
                    let likers = load_likers(conn, &[key]).await?;
                    Ok(Some((row, likers)))
                }
                .scope_boxed()
            })
            .await
            .map_err(feedback_diesel_error)?;

        found
            .map(|(row, mut likers)| row_to_feedback(row, likers.remove(&key).unwrap_or_default()))
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        self.load_many(None).await
    }

    async fn list_by_status(
        &self,
        status: FeedbackStatus,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        self.load_many(Some(status)).await
    }
}
