//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{feedback, feedback_likes, users};

/// Row read from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub credential_hash: String,
    pub is_admin: bool,
}

/// Insertable user record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub credential_hash: &'a str,
    pub is_admin: bool,
}

/// Row read from the feedback table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedbackRow {
    pub id: i64,
    pub owner_id: Uuid,
    pub title: String,
    pub message: String,
    pub status: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Insertable feedback record; the id is assigned by the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback)]
pub(crate) struct NewFeedbackRow<'a> {
    pub owner_id: Uuid,
    pub title: &'a str,
    pub message: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Insertable like relation row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback_likes)]
pub(crate) struct NewFeedbackLikeRow {
    pub feedback_id: i64,
    pub user_id: Uuid,
}
