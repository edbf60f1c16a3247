//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations under
//! `backend/migrations`. Regenerate with `diesel print-schema` after changing
//! a migration.

diesel::table! {
    /// Registered users. `email` is unique and stored lowercased.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        email -> Varchar,
        credential_hash -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Feedback items. `like_count` mirrors the number of `feedback_likes`
    /// rows and is only changed in the same transaction as those rows.
    feedback (id) {
        id -> Int8,
        owner_id -> Uuid,
        title -> Varchar,
        message -> Varchar,
        status -> Varchar,
        like_count -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Like relation; one row per (feedback, user) pair.
    feedback_likes (feedback_id, user_id) {
        feedback_id -> Int8,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(feedback -> users (owner_id));
diesel::joinable!(feedback_likes -> feedback (feedback_id));
diesel::joinable!(feedback_likes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, feedback, feedback_likes);
