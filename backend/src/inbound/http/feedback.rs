//! Feedback board HTTP handlers.
//!
//! ```text
//! GET    /api/v1/feedback?sort=newest|most_liked&mine=true
//! GET    /api/v1/feedback/admin?sort=...
//! POST   /api/v1/feedback {"title":"Bug","message":"X is broken"}
//! DELETE /api/v1/feedback/{id}
//! PATCH  /api/v1/feedback/{id}/status {"status":"approved"}
//! POST   /api/v1/feedback/{id}/like
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::SubmitFeedbackRequest;
use crate::domain::{
    Error, FeedbackId, FeedbackSort, FeedbackView, LikeToggle, ListScope, retain_owned,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/feedback`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackBody {
    #[schema(example = "Bug")]
    pub title: String,
    #[schema(example = "X is broken")]
    pub message: String,
}

/// Request body for `PATCH /api/v1/feedback/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusBody {
    #[schema(example = "approved")]
    pub status: String,
}

/// Query string accepted by the listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `newest` (default) or `most_liked`.
    pub sort: Option<String>,
    /// Only items the caller owns. Needs a signed-in caller.
    pub mine: Option<bool>,
}

/// A feedback item as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackViewBody {
    pub id: u64,
    #[schema(format = "uuid")]
    pub owner_id: String,
    pub owner_display_name: String,
    pub title: String,
    pub message: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(example = "pending")]
    pub status: String,
    pub like_count: u64,
    pub is_owner: bool,
    pub liked_by_me: bool,
}

impl From<FeedbackView> for FeedbackViewBody {
    fn from(view: FeedbackView) -> Self {
        Self {
            id: view.id.get(),
            owner_id: view.owner_id.to_string(),
            owner_display_name: view.owner_display_name,
            title: view.title,
            message: view.message,
            created_at: view.created_at.to_rfc3339(),
            status: view.status.as_str().to_owned(),
            like_count: view.like_count,
            is_owner: view.is_owner,
            liked_by_me: view.liked_by_me,
        }
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct LikeToggleBody {
    pub liked: bool,
    pub likes: u64,
}

impl From<LikeToggle> for LikeToggleBody {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            liked: toggle.liked(),
            likes: toggle.like_count,
        }
    }
}

fn parse_feedback_id(raw: &str) -> Result<FeedbackId, Error> {
    FeedbackId::from_str(raw).map_err(|err| {
        Error::validation(format!("invalid feedback id: {err}"))
            .with_details(json!({ "field": "id", "value": raw }))
    })
}

fn parse_sort(query: &ListQuery) -> Result<FeedbackSort, Error> {
    match query.sort.as_deref() {
        None => Ok(FeedbackSort::default()),
        Some(raw) => FeedbackSort::from_str(raw).map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({
                "field": "sort",
                "value": raw,
                "allowed": [FeedbackSort::Newest.as_str(), FeedbackSort::MostLiked.as_str()],
            }))
        }),
    }
}

async fn list(
    state: &HttpState,
    caller: &Caller,
    scope: ListScope,
    query: &ListQuery,
) -> ApiResult<web::Json<Vec<FeedbackViewBody>>> {
    let sort = parse_sort(query)?;
    let mine = query.mine.unwrap_or(false);
    if mine && caller.principal().user_id().is_none() {
        return Err(Error::unauthenticated("sign in to list your own feedback"));
    }
    let mut views = state
        .feedback_query
        .list_feedback(caller.principal(), scope, sort)
        .await?;
    if mine {
        retain_owned(&mut views);
    }
    Ok(web::Json(views.into_iter().map(FeedbackViewBody::from).collect()))
}

/// List approved feedback.
#[utoipa::path(
    get,
    path = "/api/v1/feedback",
    params(ListQuery),
    responses(
        (status = 200, description = "Approved feedback", body = [FeedbackViewBody]),
        (status = 400, description = "Invalid sort", body = ErrorSchema),
        (status = 401, description = "Invalid credential, or `mine` without one", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "listFeedback",
    security((), ("BearerToken" = []))
)]
#[get("/feedback")]
pub async fn list_public(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<FeedbackViewBody>>> {
    list(&state, &caller, ListScope::Public, &query).await
}

/// List all feedback regardless of status. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/feedback/admin",
    params(ListQuery),
    responses(
        (status = 200, description = "All feedback", body = [FeedbackViewBody]),
        (status = 400, description = "Invalid sort", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "listAllFeedback",
    security(("BearerToken" = []))
)]
#[get("/feedback/admin")]
pub async fn list_admin(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<FeedbackViewBody>>> {
    list(&state, &caller, ListScope::All, &query).await
}

/// Submit a new feedback item; it starts pending review.
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = SubmitFeedbackBody,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackViewBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "submitFeedback",
    security(("BearerToken" = []))
)]
#[post("/feedback")]
pub async fn submit(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SubmitFeedbackBody>,
) -> ApiResult<HttpResponse> {
    let SubmitFeedbackBody { title, message } = payload.into_inner();
    let view = state
        .feedback
        .submit_feedback(caller.principal(), SubmitFeedbackRequest { title, message })
        .await?;
    Ok(HttpResponse::Created().json(FeedbackViewBody::from(view)))
}

/// Delete a feedback item. Owner or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/feedback/{id}",
    params(("id" = u64, Path, description = "Feedback id")),
    responses(
        (status = 204, description = "Feedback deleted"),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "deleteFeedback",
    security(("BearerToken" = []))
)]
#[delete("/feedback/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_feedback_id(&path)?;
    state.feedback.delete_feedback(caller.principal(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Move a feedback item to a new moderation status. Admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/feedback/{id}/status",
    params(("id" = u64, Path, description = "Feedback id")),
    request_body = SetStatusBody,
    responses(
        (status = 200, description = "Status updated", body = FeedbackViewBody),
        (status = 400, description = "Invalid id or status", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "setFeedbackStatus",
    security(("BearerToken" = []))
)]
#[patch("/feedback/{id}/status")]
pub async fn set_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SetStatusBody>,
) -> ApiResult<web::Json<FeedbackViewBody>> {
    let id = parse_feedback_id(&path)?;
    let view = state
        .feedback
        .set_feedback_status(caller.principal(), id, &payload.status)
        .await?;
    Ok(web::Json(FeedbackViewBody::from(view)))
}

/// Like the item, or remove the caller's like if already present.
#[utoipa::path(
    post,
    path = "/api/v1/feedback/{id}/like",
    params(("id" = u64, Path, description = "Feedback id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeToggleBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "toggleFeedbackLike",
    security(("BearerToken" = []))
)]
#[post("/feedback/{id}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeToggleBody>> {
    let id = parse_feedback_id(&path)?;
    let toggle = state
        .feedback
        .toggle_feedback_like(caller.principal(), id)
        .await?;
    Ok(web::Json(LikeToggleBody::from(toggle)))
}

/// Register every feedback route on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_public)
        .service(list_admin)
        .service(submit)
        .service(remove)
        .service(set_status)
        .service(toggle_like);
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
