//! REST API routes.
//!
//! Handlers only translate between JSON and the review service; every rule
//! lives in [`ReviewService`].

use crate::error::{AppError, ErrorCode};
use crate::models::dto::{
    CreatePrRequest, CreateTeamRequest, ErrorDetail, ErrorResponse, GetReviewsResponse,
    MergePrRequest, PrResponse, PullRequestDto, PullRequestShortDto, ReassignReviewerRequest,
    ReassignReviewerResponse, SetActiveRequest, TeamDto, TeamQuery, TeamResponse, UserQuery,
    UserResponse,
};
use crate::services::review_service::ReviewService;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Shared handler state.
pub type ApiState = Arc<ReviewService>;

/// Message returned for every infrastructure failure.
const INTERNAL_MESSAGE: &str = "internal server error";

// ── Error handling ───────────────────────────────────────────────────────────

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl ApiErr {
    pub fn status(&self) -> StatusCode {
        status_for(self.0.code())
    }
}

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::TeamExists | ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::PrExists
        | ErrorCode::PrMerged
        | ErrorCode::NotAssigned
        | ErrorCode::NoCandidate => StatusCode::CONFLICT,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let message = if self.0.is_infrastructure() {
            log::error!("[server] Request failed: {}", self.0);
            INTERNAL_MESSAGE.to_string()
        } else {
            log::debug!("[server] Request rejected: {}", self.0);
            self.0.to_string()
        };

        (
            status_for(code),
            Json(ErrorResponse {
                error: ErrorDetail {
                    code: code.as_str().to_string(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

/// Unwrap a query parameter or fail with `INVALID_REQUEST`.
fn required(value: Option<String>, name: &str) -> Result<String, ApiErr> {
    value.ok_or_else(|| {
        ApiErr(AppError::invalid_input_field(
            format!("{} query parameter is required", name),
            name,
        ))
    })
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(create_team))
        .route("/team/get", get(get_team))
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/pullRequest/create", post(create_pr))
        .route("/pullRequest/merge", post(merge_pr))
        .route("/pullRequest/reassign", post(reassign_reviewer))
}

async fn health() -> &'static str {
    "OK"
}

// ── Team & user handlers ─────────────────────────────────────────────────────

/// POST /team/add: register a team with its members.
async fn create_team(
    State(service): State<ApiState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let Json(req) = payload?;
    let team = service.create_team(&req.team_name, req.members).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            team: TeamDto::from(&team),
        }),
    ))
}

/// GET /team/get?team_name=: team with its current roster.
async fn get_team(
    State(service): State<ApiState>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<TeamDto>, ApiErr> {
    let team_name = required(query.team_name, "team_name")?;
    let team = service.get_team(&team_name).await?;
    Ok(Json(TeamDto::from(&team)))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(service): State<ApiState>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let Json(req) = payload?;
    let user = service.set_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=: PRs the user currently reviews.
async fn get_review(
    State(service): State<ApiState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<GetReviewsResponse>, ApiErr> {
    let user_id = required(query.user_id, "user_id")?;
    let prs = service.get_reviews_for_user(&user_id).await?;

    Ok(Json(GetReviewsResponse {
        user_id,
        pull_requests: prs.iter().map(PullRequestShortDto::from).collect(),
    }))
}

// ── Pull request handlers ────────────────────────────────────────────────────

/// POST /pullRequest/create: open a PR and assign reviewers.
async fn create_pr(
    State(service): State<ApiState>,
    payload: Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrResponse>), ApiErr> {
    let Json(req) = payload?;
    let pr = service
        .create_pr(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PrResponse {
            pr: PullRequestDto::from(&pr),
        }),
    ))
}

/// POST /pullRequest/merge: idempotent merge.
async fn merge_pr(
    State(service): State<ApiState>,
    payload: Result<Json<MergePrRequest>, JsonRejection>,
) -> Result<Json<PrResponse>, ApiErr> {
    let Json(req) = payload?;
    let pr = service.merge_pr(&req.pull_request_id).await?;

    Ok(Json(PrResponse {
        pr: PullRequestDto::from(&pr),
    }))
}

/// POST /pullRequest/reassign: swap one reviewer for another team member.
async fn reassign_reviewer(
    State(service): State<ApiState>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> Result<Json<ReassignReviewerResponse>, ApiErr> {
    let Json(req) = payload?;
    let result = service
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;

    Ok(Json(ReassignReviewerResponse {
        pr: PullRequestDto::from(&result.pr),
        replaced_by: result.replaced_by,
    }))
}
