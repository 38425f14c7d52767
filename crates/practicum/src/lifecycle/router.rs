use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::audit::AuditSink;
use super::domain::{
    Actor, ApplicationId, ApplicationRequest, EnterpriseId, Evaluator, FileDraft, InternshipId,
    LogEntryDraft, PositionChanges, PositionDraft, PositionId, StudentId, TeacherId,
};
use super::engine::{LifecycleEngine, LifecycleError};
use super::notify::NotificationSink;
use super::store::LifecycleStore;

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = match &self {
            LifecycleError::Validation { .. } => StatusCode::BAD_REQUEST,
            LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
            LifecycleError::Conflict { .. } => StatusCode::CONFLICT,
            LifecycleError::Forbidden(_) => StatusCode::FORBIDDEN,
            LifecycleError::Store(err) => {
                tracing::error!(%err, "store failure surfaced to a request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let payload = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        (status, axum::Json(payload)).into_response()
    }
}

/// Router builder exposing the lifecycle engine over HTTP. Caller identity
/// arrives as explicit ids in payloads and query strings; the platform in
/// front of this service is expected to have authenticated them.
pub fn lifecycle_router<S, N, A>(engine: Arc<LifecycleEngine<S, N, A>>) -> Router
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/positions",
            post(create_position::<S, N, A>).get(list_positions::<S, N, A>),
        )
        .route(
            "/api/v1/positions/:position_id",
            get(get_position::<S, N, A>)
                .patch(update_position::<S, N, A>)
                .delete(delete_position::<S, N, A>),
        )
        .route("/api/v1/applications", post(submit_application::<S, N, A>))
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_application::<S, N, A>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_application::<S, N, A>),
        )
        .route(
            "/api/v1/internships",
            get(list_internships::<S, N, A>),
        )
        .route(
            "/api/v1/internships/sweep",
            post(sweep_internships::<S, N, A>),
        )
        .route(
            "/api/v1/internships/remind",
            post(remind_internships::<S, N, A>),
        )
        .route(
            "/api/v1/internships/:internship_id",
            get(get_internship::<S, N, A>),
        )
        .route(
            "/api/v1/internships/:internship_id/evaluations",
            post(submit_evaluation::<S, N, A>),
        )
        .route(
            "/api/v1/internships/:internship_id/evaluation",
            get(get_evaluation::<S, N, A>),
        )
        .route(
            "/api/v1/internships/:internship_id/logs",
            post(append_log::<S, N, A>).get(list_logs::<S, N, A>),
        )
        .route(
            "/api/v1/internships/:internship_id/files",
            post(register_file::<S, N, A>).get(list_files::<S, N, A>),
        )
        .with_state(engine)
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RoleKind {
    Student,
    Teacher,
    Enterprise,
}

/// Caller identity carried in the query string of read endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
struct ActorQuery {
    role: RoleKind,
    actor_id: u64,
    as_of: Option<NaiveDate>,
}

impl ActorQuery {
    fn actor(&self) -> Actor {
        match self.role {
            RoleKind::Student => Actor::Student(StudentId(self.actor_id)),
            RoleKind::Teacher => Actor::Teacher(TeacherId(self.actor_id)),
            RoleKind::Enterprise => Actor::Enterprise(EnterpriseId(self.actor_id)),
        }
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
struct AsOfQuery {
    as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

// --- Positions -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreatePositionBody {
    enterprise_id: EnterpriseId,
    #[serde(flatten)]
    draft: PositionDraft,
}

async fn create_position<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    axum::Json(body): axum::Json<CreatePositionBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let position = engine.create_position(body.enterprise_id, body.draft)?;
    Ok((StatusCode::CREATED, axum::Json(position)).into_response())
}

async fn list_positions<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let positions = engine.positions(query.as_of())?;
    Ok((StatusCode::OK, axum::Json(positions)).into_response())
}

async fn get_position<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(position_id): Path<u64>,
    Query(query): Query<AsOfQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let position = engine.position(PositionId(position_id), query.as_of())?;
    Ok((StatusCode::OK, axum::Json(position)).into_response())
}

#[derive(Debug, Deserialize)]
struct UpdatePositionBody {
    enterprise_id: EnterpriseId,
    #[serde(flatten)]
    changes: PositionChanges,
}

async fn update_position<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(position_id): Path<u64>,
    axum::Json(body): axum::Json<UpdatePositionBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let position =
        engine.update_position(PositionId(position_id), body.enterprise_id, body.changes)?;
    Ok((StatusCode::OK, axum::Json(position)).into_response())
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    enterprise_id: EnterpriseId,
}

async fn delete_position<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(position_id): Path<u64>,
    Query(query): Query<OwnerQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    engine.delete_position(PositionId(position_id), query.enterprise_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// --- Applications --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubmitApplicationBody {
    student_id: StudentId,
    #[serde(flatten)]
    request: ApplicationRequest,
}

async fn submit_application<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    axum::Json(body): axum::Json<SubmitApplicationBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let application = engine.submit_application(body.student_id, body.request)?;
    Ok((StatusCode::CREATED, axum::Json(application)).into_response())
}

#[derive(Debug, Deserialize)]
struct ApproveBody {
    teacher_id: TeacherId,
}

async fn approve_application<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(application_id): Path<u64>,
    axum::Json(body): axum::Json<ApproveBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let outcome = engine.approve_application(ApplicationId(application_id), body.teacher_id)?;
    Ok((StatusCode::OK, axum::Json(outcome)).into_response())
}

#[derive(Debug, Deserialize)]
struct RejectBody {
    teacher_id: TeacherId,
    rejection_reason: String,
}

async fn reject_application<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(application_id): Path<u64>,
    axum::Json(body): axum::Json<RejectBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let application = engine.reject_application(
        ApplicationId(application_id),
        body.teacher_id,
        &body.rejection_reason,
    )?;
    Ok((StatusCode::OK, axum::Json(application)).into_response())
}

// --- Internships ----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SweepBody {
    as_of: Option<NaiveDate>,
    teacher_id: Option<TeacherId>,
}

async fn sweep_internships<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    axum::Json(body): axum::Json<SweepBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let as_of = body.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let outcome = engine.sweep_expired(as_of, body.teacher_id.map(Actor::Teacher))?;
    Ok((StatusCode::OK, axum::Json(outcome)).into_response())
}

#[derive(Debug, Deserialize)]
struct RemindBody {
    as_of: Option<NaiveDate>,
    horizon_days: Option<i64>,
    teacher_id: Option<TeacherId>,
}

async fn remind_internships<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    axum::Json(body): axum::Json<RemindBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let as_of = body.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let horizon = body.horizon_days.unwrap_or(7);
    let outcome = engine.remind_expiring(as_of, horizon, body.teacher_id.map(Actor::Teacher))?;
    Ok((StatusCode::OK, axum::Json(outcome)).into_response())
}

async fn list_internships<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let internships = engine.internships(query.actor())?;
    Ok((StatusCode::OK, axum::Json(internships)).into_response())
}

async fn get_internship<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let view = engine.internship(InternshipId(internship_id), query.actor(), query.as_of())?;
    Ok((StatusCode::OK, axum::Json(view)).into_response())
}

#[derive(Debug, Deserialize)]
struct EvaluationBody {
    #[serde(flatten)]
    evaluator: Evaluator,
    score: u8,
    comment: Option<String>,
}

async fn submit_evaluation<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    axum::Json(body): axum::Json<EvaluationBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let internship = engine.submit_evaluation(
        InternshipId(internship_id),
        body.evaluator,
        body.score,
        body.comment,
    )?;
    Ok((StatusCode::OK, axum::Json(internship)).into_response())
}

#[derive(Debug, Deserialize)]
struct StudentQuery {
    student_id: StudentId,
}

async fn get_evaluation<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    Query(query): Query<StudentQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let view = engine.evaluation(InternshipId(internship_id), query.student_id)?;
    Ok((StatusCode::OK, axum::Json(view)).into_response())
}

// --- Logs & files ---------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AppendLogBody {
    student_id: StudentId,
    #[serde(flatten)]
    draft: LogEntryDraft,
}

async fn append_log<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    axum::Json(body): axum::Json<AppendLogBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let log = engine.append_log(
        InternshipId(internship_id),
        Actor::Student(body.student_id),
        body.draft,
    )?;
    Ok((StatusCode::CREATED, axum::Json(log)).into_response())
}

async fn list_logs<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let logs = engine.logs(InternshipId(internship_id), query.actor())?;
    Ok((StatusCode::OK, axum::Json(logs)).into_response())
}

#[derive(Debug, Deserialize)]
struct RegisterFileBody {
    student_id: StudentId,
    #[serde(flatten)]
    draft: FileDraft,
}

async fn register_file<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    axum::Json(body): axum::Json<RegisterFileBody>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let file = engine.register_file(
        InternshipId(internship_id),
        Actor::Student(body.student_id),
        body.draft,
    )?;
    Ok((StatusCode::CREATED, axum::Json(file)).into_response())
}

async fn list_files<S, N, A>(
    State(engine): State<Arc<LifecycleEngine<S, N, A>>>,
    Path(internship_id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, LifecycleError>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    let files = engine.files(InternshipId(internship_id), query.actor())?;
    Ok((StatusCode::OK, axum::Json(files)).into_response())
}
