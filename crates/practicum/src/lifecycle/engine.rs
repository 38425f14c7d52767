use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use super::audit::{AuditEntry, AuditSink, OperationKind};
use super::domain::{
    Actor, Application, ApplicationId, ApplicationRequest, ApplicationStatus, EnterpriseId,
    Evaluator, FileDraft, Internship, InternshipFile, InternshipId, InternshipLog,
    InternshipProgress, InternshipStatus, LogEntryDraft, Position, PositionChanges, PositionDraft,
    PositionId, PositionStatus, StudentId, TeacherId, ALLOWED_FILE_TYPES, MAX_FILE_SIZE_BYTES,
    MAX_SCORE,
};
use super::notify::{Notification, NotificationSink};
use super::store::{LifecycleStore, StoreError};

/// Machine-readable discriminator for state/capacity conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictCode {
    DuplicateApplication,
    PositionFull,
    InvalidStatus,
    BusinessLogicError,
    PendingApplications,
    EvaluationAlreadyRecorded,
}

impl ConflictCode {
    pub const fn code(self) -> &'static str {
        match self {
            ConflictCode::DuplicateApplication => "DUPLICATE_APPLICATION",
            ConflictCode::PositionFull => "POSITION_FULL",
            ConflictCode::InvalidStatus => "INVALID_STATUS",
            ConflictCode::BusinessLogicError => "BUSINESS_LOGIC_ERROR",
            ConflictCode::PendingApplications => "PENDING_APPLICATIONS",
            ConflictCode::EvaluationAlreadyRecorded => "EVALUATION_ALREADY_RECORDED",
        }
    }
}

/// Error raised by lifecycle operations. Callers receive a stable
/// `{code, message}` pair; store failures surface as internal errors with the
/// transaction already discarded.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{message}")]
    Conflict {
        code: ConflictCode,
        message: &'static str,
    },
    #[error("{0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::Validation { .. } => "VALIDATION_ERROR",
            LifecycleError::NotFound { .. } => "NOT_FOUND",
            LifecycleError::Conflict { code, .. } => code.code(),
            LifecycleError::Forbidden(_) => "FORBIDDEN",
            LifecycleError::Store(_) => "INTERNAL_ERROR",
        }
    }
}

fn not_found(entity: &'static str) -> LifecycleError {
    LifecycleError::NotFound { entity }
}

fn conflict(code: ConflictCode, message: &'static str) -> LifecycleError {
    LifecycleError::Conflict { code, message }
}

/// Trims the input, rejecting values that are empty after trimming.
fn require_text(field: &'static str, value: &str) -> Result<String, LifecycleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(trimmed.to_string())
}

/// Result of a batch expiry sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome {
    pub updated: usize,
    pub ids: Vec<InternshipId>,
}

/// Result of an expiring-internship reminder pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReminderOutcome {
    pub checked: usize,
    pub sent: usize,
}

/// Approval touches two entities atomically; both are returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalOutcome {
    pub application: Application,
    pub internship: Internship,
}

/// An internship together with its point-in-time progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternshipView {
    pub internship: Internship,
    pub progress: InternshipProgress,
}

/// The student-facing slice of the dual evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationView {
    pub teacher_score: Option<u8>,
    pub teacher_comment: Option<String>,
    pub enterprise_score: Option<u8>,
    pub enterprise_comment: Option<String>,
    pub final_score: Option<f32>,
    pub status: InternshipStatus,
}

/// The internship lifecycle engine: position capacity, application admission
/// and review, and post-approval internship tracking through dual evaluation.
///
/// Every operation runs as one store transaction. Notifications are collected
/// while the transaction is open and published only after commit; audit
/// entries are appended fire-and-forget.
pub struct LifecycleEngine<S, N, A> {
    store: Arc<S>,
    notifier: Arc<N>,
    audit: Arc<A>,
}

impl<S, N, A> LifecycleEngine<S, N, A>
where
    S: LifecycleStore + 'static,
    N: NotificationSink + 'static,
    A: AuditSink + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, audit: Arc<A>) -> Self {
        Self {
            store,
            notifier,
            audit,
        }
    }

    fn emit(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let count = notifications.len();
        if let Err(err) = self.notifier.publish_many(notifications) {
            tracing::warn!(%err, count, "dropping undeliverable notifications");
        }
    }

    fn record(&self, actor: Option<Actor>, operation: OperationKind, description: String) {
        let entry = AuditEntry::new(actor, operation, description);
        if let Err(err) = self.audit.append(entry) {
            tracing::warn!(%err, operation = operation.label(), "audit append failed");
        }
    }

    // --- Position & capacity manager -------------------------------------

    pub fn create_position(
        &self,
        enterprise_id: EnterpriseId,
        draft: PositionDraft,
    ) -> Result<Position, LifecycleError> {
        let title = require_text("title", &draft.title)?;
        let description = require_text("description", &draft.description)?;
        if draft.total_slots < 1 {
            return Err(LifecycleError::Validation {
                field: "total_slots",
                message: "must be at least 1",
            });
        }
        if draft.end_date <= draft.start_date {
            return Err(LifecycleError::Validation {
                field: "end_date",
                message: "must be after start_date",
            });
        }

        let mut tx = self.store.begin()?;
        if !tx.enterprise_exists(enterprise_id)? {
            return Err(not_found("enterprise"));
        }

        let position = tx.insert_position(Position {
            id: PositionId(0),
            enterprise_id,
            title: title.clone(),
            description,
            requirements: draft.requirements,
            total_slots: draft.total_slots,
            available_slots: draft.total_slots,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: PositionStatus::Open,
            created_at: Utc::now(),
        })?;
        tx.commit()?;

        self.record(
            Some(Actor::Enterprise(enterprise_id)),
            OperationKind::PositionCreate,
            format!("enterprise {enterprise_id} posted position: {title}"),
        );
        Ok(position)
    }

    pub fn update_position(
        &self,
        position_id: PositionId,
        enterprise_id: EnterpriseId,
        changes: PositionChanges,
    ) -> Result<Position, LifecycleError> {
        let mut tx = self.store.begin()?;
        let mut position = tx.position(position_id)?.ok_or_else(|| not_found("position"))?;
        if position.enterprise_id != enterprise_id {
            return Err(LifecycleError::Forbidden(
                "only the owning enterprise may update this position",
            ));
        }

        if let Some(title) = changes.title {
            position.title = require_text("title", &title)?;
        }
        if let Some(description) = changes.description {
            position.description = require_text("description", &description)?;
        }
        if let Some(requirements) = changes.requirements {
            position.requirements = Some(requirements);
        }
        if let Some(total_slots) = changes.total_slots {
            if total_slots < 1 {
                return Err(LifecycleError::Validation {
                    field: "total_slots",
                    message: "must be at least 1",
                });
            }
            // Slots already consumed by approvals stay consumed.
            let used = position.used_slots();
            position.total_slots = total_slots;
            position.available_slots = total_slots.saturating_sub(used);
        }
        let start_date = changes.start_date.unwrap_or(position.start_date);
        let end_date = changes.end_date.unwrap_or(position.end_date);
        if end_date <= start_date {
            return Err(LifecycleError::Validation {
                field: "end_date",
                message: "must be after start_date",
            });
        }
        position.start_date = start_date;
        position.end_date = end_date;

        position.refresh_status(Utc::now().date_naive());
        tx.update_position(&position)?;
        tx.commit()?;

        self.record(
            Some(Actor::Enterprise(enterprise_id)),
            OperationKind::PositionUpdate,
            format!("enterprise {enterprise_id} updated position #{position_id}"),
        );
        Ok(position)
    }

    pub fn delete_position(
        &self,
        position_id: PositionId,
        enterprise_id: EnterpriseId,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.store.begin()?;
        let position = tx.position(position_id)?.ok_or_else(|| not_found("position"))?;
        if position.enterprise_id != enterprise_id {
            return Err(LifecycleError::Forbidden(
                "only the owning enterprise may delete this position",
            ));
        }
        if tx.pending_application_count(position_id)? > 0 {
            return Err(conflict(
                ConflictCode::PendingApplications,
                "position still has pending applications",
            ));
        }
        tx.remove_position(position_id)?;
        tx.commit()?;

        self.record(
            Some(Actor::Enterprise(enterprise_id)),
            OperationKind::PositionDelete,
            format!("enterprise {enterprise_id} deleted position #{position_id}"),
        );
        Ok(())
    }

    /// Fetches one position, lazily persisting the closed derivation for
    /// past-end records.
    pub fn position(
        &self,
        position_id: PositionId,
        as_of: NaiveDate,
    ) -> Result<Position, LifecycleError> {
        let mut tx = self.store.begin()?;
        let mut position = tx.position(position_id)?.ok_or_else(|| not_found("position"))?;
        if position.refresh_status(as_of) {
            tx.update_position(&position)?;
            tx.commit()?;
        }
        Ok(position)
    }

    /// Lists every position, newest first, refreshing derived statuses on the
    /// way out.
    pub fn positions(&self, as_of: NaiveDate) -> Result<Vec<Position>, LifecycleError> {
        let mut tx = self.store.begin()?;
        let mut positions = tx.positions()?;
        let mut dirty = false;
        for position in &mut positions {
            if position.refresh_status(as_of) {
                tx.update_position(position)?;
                dirty = true;
            }
        }
        if dirty {
            tx.commit()?;
        }
        Ok(positions)
    }

    // --- Application admission & transition ------------------------------

    pub fn submit_application(
        &self,
        student_id: StudentId,
        request: ApplicationRequest,
    ) -> Result<Application, LifecycleError> {
        let personal_statement = require_text("personal_statement", &request.personal_statement)?;
        let contact_info = require_text("contact_info", &request.contact_info)?;

        let mut tx = self.store.begin()?;
        if !tx.student_exists(student_id)? {
            return Err(not_found("student"));
        }
        let position = tx
            .position(request.position_id)?
            .ok_or_else(|| not_found("position"))?;
        if tx.blocking_application_for_student(student_id)?.is_some() {
            return Err(conflict(
                ConflictCode::DuplicateApplication,
                "student already has a pending or approved application",
            ));
        }
        if position.available_slots == 0 {
            return Err(conflict(
                ConflictCode::PositionFull,
                "position has no available slots",
            ));
        }

        let application = tx.insert_application(Application {
            id: ApplicationId(0),
            student_id,
            position_id: position.id,
            status: ApplicationStatus::Pending,
            personal_statement,
            contact_info,
            rejection_reason: None,
            applied_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        })?;

        let notifications: Vec<Notification> = tx
            .teacher_ids()?
            .into_iter()
            .map(|teacher| Notification::application_submitted(teacher, &position.title))
            .collect();
        tx.commit()?;

        self.emit(notifications);
        self.record(
            Some(Actor::Student(student_id)),
            OperationKind::ApplicationSubmit,
            format!(
                "student {student_id} submitted application #{} for position #{}",
                application.id, position.id
            ),
        );
        Ok(application)
    }

    pub fn approve_application(
        &self,
        application_id: ApplicationId,
        teacher_id: TeacherId,
    ) -> Result<ApprovalOutcome, LifecycleError> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut tx = self.store.begin()?;
        if !tx.teacher_exists(teacher_id)? {
            return Err(not_found("teacher"));
        }
        let mut application = tx
            .application(application_id)?
            .ok_or_else(|| not_found("application"))?;
        application
            .transition(ApplicationStatus::Approved)
            .map_err(|_| {
                conflict(
                    ConflictCode::InvalidStatus,
                    "only pending applications can be reviewed",
                )
            })?;
        application.reviewed_at = Some(now);
        application.reviewed_by = Some(teacher_id);

        // The slot decrement works on the row read inside this transaction,
        // so concurrent approvals near zero slots cannot lose updates.
        let mut position = tx
            .position(application.position_id)?
            .ok_or_else(|| not_found("position"))?;

        let internship = tx.insert_internship(Internship {
            id: InternshipId(0),
            application_id: application.id,
            student_id: application.student_id,
            position_id: position.id,
            enterprise_id: position.enterprise_id,
            teacher_id,
            start_date: position.start_date,
            end_date: position.end_date,
            status: InternshipStatus::Ongoing,
            teacher_score: None,
            enterprise_score: None,
            final_score: None,
            teacher_comment: None,
            enterprise_comment: None,
            created_at: now,
        })?;

        position.decrement_slot(today);
        tx.update_application(&application)?;
        tx.update_position(&position)?;
        tx.commit()?;

        self.emit(vec![
            Notification::application_approved_student(application.student_id, &position.title),
            Notification::application_approved_enterprise(position.enterprise_id, &position.title),
        ]);
        self.record(
            Some(Actor::Teacher(teacher_id)),
            OperationKind::ApplicationApprove,
            format!("teacher {teacher_id} approved application #{application_id}"),
        );
        Ok(ApprovalOutcome {
            application,
            internship,
        })
    }

    pub fn reject_application(
        &self,
        application_id: ApplicationId,
        teacher_id: TeacherId,
        rejection_reason: &str,
    ) -> Result<Application, LifecycleError> {
        let reason = require_text("rejection_reason", rejection_reason)?;

        let mut tx = self.store.begin()?;
        if !tx.teacher_exists(teacher_id)? {
            return Err(not_found("teacher"));
        }
        let mut application = tx
            .application(application_id)?
            .ok_or_else(|| not_found("application"))?;
        application
            .transition(ApplicationStatus::Rejected)
            .map_err(|_| {
                conflict(
                    ConflictCode::InvalidStatus,
                    "only pending applications can be reviewed",
                )
            })?;
        application.rejection_reason = Some(reason.clone());
        application.reviewed_at = Some(Utc::now());
        application.reviewed_by = Some(teacher_id);

        let position = tx
            .position(application.position_id)?
            .ok_or_else(|| not_found("position"))?;
        tx.update_application(&application)?;
        tx.commit()?;

        self.emit(vec![Notification::application_rejected(
            application.student_id,
            &position.title,
            &reason,
        )]);
        self.record(
            Some(Actor::Teacher(teacher_id)),
            OperationKind::ApplicationReject,
            format!("teacher {teacher_id} rejected application #{application_id}: {reason}"),
        );
        Ok(application)
    }

    // --- Internship lifecycle & evaluation -------------------------------

    /// Batch sweep: every ongoing internship past its end date moves to
    /// pending evaluation. Safe to re-run; already-swept records no longer
    /// match the ongoing filter.
    pub fn sweep_expired(
        &self,
        as_of: NaiveDate,
        initiated_by: Option<Actor>,
    ) -> Result<SweepOutcome, LifecycleError> {
        let mut tx = self.store.begin()?;
        let mut expired = tx.expired_ongoing(as_of)?;
        let mut notifications = Vec::with_capacity(expired.len() * 2);
        let mut ids = Vec::with_capacity(expired.len());

        for internship in &mut expired {
            if !internship.expire_if_due(as_of) {
                continue;
            }
            tx.update_internship(internship)?;
            ids.push(internship.id);

            let title = tx
                .position(internship.position_id)?
                .map(|position| position.title)
                .unwrap_or_default();
            notifications.push(Notification::internship_expired_student(
                internship.student_id,
                &title,
            ));
            notifications.push(Notification::internship_expired_teacher(
                internship.teacher_id,
                &title,
            ));
        }
        tx.commit()?;

        self.emit(notifications);
        self.record(
            initiated_by,
            OperationKind::InternshipSweep,
            format!("expiry sweep as of {as_of} updated {} internship(s)", ids.len()),
        );
        Ok(SweepOutcome {
            updated: ids.len(),
            ids,
        })
    }

    /// Reminder pass over ongoing internships ending within the horizon.
    /// Read-only; one notification per student and per assigned teacher.
    pub fn remind_expiring(
        &self,
        as_of: NaiveDate,
        horizon_days: i64,
        initiated_by: Option<Actor>,
    ) -> Result<ReminderOutcome, LifecycleError> {
        let until = as_of + Duration::days(horizon_days.max(0));
        let tx = self.store.begin()?;
        let expiring = tx.expiring_ongoing(as_of, until)?;

        let mut notifications = Vec::with_capacity(expiring.len() * 2);
        for internship in &expiring {
            let days_remaining = (internship.end_date - as_of).num_days();
            let title = tx
                .position(internship.position_id)?
                .map(|position| position.title)
                .unwrap_or_default();
            notifications.push(Notification::internship_expiring_student(
                internship.student_id,
                &title,
                days_remaining,
            ));
            notifications.push(Notification::internship_expiring_teacher(
                internship.teacher_id,
                &title,
                days_remaining,
            ));
        }
        drop(tx);

        let outcome = ReminderOutcome {
            checked: expiring.len(),
            sent: notifications.len(),
        };
        self.emit(notifications);
        self.record(
            initiated_by,
            OperationKind::InternshipRemind,
            format!(
                "reminder pass as of {as_of} checked {} internship(s), sent {}",
                outcome.checked, outcome.sent
            ),
        );
        Ok(outcome)
    }

    /// Fetches one internship for a party to it, applying the expiry rule
    /// lazily so read staleness is bounded by read frequency.
    pub fn internship(
        &self,
        internship_id: InternshipId,
        actor: Actor,
        as_of: NaiveDate,
    ) -> Result<InternshipView, LifecycleError> {
        let mut tx = self.store.begin()?;
        let mut internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        if !actor.is_party_to(&internship) {
            return Err(LifecycleError::Forbidden(
                "caller is not a party to this internship",
            ));
        }
        if internship.expire_if_due(as_of) {
            tx.update_internship(&internship)?;
            tx.commit()?;
        }
        let progress = internship.progress(as_of);
        Ok(InternshipView {
            internship,
            progress,
        })
    }

    /// Role-scoped listing: each caller sees only placements they are a
    /// party to.
    pub fn internships(&self, actor: Actor) -> Result<Vec<Internship>, LifecycleError> {
        let tx = self.store.begin()?;
        Ok(tx.internships_for(actor)?)
    }

    /// Single entry point for the dual evaluation. The evaluator must be the
    /// internship's assigned teacher or its owning enterprise; each side may
    /// record exactly once. Aggregation runs in the same transaction, so no
    /// reader can observe both scores without the final score.
    pub fn submit_evaluation(
        &self,
        internship_id: InternshipId,
        evaluator: Evaluator,
        score: u8,
        comment: Option<String>,
    ) -> Result<Internship, LifecycleError> {
        if score > MAX_SCORE {
            return Err(LifecycleError::Validation {
                field: "score",
                message: "must be between 0 and 100",
            });
        }

        let mut tx = self.store.begin()?;
        let mut internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;

        match evaluator {
            Evaluator::Teacher(teacher_id) => {
                if !tx.teacher_exists(teacher_id)? {
                    return Err(not_found("teacher"));
                }
                if internship.teacher_id != teacher_id {
                    return Err(LifecycleError::Forbidden(
                        "only the assigned teacher may evaluate this internship",
                    ));
                }
            }
            Evaluator::Enterprise(enterprise_id) => {
                if !tx.enterprise_exists(enterprise_id)? {
                    return Err(not_found("enterprise"));
                }
                if internship.enterprise_id != enterprise_id {
                    return Err(LifecycleError::Forbidden(
                        "only the hosting enterprise may evaluate this internship",
                    ));
                }
            }
        }

        if !internship.status.accepts_evaluations() {
            return Err(conflict(
                ConflictCode::BusinessLogicError,
                "internship has not ended; evaluations are not open yet",
            ));
        }

        match evaluator {
            Evaluator::Teacher(_) => {
                if internship.teacher_score.is_some() {
                    return Err(conflict(
                        ConflictCode::EvaluationAlreadyRecorded,
                        "teacher evaluation already recorded",
                    ));
                }
                internship.teacher_score = Some(score);
                internship.teacher_comment = comment;
            }
            Evaluator::Enterprise(_) => {
                if internship.enterprise_score.is_some() {
                    return Err(conflict(
                        ConflictCode::EvaluationAlreadyRecorded,
                        "enterprise evaluation already recorded",
                    ));
                }
                internship.enterprise_score = Some(score);
                internship.enterprise_comment = comment;
            }
        }

        let completed = internship.aggregate_score();
        tx.update_internship(&internship)?;
        tx.commit()?;

        let mut notifications = vec![Notification::evaluation_submitted(
            internship.student_id,
            evaluator.role_label(),
            score,
        )];
        if completed {
            if let Some(final_score) = internship.final_score {
                notifications.push(Notification::internship_completed(
                    internship.student_id,
                    final_score,
                ));
            }
        }
        self.emit(notifications);
        self.record(
            Some(match evaluator {
                Evaluator::Teacher(id) => Actor::Teacher(id),
                Evaluator::Enterprise(id) => Actor::Enterprise(id),
            }),
            OperationKind::EvaluationSubmit,
            format!(
                "{} submitted evaluation for internship #{internship_id} with score {score}",
                evaluator.role_label()
            ),
        );
        Ok(internship)
    }

    /// The student's own view of both evaluations.
    pub fn evaluation(
        &self,
        internship_id: InternshipId,
        student_id: StudentId,
    ) -> Result<EvaluationView, LifecycleError> {
        let tx = self.store.begin()?;
        let internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        if internship.student_id != student_id {
            return Err(LifecycleError::Forbidden(
                "only the placed student may view this evaluation",
            ));
        }
        Ok(EvaluationView {
            teacher_score: internship.teacher_score,
            teacher_comment: internship.teacher_comment,
            enterprise_score: internship.enterprise_score,
            enterprise_comment: internship.enterprise_comment,
            final_score: internship.final_score,
            status: internship.status,
        })
    }

    // --- Logs & files (authorized child records) -------------------------

    pub fn append_log(
        &self,
        internship_id: InternshipId,
        actor: Actor,
        draft: LogEntryDraft,
    ) -> Result<InternshipLog, LifecycleError> {
        let content = require_text("content", &draft.content)?;

        let mut tx = self.store.begin()?;
        let internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        let Actor::Student(student_id) = actor else {
            return Err(LifecycleError::Forbidden(
                "only the placed student may submit logs",
            ));
        };
        if internship.student_id != student_id {
            return Err(LifecycleError::Forbidden(
                "only the placed student may submit logs",
            ));
        }

        let log = tx.insert_log(InternshipLog {
            id: 0,
            internship_id,
            content,
            log_date: draft.log_date,
            created_at: Utc::now(),
        })?;
        tx.commit()?;

        self.record(
            Some(actor),
            OperationKind::LogSubmit,
            format!("student {student_id} logged internship #{internship_id}"),
        );
        Ok(log)
    }

    pub fn logs(
        &self,
        internship_id: InternshipId,
        actor: Actor,
    ) -> Result<Vec<InternshipLog>, LifecycleError> {
        let tx = self.store.begin()?;
        let internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        if !actor.is_party_to(&internship) {
            return Err(LifecycleError::Forbidden(
                "caller is not a party to this internship",
            ));
        }
        Ok(tx.logs_for(internship_id)?)
    }

    pub fn register_file(
        &self,
        internship_id: InternshipId,
        actor: Actor,
        draft: FileDraft,
    ) -> Result<InternshipFile, LifecycleError> {
        let file_name = require_text("file_name", &draft.file_name)?;
        if draft.file_size > MAX_FILE_SIZE_BYTES {
            return Err(LifecycleError::Validation {
                field: "file_size",
                message: "must not exceed 10 MiB",
            });
        }
        if !ALLOWED_FILE_TYPES.contains(&draft.content_type.as_str()) {
            return Err(LifecycleError::Validation {
                field: "content_type",
                message: "only PDF, DOC, DOCX, JPG and PNG are accepted",
            });
        }

        let mut tx = self.store.begin()?;
        let internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        let Actor::Student(student_id) = actor else {
            return Err(LifecycleError::Forbidden(
                "only the placed student may attach files",
            ));
        };
        if internship.student_id != student_id {
            return Err(LifecycleError::Forbidden(
                "only the placed student may attach files",
            ));
        }

        let file = tx.insert_file(InternshipFile {
            id: 0,
            internship_id,
            file_name,
            file_size: draft.file_size,
            content_type: draft.content_type,
            uploaded_at: Utc::now(),
        })?;
        tx.commit()?;

        self.record(
            Some(actor),
            OperationKind::FileRegister,
            format!("student {student_id} attached a file to internship #{internship_id}"),
        );
        Ok(file)
    }

    pub fn files(
        &self,
        internship_id: InternshipId,
        actor: Actor,
    ) -> Result<Vec<InternshipFile>, LifecycleError> {
        let tx = self.store.begin()?;
        let internship = tx
            .internship(internship_id)?
            .ok_or_else(|| not_found("internship"))?;
        if !actor.is_party_to(&internship) {
            return Err(LifecycleError::Forbidden(
                "caller is not a party to this internship",
            ));
        }
        Ok(tx.files_for(internship_id)?)
    }
}
