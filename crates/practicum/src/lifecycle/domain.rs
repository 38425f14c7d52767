use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Identifier for an enterprise-posted internship opening.
    PositionId
);
id_newtype!(
    /// Identifier for a student's application to a position.
    ApplicationId
);
id_newtype!(
    /// Identifier for the placement record created upon approval.
    InternshipId
);
id_newtype!(StudentId);
id_newtype!(TeacherId);
id_newtype!(EnterpriseId);

/// Maximum evaluation score on either side of the dual evaluation.
pub const MAX_SCORE: u8 = 100;

/// Raised when a status transition outside the allowed table is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move {entity} from {from} to {to}")]
pub struct InvalidTransition {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

/// Derived capacity status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Full,
    Closed,
}

impl PositionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PositionStatus::Open => "open",
            PositionStatus::Full => "full",
            PositionStatus::Closed => "closed",
        }
    }

    /// Pure derivation rule: closed past the end date, full at zero slots,
    /// otherwise open. Reopens a full position when slots are restored.
    pub fn derive(end_date: NaiveDate, available_slots: u32, as_of: NaiveDate) -> Self {
        if end_date < as_of {
            PositionStatus::Closed
        } else if available_slots == 0 {
            PositionStatus::Full
        } else {
            PositionStatus::Open
        }
    }
}

/// An enterprise-posted internship opening with slot capacity and a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub enterprise_id: EnterpriseId,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub total_slots: u32,
    pub available_slots: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PositionStatus,
    pub created_at: DateTime<Utc>,
}

impl Position {
    /// Recomputes the derived status in place; returns whether it changed.
    pub fn refresh_status(&mut self, as_of: NaiveDate) -> bool {
        let next = PositionStatus::derive(self.end_date, self.available_slots, as_of);
        if next != self.status {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Consumes one slot on approval. Saturates at zero; never negative.
    pub fn decrement_slot(&mut self, as_of: NaiveDate) {
        self.available_slots = self.available_slots.saturating_sub(1);
        self.refresh_status(as_of);
    }

    pub fn used_slots(&self) -> u32 {
        self.total_slots.saturating_sub(self.available_slots)
    }
}

/// Fields supplied by an enterprise when posting a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    pub total_slots: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update applied to an existing position by its owning enterprise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub total_slots: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Review state of an application. Pending is initial; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// An application in one of these states blocks further submissions by
    /// the same student.
    pub const fn blocks_new_submission(self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Approved)
    }
}

/// A student's request to fill a position, reviewed exactly once by a teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub position_id: PositionId,
    pub status: ApplicationStatus,
    pub personal_statement: String,
    pub contact_info: String,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<TeacherId>,
}

impl Application {
    /// The only legal transitions are pending -> approved and pending -> rejected.
    pub fn transition(&mut self, next: ApplicationStatus) -> Result<(), InvalidTransition> {
        match (self.status, next) {
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
            | (ApplicationStatus::Pending, ApplicationStatus::Rejected) => {
                self.status = next;
                Ok(())
            }
            (from, to) => Err(InvalidTransition {
                entity: "application",
                from: from.label(),
                to: to.label(),
            }),
        }
    }
}

/// Submission payload for a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub position_id: PositionId,
    pub personal_statement: String,
    pub contact_info: String,
}

/// Lifecycle state of a placement. Completed is reached only through the
/// dual-evaluation aggregation and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    Ongoing,
    PendingEvaluation,
    Completed,
}

impl InternshipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InternshipStatus::Ongoing => "ongoing",
            InternshipStatus::PendingEvaluation => "pending_evaluation",
            InternshipStatus::Completed => "completed",
        }
    }

    /// Evaluations are accepted only once the placement has run its course.
    pub const fn accepts_evaluations(self) -> bool {
        matches!(
            self,
            InternshipStatus::PendingEvaluation | InternshipStatus::Completed
        )
    }
}

/// The supervised placement record created as a side effect of approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internship {
    pub id: InternshipId,
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub position_id: PositionId,
    pub enterprise_id: EnterpriseId,
    pub teacher_id: TeacherId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: InternshipStatus,
    pub teacher_score: Option<u8>,
    pub enterprise_score: Option<u8>,
    pub final_score: Option<f32>,
    pub teacher_comment: Option<String>,
    pub enterprise_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Internship {
    pub fn transition(&mut self, next: InternshipStatus) -> Result<(), InvalidTransition> {
        match (self.status, next) {
            (InternshipStatus::Ongoing, InternshipStatus::PendingEvaluation)
            | (InternshipStatus::PendingEvaluation, InternshipStatus::Completed) => {
                self.status = next;
                Ok(())
            }
            (from, to) => Err(InvalidTransition {
                entity: "internship",
                from: from.label(),
                to: to.label(),
            }),
        }
    }

    /// Moves an ongoing placement past its end date into pending evaluation.
    /// Returns whether the status changed; already-expired records are left
    /// untouched so the sweep stays idempotent.
    pub fn expire_if_due(&mut self, as_of: NaiveDate) -> bool {
        if self.status == InternshipStatus::Ongoing && self.end_date < as_of {
            self.status = InternshipStatus::PendingEvaluation;
            true
        } else {
            false
        }
    }

    /// Aggregates the dual evaluation the instant both scores are present:
    /// equal-weight average persisted as the final score, status advanced to
    /// completed (one-way). Returns whether the record just completed.
    pub fn aggregate_score(&mut self) -> bool {
        let (Some(teacher), Some(enterprise)) = (self.teacher_score, self.enterprise_score) else {
            return false;
        };
        self.final_score = Some(0.5 * f32::from(teacher) + 0.5 * f32::from(enterprise));
        if self.status != InternshipStatus::Completed {
            self.status = InternshipStatus::Completed;
            true
        } else {
            false
        }
    }

    pub fn progress(&self, as_of: NaiveDate) -> InternshipProgress {
        InternshipProgress::compute(self.start_date, self.end_date, as_of)
    }
}

/// Point-in-time progress of a placement. Pure arithmetic over calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipProgress {
    pub total_days: i64,
    pub completed_days: i64,
    pub percentage: u8,
    pub is_completed: bool,
}

impl InternshipProgress {
    pub fn compute(start_date: NaiveDate, end_date: NaiveDate, as_of: NaiveDate) -> Self {
        let total_days = (end_date - start_date).num_days();
        let completed_days = (as_of - start_date).num_days().clamp(0, total_days.max(0));
        let percentage = if total_days > 0 {
            let ratio = completed_days as f64 / total_days as f64;
            (ratio * 100.0).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        Self {
            total_days,
            completed_days,
            percentage,
            is_completed: completed_days >= total_days,
        }
    }
}

/// Daily log entry written by the student during the placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternshipLog {
    pub id: u64,
    pub internship_id: InternshipId,
    pub content: String,
    pub log_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a document attached to the placement. Byte storage is the
/// platform's job; the engine records and authorizes the metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternshipFile {
    pub id: u64,
    pub internship_id: InternshipId,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Upper bound on attached file size (10 MiB, matching the upload policy).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted for internship attachments.
pub const ALLOWED_FILE_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

/// A resolved caller, as handed to the engine by the platform's identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Actor {
    Student(StudentId),
    Teacher(TeacherId),
    Enterprise(EnterpriseId),
}

impl Actor {
    pub const fn role_label(self) -> &'static str {
        match self {
            Actor::Student(_) => "student",
            Actor::Teacher(_) => "teacher",
            Actor::Enterprise(_) => "enterprise",
        }
    }

    /// Whether this caller is one of the three parties to the internship.
    pub fn is_party_to(self, internship: &Internship) -> bool {
        match self {
            Actor::Student(id) => internship.student_id == id,
            Actor::Teacher(id) => internship.teacher_id == id,
            Actor::Enterprise(id) => internship.enterprise_id == id,
        }
    }
}

/// Capability-bound evaluator identity for the dual evaluation. One entry
/// point, two variants, shared aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Evaluator {
    Teacher(TeacherId),
    Enterprise(EnterpriseId),
}

impl Evaluator {
    pub const fn role_label(self) -> &'static str {
        match self {
            Evaluator::Teacher(_) => "teacher",
            Evaluator::Enterprise(_) => "enterprise",
        }
    }
}

/// New log payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntryDraft {
    pub content: String,
    pub log_date: NaiveDate,
}

/// New file-metadata payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDraft {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
}
