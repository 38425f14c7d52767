//! Internship lifecycle engine: enterprise positions with slot capacity,
//! student applications reviewed by teachers, and the supervised internship
//! that follows approval through expiry and dual evaluation.
//!
//! State machines live in [`domain`], the transactional persistence seam in
//! [`store`], and the orchestration in [`engine`]. The [`router`] module
//! exposes the engine over HTTP; [`memory`] provides the reference store used
//! by the service binary and the test suite.

pub mod audit;
pub mod domain;
pub mod engine;
pub mod memory;
pub mod notify;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use audit::{AuditEntry, AuditError, AuditSink, OperationKind};
pub use domain::{
    Actor, Application, ApplicationId, ApplicationRequest, ApplicationStatus, EnterpriseId,
    Evaluator, FileDraft, Internship, InternshipFile, InternshipId, InternshipLog,
    InternshipProgress, InternshipStatus, InvalidTransition, LogEntryDraft, Position,
    PositionChanges, PositionDraft, PositionId, PositionStatus, StudentId, TeacherId,
    ALLOWED_FILE_TYPES, MAX_FILE_SIZE_BYTES, MAX_SCORE,
};
pub use engine::{
    ApprovalOutcome, ConflictCode, EvaluationView, InternshipView, LifecycleEngine,
    LifecycleError, ReminderOutcome, SweepOutcome,
};
pub use memory::MemoryStore;
pub use notify::{Notification, NotificationKind, NotificationSink, NotifyError};
pub use router::lifecycle_router;
pub use store::{LifecycleStore, LifecycleTx, StoreError};
