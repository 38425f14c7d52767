use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Actor;

/// Operation categories recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    PositionCreate,
    PositionUpdate,
    PositionDelete,
    ApplicationSubmit,
    ApplicationApprove,
    ApplicationReject,
    EvaluationSubmit,
    InternshipSweep,
    InternshipRemind,
    LogSubmit,
    FileRegister,
}

impl OperationKind {
    pub const fn label(self) -> &'static str {
        match self {
            OperationKind::PositionCreate => "position_create",
            OperationKind::PositionUpdate => "position_update",
            OperationKind::PositionDelete => "position_delete",
            OperationKind::ApplicationSubmit => "application_submit",
            OperationKind::ApplicationApprove => "application_approve",
            OperationKind::ApplicationReject => "application_reject",
            OperationKind::EvaluationSubmit => "evaluation_submit",
            OperationKind::InternshipSweep => "internship_sweep",
            OperationKind::InternshipRemind => "internship_remind",
            OperationKind::LogSubmit => "log_submit",
            OperationKind::FileRegister => "file_register",
        }
    }
}

/// One line of the append-only operation log. `actor` is absent for entries
/// produced by scheduled passes rather than a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: Option<Actor>,
    pub operation: OperationKind,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor: Option<Actor>, operation: OperationKind, description: String) -> Self {
        Self {
            actor,
            operation,
            description,
            recorded_at: Utc::now(),
        }
    }
}

/// Append failure for the audit channel.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only operation log. Fire-and-forget: the engine never lets an
/// audit failure surface to the caller.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: AuditEntry) -> Result<(), AuditError>;
}
