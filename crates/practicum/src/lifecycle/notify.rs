use serde::{Deserialize, Serialize};

use super::domain::{Actor, EnterpriseId, StudentId, TeacherId};

/// Category tag attached to every outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationSubmitted,
    ApplicationApproved,
    ApplicationRejected,
    EvaluationSubmitted,
    InternshipCompleted,
    InternshipExpiring,
    InternshipExpired,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ApplicationSubmitted => "application_submitted",
            NotificationKind::ApplicationApproved => "application_approved",
            NotificationKind::ApplicationRejected => "application_rejected",
            NotificationKind::EvaluationSubmitted => "evaluation_submitted",
            NotificationKind::InternshipCompleted => "internship_completed",
            NotificationKind::InternshipExpiring => "internship_expiring",
            NotificationKind::InternshipExpired => "internship_expired",
        }
    }
}

/// Message addressed to one party of the lifecycle. The engine collects these
/// during a transaction and publishes them only after the commit succeeds, so
/// delivery problems can never corrupt lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Actor,
    pub title: String,
    pub content: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn application_submitted(teacher: TeacherId, position_title: &str) -> Self {
        Self {
            recipient: Actor::Teacher(teacher),
            title: "New internship application awaiting review".to_string(),
            content: format!("A student applied for the position: {position_title}"),
            kind: NotificationKind::ApplicationSubmitted,
        }
    }

    pub fn application_approved_student(student: StudentId, position_title: &str) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: "Internship application approved".to_string(),
            content: format!("Your application was approved for the position: {position_title}"),
            kind: NotificationKind::ApplicationApproved,
        }
    }

    pub fn application_approved_enterprise(enterprise: EnterpriseId, position_title: &str) -> Self {
        Self {
            recipient: Actor::Enterprise(enterprise),
            title: "New intern placed".to_string(),
            content: format!("A student's application was approved for the position: {position_title}"),
            kind: NotificationKind::ApplicationApproved,
        }
    }

    pub fn application_rejected(student: StudentId, position_title: &str, reason: &str) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: "Internship application rejected".to_string(),
            content: format!(
                "Your application for the position {position_title} was rejected. Reason: {reason}"
            ),
            kind: NotificationKind::ApplicationRejected,
        }
    }

    pub fn evaluation_submitted(student: StudentId, evaluator_role: &str, score: u8) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: format!("New {evaluator_role} evaluation recorded"),
            content: format!("An evaluation of your internship was submitted with score {score}"),
            kind: NotificationKind::EvaluationSubmitted,
        }
    }

    pub fn internship_completed(student: StudentId, final_score: f32) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: "Internship evaluation complete".to_string(),
            content: format!("Both evaluations are in. Final score: {final_score}"),
            kind: NotificationKind::InternshipCompleted,
        }
    }

    pub fn internship_expired_student(student: StudentId, position_title: &str) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: "Internship period ended".to_string(),
            content: format!(
                "Your internship for the position {position_title} has ended. Evaluations are now open."
            ),
            kind: NotificationKind::InternshipExpired,
        }
    }

    pub fn internship_expired_teacher(teacher: TeacherId, position_title: &str) -> Self {
        Self {
            recipient: Actor::Teacher(teacher),
            title: "Student internship ended, evaluation due".to_string(),
            content: format!(
                "A supervised internship for the position {position_title} has ended. Please submit your evaluation."
            ),
            kind: NotificationKind::InternshipExpired,
        }
    }

    pub fn internship_expiring_student(
        student: StudentId,
        position_title: &str,
        days_remaining: i64,
    ) -> Self {
        Self {
            recipient: Actor::Student(student),
            title: "Internship ending soon".to_string(),
            content: format!(
                "Your internship for the position {position_title} ends in {days_remaining} day(s)."
            ),
            kind: NotificationKind::InternshipExpiring,
        }
    }

    pub fn internship_expiring_teacher(
        teacher: TeacherId,
        position_title: &str,
        days_remaining: i64,
    ) -> Self {
        Self {
            recipient: Actor::Teacher(teacher),
            title: "Student internship ending soon".to_string(),
            content: format!(
                "A supervised internship for the position {position_title} ends in {days_remaining} day(s)."
            ),
            kind: NotificationKind::InternshipExpiring,
        }
    }
}

/// Delivery failure for the notification channel.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound notification channel. Best-effort: the engine logs and swallows
/// failures rather than failing the lifecycle operation that triggered them.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError>;

    fn publish_many(&self, notifications: Vec<Notification>) -> Result<(), NotifyError> {
        for notification in notifications {
            self.publish(notification)?;
        }
        Ok(())
    }
}
