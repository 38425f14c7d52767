use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::lifecycle::audit::{AuditEntry, AuditError, AuditSink};
use crate::lifecycle::domain::{
    ApplicationRequest, EnterpriseId, Internship, PositionDraft, StudentId, TeacherId,
};
use crate::lifecycle::engine::LifecycleEngine;
use crate::lifecycle::memory::MemoryStore;
use crate::lifecycle::notify::{Notification, NotificationKind, NotificationSink, NotifyError};

pub(super) const STUDENT: StudentId = StudentId(1);
pub(super) const OTHER_STUDENT: StudentId = StudentId(2);
pub(super) const TEACHER: TeacherId = TeacherId(10);
pub(super) const OTHER_TEACHER: TeacherId = TeacherId(11);
pub(super) const ENTERPRISE: EnterpriseId = EnterpriseId(20);
pub(super) const OTHER_ENTERPRISE: EnterpriseId = EnterpriseId(21);

pub(super) type TestEngine = LifecycleEngine<MemoryStore, CollectingNotifier, CollectingAudit>;

#[derive(Default)]
pub(super) struct CollectingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn count_of(&self, kind: NotificationKind) -> usize {
        self.events()
            .iter()
            .filter(|notification| notification.kind == kind)
            .count()
    }
}

impl NotificationSink for CollectingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Sink whose transport always fails, for best-effort delivery tests.
pub(super) struct FailingNotifier;

impl NotificationSink for FailingNotifier {
    fn publish(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("wire down".to_string()))
    }
}

#[derive(Default)]
pub(super) struct CollectingAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl CollectingAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for CollectingAudit {
    fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.register_student(STUDENT);
    store.register_student(OTHER_STUDENT);
    store.register_teacher(TEACHER);
    store.register_enterprise(ENTERPRISE);
    store.register_enterprise(OTHER_ENTERPRISE);
    store
}

pub(super) fn build_engine() -> (
    Arc<TestEngine>,
    Arc<MemoryStore>,
    Arc<CollectingNotifier>,
    Arc<CollectingAudit>,
) {
    let store = seeded_store();
    let notifier = Arc::new(CollectingNotifier::default());
    let audit = Arc::new(CollectingAudit::default());
    let engine = Arc::new(LifecycleEngine::new(
        store.clone(),
        notifier.clone(),
        audit.clone(),
    ));
    (engine, store, notifier, audit)
}

pub(super) fn draft() -> PositionDraft {
    PositionDraft {
        title: "Backend Engineering Intern".to_string(),
        description: "Work on the placement platform services".to_string(),
        requirements: Some("Comfortable with SQL".to_string()),
        total_slots: 2,
        start_date: date(2026, 9, 1),
        end_date: date(2026, 12, 1),
    }
}

pub(super) fn single_slot_draft() -> PositionDraft {
    PositionDraft {
        total_slots: 1,
        ..draft()
    }
}

pub(super) fn request(position: crate::lifecycle::domain::PositionId) -> ApplicationRequest {
    ApplicationRequest {
        position_id: position,
        personal_statement: "I want to learn distributed systems".to_string(),
        contact_info: "student@example.edu".to_string(),
    }
}

/// Creates a position, submits an application, and approves it.
pub(super) fn approved_internship(engine: &TestEngine) -> Internship {
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");
    engine
        .approve_application(application.id, TEACHER)
        .expect("application approved")
        .internship
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
