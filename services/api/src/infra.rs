use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use practicum::lifecycle::{
    AuditEntry, AuditError, AuditSink, EnterpriseId, MemoryStore, Notification, NotificationSink,
    NotifyError, StudentId, TeacherId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notification sink that writes each message to the service log. A real
/// deployment would hand these to the campus messaging gateway.
#[derive(Default)]
pub(crate) struct LoggingNotifier;

impl NotificationSink for LoggingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = notification.recipient.role_label(),
            kind = notification.kind.label(),
            title = %notification.title,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        tracing::debug!(operation = entry.operation.label(), "audit entry recorded");
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

/// Seeds the roster the service runs with until a campus directory is wired
/// in: ids 1-20 are students, 101-105 teachers, 201-203 enterprises.
pub(crate) fn seed_roster(store: &MemoryStore) {
    for id in 1..=20 {
        store.register_student(StudentId(id));
    }
    for id in 101..=105 {
        store.register_teacher(TeacherId(id));
    }
    for id in 201..=203 {
        store.register_enterprise(EnterpriseId(id));
    }
}

/// Maps an attachment name to the content type reported to the engine.
pub(crate) fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
