//! End-to-end scenarios for the internship lifecycle, driven entirely through
//! the public engine facade: position capacity accounting, application review,
//! the expiry sweep, and the dual evaluation that closes a placement out.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use practicum::lifecycle::{
        AuditEntry, AuditError, AuditSink, EnterpriseId, LifecycleEngine, MemoryStore,
        Notification, NotificationKind, NotificationSink, NotifyError, PositionDraft, StudentId,
        TeacherId,
    };

    pub const STUDENTS: [StudentId; 5] = [
        StudentId(1),
        StudentId(2),
        StudentId(3),
        StudentId(4),
        StudentId(5),
    ];
    pub const WAITLISTED: StudentId = StudentId(6);
    pub const TEACHER: TeacherId = TeacherId(10);
    pub const ENTERPRISE: EnterpriseId = EnterpriseId(20);

    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn count_of(&self, kind: NotificationKind) -> usize {
            self.events
                .lock()
                .expect("notifier mutex poisoned")
                .iter()
                .filter(|notification| notification.kind == kind)
                .count()
        }
    }

    impl NotificationSink for RecordingNotifier {
        fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
            self.events
                .lock()
                .expect("notifier mutex poisoned")
                .push(notification);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingAudit {
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl RecordingAudit {
        pub fn len(&self) -> usize {
            self.entries.lock().expect("audit mutex poisoned").len()
        }
    }

    impl AuditSink for RecordingAudit {
        fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
            self.entries
                .lock()
                .expect("audit mutex poisoned")
                .push(entry);
            Ok(())
        }
    }

    pub type WorkflowEngine = LifecycleEngine<MemoryStore, RecordingNotifier, RecordingAudit>;

    pub fn build_engine() -> (
        std::sync::Arc<WorkflowEngine>,
        Arc<RecordingNotifier>,
        Arc<RecordingAudit>,
    ) {
        let store = Arc::new(MemoryStore::new());
        for student in STUDENTS {
            store.register_student(student);
        }
        store.register_student(WAITLISTED);
        store.register_teacher(TEACHER);
        store.register_enterprise(ENTERPRISE);

        let notifier = Arc::new(RecordingNotifier::default());
        let audit = Arc::new(RecordingAudit::default());
        let engine = Arc::new(LifecycleEngine::new(
            store,
            notifier.clone(),
            audit.clone(),
        ));
        (engine, notifier, audit)
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    pub fn cohort_position() -> PositionDraft {
        PositionDraft {
            title: "Data Platform Intern".to_string(),
            description: "Build ingestion pipelines for the analytics team".to_string(),
            requirements: None,
            total_slots: 5,
            start_date: date(2026, 9, 1),
            end_date: date(2026, 12, 1),
        }
    }
}

use common::*;
use practicum::lifecycle::{
    Actor, ApplicationRequest, ConflictCode, Evaluator, InternshipStatus, LifecycleError,
    NotificationKind, PositionStatus,
};

fn apply(
    engine: &WorkflowEngine,
    student: practicum::lifecycle::StudentId,
    position: practicum::lifecycle::PositionId,
) -> Result<practicum::lifecycle::Application, LifecycleError> {
    engine.submit_application(
        student,
        ApplicationRequest {
            position_id: position,
            personal_statement: "Eager to work on data infrastructure".to_string(),
            contact_info: "cohort@example.edu".to_string(),
        },
    )
}

#[test]
fn cohort_fills_every_slot_and_then_turns_students_away() {
    let (engine, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, cohort_position())
        .expect("position created");

    for student in STUDENTS {
        let application = apply(&engine, student, position.id).expect("submission accepted");
        engine
            .approve_application(application.id, TEACHER)
            .expect("approval succeeds");
    }

    let filled = engine
        .position(position.id, date(2026, 9, 15))
        .expect("position readable");
    assert_eq!(filled.available_slots, 0);
    assert_eq!(filled.status, PositionStatus::Full);

    let err = apply(&engine, WAITLISTED, position.id).expect_err("sixth student turned away");
    assert!(matches!(
        err,
        LifecycleError::Conflict {
            code: ConflictCode::PositionFull,
            ..
        }
    ));
}

#[test]
fn full_lifecycle_from_application_to_final_score() {
    let (engine, notifier, audit) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, cohort_position())
        .expect("position created");

    let application = apply(&engine, STUDENTS[0], position.id).expect("submission accepted");
    let outcome = engine
        .approve_application(application.id, TEACHER)
        .expect("approval succeeds");
    let internship = outcome.internship;
    assert_eq!(internship.status, InternshipStatus::Ongoing);

    // Midway through the placement the student can see progress.
    let view = engine
        .internship(internship.id, Actor::Student(STUDENTS[0]), date(2026, 10, 16))
        .expect("internship readable");
    assert_eq!(view.progress.total_days, 91);
    assert_eq!(view.progress.completed_days, 45);
    assert!(!view.progress.is_completed);

    // The sweep closes the placement after the end date; a rerun is a no-op.
    let sweep = engine
        .sweep_expired(date(2026, 12, 2), None)
        .expect("sweep runs");
    assert_eq!(sweep.updated, 1);
    let rerun = engine
        .sweep_expired(date(2026, 12, 2), None)
        .expect("sweep reruns");
    assert_eq!(rerun.updated, 0);

    // Both sides evaluate; the final score is the equal-weight average.
    engine
        .submit_evaluation(internship.id, Evaluator::Teacher(TEACHER), 88, None)
        .expect("teacher evaluation");
    let completed = engine
        .submit_evaluation(internship.id, Evaluator::Enterprise(ENTERPRISE), 92, None)
        .expect("enterprise evaluation");
    assert_eq!(completed.status, InternshipStatus::Completed);
    assert_eq!(completed.final_score, Some(90.0));

    let evaluation = engine
        .evaluation(internship.id, STUDENTS[0])
        .expect("student view");
    assert_eq!(evaluation.teacher_score, Some(88));
    assert_eq!(evaluation.enterprise_score, Some(92));

    assert_eq!(notifier.count_of(NotificationKind::InternshipCompleted), 1);
    // position create, submit, approve, sweep x2, evaluation x2.
    assert_eq!(audit.len(), 7);
}

#[test]
fn approved_students_cannot_double_book_themselves() {
    let (engine, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, cohort_position())
        .expect("position created");

    let application = apply(&engine, STUDENTS[0], position.id).expect("submission accepted");
    engine
        .approve_application(application.id, TEACHER)
        .expect("approval succeeds");

    let err = apply(&engine, STUDENTS[0], position.id).expect_err("second booking blocked");
    assert!(matches!(
        err,
        LifecycleError::Conflict {
            code: ConflictCode::DuplicateApplication,
            ..
        }
    ));
}
