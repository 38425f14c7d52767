use super::common::*;
use crate::lifecycle::domain::{ApplicationRequest, ApplicationStatus, StudentId};
use crate::lifecycle::engine::{ConflictCode, LifecycleEngine, LifecycleError};
use crate::lifecycle::notify::NotificationKind;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn submit_creates_pending_application() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");

    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.student_id, STUDENT);
    assert_eq!(application.position_id, position.id);
    assert!(application.reviewed_at.is_none());
}

#[test]
fn submit_notifies_every_registered_teacher() {
    let (engine, store, notifier, _) = build_engine();
    store.register_teacher(OTHER_TEACHER);
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");

    engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    assert_eq!(notifier.count_of(NotificationKind::ApplicationSubmitted), 2);
}

#[test]
fn submit_rejects_second_active_application() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    engine
        .submit_application(STUDENT, request(position.id))
        .expect("first submission");

    let err = engine
        .submit_application(STUDENT, request(position.id))
        .expect_err("second submission blocked");

    assert!(matches!(
        err,
        LifecycleError::Conflict {
            code: ConflictCode::DuplicateApplication,
            ..
        }
    ));
}

#[test]
fn rejected_student_can_reapply() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let first = engine
        .submit_application(STUDENT, request(position.id))
        .expect("first submission");
    engine
        .reject_application(first.id, TEACHER, "Missing prerequisites")
        .expect("rejection recorded");

    engine
        .submit_application(STUDENT, request(position.id))
        .expect("reapplication accepted");
}

#[test]
fn submit_rejects_full_position() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, single_slot_draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("first submission");
    engine
        .approve_application(application.id, TEACHER)
        .expect("approval consumes the slot");

    let err = engine
        .submit_application(OTHER_STUDENT, request(position.id))
        .expect_err("full position rejected");

    assert!(matches!(
        err,
        LifecycleError::Conflict {
            code: ConflictCode::PositionFull,
            ..
        }
    ));
}

#[test]
fn submit_requires_known_student() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");

    let err = engine
        .submit_application(StudentId(999), request(position.id))
        .expect_err("unknown student rejected");

    assert!(matches!(err, LifecycleError::NotFound { entity: "student" }));
}

#[test]
fn submit_requires_personal_statement() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");

    let err = engine
        .submit_application(
            STUDENT,
            ApplicationRequest {
                personal_statement: "  ".to_string(),
                ..request(position.id)
            },
        )
        .expect_err("blank statement rejected");

    assert!(matches!(
        err,
        LifecycleError::Validation {
            field: "personal_statement",
            ..
        }
    ));
}

#[test]
fn approve_creates_internship_and_consumes_slot() {
    let (engine, _, notifier, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    let outcome = engine
        .approve_application(application.id, TEACHER)
        .expect("application approved");

    assert_eq!(outcome.application.status, ApplicationStatus::Approved);
    assert_eq!(outcome.application.reviewed_by, Some(TEACHER));
    assert_eq!(outcome.internship.student_id, STUDENT);
    assert_eq!(outcome.internship.teacher_id, TEACHER);
    assert_eq!(outcome.internship.start_date, position.start_date);
    assert_eq!(outcome.internship.end_date, position.end_date);

    let refreshed = engine
        .position(position.id, date(2026, 9, 15))
        .expect("position readable");
    assert_eq!(refreshed.available_slots, 1);

    assert_eq!(notifier.count_of(NotificationKind::ApplicationApproved), 2);
}

#[test]
fn approve_is_rejected_for_reviewed_application() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");
    engine
        .approve_application(application.id, TEACHER)
        .expect("first review");

    let err = engine
        .approve_application(application.id, TEACHER)
        .expect_err("second review blocked");

    assert!(matches!(
        err,
        LifecycleError::Conflict {
            code: ConflictCode::InvalidStatus,
            ..
        }
    ));
}

#[test]
fn racing_reviews_admit_exactly_one_approval() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, single_slot_draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.approve_application(application.id, TEACHER)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("reviewer thread joins"))
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    let loss = results
        .into_iter()
        .find(|result| result.is_err())
        .expect("one review loses the race")
        .expect_err("loser is an error");
    assert!(matches!(
        loss,
        LifecycleError::Conflict {
            code: ConflictCode::InvalidStatus,
            ..
        }
    ));

    // The slot was consumed exactly once.
    let refreshed = engine
        .position(position.id, date(2026, 9, 15))
        .expect("position readable");
    assert_eq!(refreshed.available_slots, 0);
    assert_eq!(refreshed.used_slots(), 1);
}

#[test]
fn reject_requires_reason() {
    let (engine, _, _, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    let err = engine
        .reject_application(application.id, TEACHER, "   ")
        .expect_err("blank reason rejected");

    assert!(matches!(
        err,
        LifecycleError::Validation {
            field: "rejection_reason",
            ..
        }
    ));
}

#[test]
fn reject_records_reason_and_notifies_student() {
    let (engine, _, notifier, _) = build_engine();
    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("application submitted");

    let rejected = engine
        .reject_application(application.id, TEACHER, "Missing prerequisites")
        .expect("rejection recorded");

    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Missing prerequisites")
    );

    let rejection = notifier
        .events()
        .into_iter()
        .find(|event| event.kind == NotificationKind::ApplicationRejected)
        .expect("student notified");
    assert!(rejection.content.contains("Missing prerequisites"));
}

#[test]
fn notification_failures_do_not_fail_the_operation() {
    let store = seeded_store();
    let notifier = Arc::new(FailingNotifier);
    let audit = Arc::new(CollectingAudit::default());
    let engine = LifecycleEngine::new(store, notifier, audit);

    let position = engine
        .create_position(ENTERPRISE, draft())
        .expect("position created");
    let application = engine
        .submit_application(STUDENT, request(position.id))
        .expect("submission survives dead notifier");

    assert_eq!(application.status, ApplicationStatus::Pending);
}
