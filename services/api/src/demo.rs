use crate::infra::{guess_content_type, seed_roster, InMemoryAuditLog};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use practicum::error::AppError;
use practicum::lifecycle::{
    Actor, ApplicationRequest, EnterpriseId, Evaluator, FileDraft, LifecycleEngine, LogEntryDraft,
    MemoryStore, Notification, NotificationSink, NotifyError, PositionDraft, StudentId, TeacherId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Internship start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Internship end date (YYYY-MM-DD). Defaults to start_date + 90 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Skip the evaluation portion of the demo.
    #[arg(long)]
    pub(crate) skip_evaluation: bool,
}

/// Notification sink that narrates deliveries on stdout for the CLI demo.
struct PrintingNotifier;

impl NotificationSink for PrintingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        println!(
            "  [notify:{}] to {} -> {}",
            notification.kind.label(),
            notification.recipient.role_label(),
            notification.title
        );
        Ok(())
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start_date = args.start_date.unwrap_or_else(|| Local::now().date_naive());
    let end_date = args
        .end_date
        .unwrap_or_else(|| start_date + Duration::days(90));

    let enterprise = EnterpriseId(201);
    let teacher = TeacherId(101);
    let admitted = StudentId(1);
    let declined = StudentId(2);

    let store = Arc::new(MemoryStore::new());
    seed_roster(&store);
    let audit = Arc::new(InMemoryAuditLog::default());
    let engine = LifecycleEngine::new(store, Arc::new(PrintingNotifier), audit.clone());

    println!("Internship lifecycle demo ({start_date} -> {end_date})");

    println!("\nEnterprise {enterprise} posts a position");
    let position = engine.create_position(
        enterprise,
        PositionDraft {
            title: "Platform Engineering Intern".to_string(),
            description: "Help run the placement platform's services".to_string(),
            requirements: Some("Some Rust or Go experience".to_string()),
            total_slots: 2,
            start_date,
            end_date,
        },
    )?;
    println!(
        "- Position #{} open with {} slot(s)",
        position.id, position.available_slots
    );

    println!("\nStudents apply");
    let application = engine.submit_application(
        admitted,
        ApplicationRequest {
            position_id: position.id,
            personal_statement: "I want to work on production systems".to_string(),
            contact_info: "student1@example.edu".to_string(),
        },
    )?;
    let second = engine.submit_application(
        declined,
        ApplicationRequest {
            position_id: position.id,
            personal_statement: "Interested in infrastructure work".to_string(),
            contact_info: "student2@example.edu".to_string(),
        },
    )?;

    println!("\nTeacher {teacher} reviews");
    let outcome = engine.approve_application(application.id, teacher)?;
    let internship = outcome.internship;
    println!(
        "- Application #{} approved, internship #{} created",
        application.id, internship.id
    );
    engine.reject_application(second.id, teacher, "Cohort is oriented toward seniors")?;
    println!("- Application #{} rejected", second.id);

    println!("\nStudent {admitted} works through the placement");
    engine.append_log(
        internship.id,
        Actor::Student(admitted),
        LogEntryDraft {
            content: "Set up the staging environment and shadowed on-call".to_string(),
            log_date: start_date + Duration::days(1),
        },
    )?;
    let report = "weekly-report.pdf";
    engine.register_file(
        internship.id,
        Actor::Student(admitted),
        FileDraft {
            file_name: report.to_string(),
            file_size: 420 * 1024,
            content_type: guess_content_type(report),
        },
    )?;
    let midpoint = start_date + Duration::days(45);
    let view = engine.internship(internship.id, Actor::Student(admitted), midpoint)?;
    println!(
        "- Progress on {midpoint}: {}% ({}/{} days)",
        view.progress.percentage, view.progress.completed_days, view.progress.total_days
    );

    println!("\nReminder and expiry passes");
    let reminder = engine.remind_expiring(end_date - Duration::days(3), 7, None)?;
    println!(
        "- Reminder pass checked {} placement(s), sent {} notice(s)",
        reminder.checked, reminder.sent
    );
    let sweep = engine.sweep_expired(end_date + Duration::days(1), None)?;
    println!("- Expiry sweep moved {} placement(s) to evaluation", sweep.updated);

    if !args.skip_evaluation {
        println!("\nDual evaluation");
        engine.submit_evaluation(
            internship.id,
            Evaluator::Teacher(teacher),
            88,
            Some("Thorough weekly reports".to_string()),
        )?;
        let completed = engine.submit_evaluation(
            internship.id,
            Evaluator::Enterprise(enterprise),
            92,
            Some("Shipped the monitoring migration".to_string()),
        )?;
        if let Some(final_score) = completed.final_score {
            println!("- Final score: {final_score}");
        }
    }

    println!("\nAudit trail");
    for entry in audit.entries() {
        println!("  {} {}", entry.operation.label(), entry.description);
    }

    Ok(())
}
