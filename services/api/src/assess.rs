use crate::infra::{parse_field, OutboxNotifier};
use clap::Args;
use scope_triage::config::AppConfig;
use scope_triage::error::AppError;
use scope_triage::workflows::referral::{
    NotificationStatus, PatientInput, RawReferral, ReferralEngine, ReferralResult,
    ReferralService,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Referral field as key=value (repeatable), e.g. --field age=60 --field rectal_bleeding=Yes
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
    /// JSON file holding a flat field -> value object; --field values override it
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Print the copyable debug report instead of the summary
    #[arg(long)]
    pub(crate) debug: bool,
    /// Print the result as JSON
    #[arg(long, conflicts_with = "debug")]
    pub(crate) json: bool,
    /// Send the referral notification when the patient is procedure-ready
    #[arg(long)]
    pub(crate) notify: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one referral per row and field names in the header
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print one JSON document per row
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        fields,
        input,
        debug,
        json,
        notify,
    } = args;

    let mut record = match input {
        Some(path) => serde_json::from_reader::<_, RawReferral>(File::open(path)?)?,
        None => RawReferral::new(),
    };
    for (field, value) in &fields {
        record.insert(field, value);
    }

    let config = AppConfig::load()?;
    let notifier = Arc::new(OutboxNotifier::new(config.notifications.clone()));
    let service = ReferralService::new(notifier.clone(), config.triage);

    let (result, notification) = if notify {
        let submission = service.submit(record.clone())?;
        let status = match submission.dispatch {
            Some(handle) => match handle.await {
                Ok(outcome) => NotificationStatus::from(outcome),
                Err(err) => NotificationStatus::Failed {
                    message: err.to_string(),
                },
            },
            None => submission.notification,
        };
        (submission.result, Some(status))
    } else {
        (service.evaluate(&record)?, None)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if debug {
        print!("{}", result.debug_report(&record));
    } else {
        render_result(&result);
    }

    if let Some(status) = notification {
        match status {
            NotificationStatus::Sent { message } => println!("\nNotification: {message}"),
            NotificationStatus::Failed { message } => {
                println!("\nNotification failed: {message}")
            }
            other => println!("\nNotification: {}", other.label()),
        }
        for email in notifier.outbox() {
            println!("Queued for {}: {}", email.to, email.subject);
        }
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = ReferralEngine::new(config.triage);
    let records = RawReferral::from_csv_reader(File::open(&args.csv)?)?;

    let mut rejected = 0usize;
    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        match PatientInput::from_record(record) {
            Ok(input) => {
                let result = engine.evaluate(&input);
                if args.json {
                    println!("{}", serde_json::to_string(&result)?);
                } else {
                    println!("{}", summary_line(row, &result));
                }
            }
            Err(err) => {
                rejected += 1;
                eprintln!("row {row}: {err}");
            }
        }
    }

    if !args.json {
        println!(
            "\n{} referral(s) evaluated, {} rejected",
            records.len() - rejected,
            rejected
        );
    }
    Ok(())
}

pub(crate) fn summary_line(row: usize, result: &ReferralResult) -> String {
    format!(
        "row {row}: [{}] {} {} | bowel prep {}",
        result.reference_id(),
        result.category().emoji(),
        result.category_label(),
        if result.procedure_ready() {
            "shown"
        } else {
            "hidden"
        }
    )
}

pub(crate) fn render_result(result: &ReferralResult) {
    println!("{} {}", result.category().emoji(), result.category_label());
    println!("Ref: {}", result.reference_id());

    if !result.rationale().is_empty() {
        println!("\nClinical rationale");
        for reason in result.rationale().iter() {
            println!("- {reason}");
        }
    }

    println!("\nFitness summary");
    for finding in result.fitness() {
        println!("- {}", finding.display());
    }

    if result.procedure_ready() {
        println!("\nBowel preparation instructions apply to this referral.");
    } else {
        println!("\nNo bowel preparation required at this stage.");
    }
}
