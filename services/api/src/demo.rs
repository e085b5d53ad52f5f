use crate::assess::render_result;
use chrono::Local;
use clap::Args;
use scope_triage::config::AppConfig;
use scope_triage::error::AppError;
use scope_triage::workflows::referral::{
    FitnessPolicy, PatientInput, RawReferral, ReferralEngine, TriageConfig,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Use the single-finding baseline fitness policy instead of the configured one
    #[arg(long)]
    pub(crate) baseline: bool,
    /// Include the copyable debug report for each scenario
    #[arg(long)]
    pub(crate) debug: bool,
}

pub(crate) fn demo_scenarios() -> Vec<(&'static str, RawReferral)> {
    vec![
        (
            "Urgent, fit for outpatient colonoscopy",
            RawReferral::from([
                ("age", "60"),
                ("sex", "M"),
                ("rectal_bleeding", "Yes"),
                ("ida", "Yes"),
                ("ecog", "0"),
                ("cognition", "yes"),
                ("comorbidity", "no"),
                ("prep", "no"),
                ("sedation", "no"),
            ]),
        ),
        (
            "Routine polyp follow-up, ECOG 3",
            RawReferral::from([("age", "70"), ("sex", "F"), ("polyp", "Yes"), ("ecog", "3")]),
        ),
        (
            "No positive findings",
            RawReferral::from([("age", "30"), ("sex", "F")]),
        ),
        (
            "Post-surgical surveillance",
            RawReferral::from([
                ("age", "65"),
                ("sex", "M"),
                ("surveillance", "Yes"),
                ("last_scope_date", "2022-01-01"),
                ("ecog", "0"),
            ]),
        ),
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config: TriageConfig = AppConfig::load()?.triage;
    if args.baseline {
        config.fitness_policy = FitnessPolicy::Baseline;
    }
    let engine = ReferralEngine::new(config);

    println!(
        "Referral triage demo ({:?} fitness policy, {})",
        engine.config().fitness_policy,
        Local::now().format("%Y-%m-%d %H:%M")
    );

    for (index, (title, record)) in demo_scenarios().into_iter().enumerate() {
        println!("\n=== Scenario {}: {title} ===", index + 1);
        let input = PatientInput::from_record(&record)?;
        let result = engine.evaluate(&input);
        render_result(&result);
        if args.debug {
            println!("\n{}", result.debug_report(&record));
        }
    }

    Ok(())
}
