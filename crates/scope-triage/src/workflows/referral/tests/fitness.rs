use super::common::*;
use crate::workflows::referral::evaluation::{
    assess_fitness, Category, FitnessFinding, FitnessPolicy, FitnessSeverity, ReferralEngine,
    TriageConfig, FITNESS_ESCALATION_REASON, ROUTINE_REASON,
};
use crate::workflows::referral::reference::ReferenceId;

fn severities(findings: &[FitnessFinding]) -> Vec<FitnessSeverity> {
    findings.iter().map(|finding| finding.severity).collect()
}

fn reference() -> ReferenceId {
    ReferenceId("TEST01".to_string())
}

#[test]
fn baseline_policy_yields_exactly_one_finding() {
    let fit = patient(60);
    assert_eq!(
        severities(&assess_fitness(&fit, FitnessPolicy::Baseline)),
        vec![FitnessSeverity::Ok]
    );

    let mut risky = patient(60);
    risky.fitness.cognition_adequate = false;
    risky.fitness.high_sedation_risk = true;
    assert_eq!(
        severities(&assess_fitness(&risky, FitnessPolicy::Baseline)),
        vec![FitnessSeverity::Warning]
    );

    risky.fitness.ecog = Some(4);
    assert_eq!(
        severities(&assess_fitness(&risky, FitnessPolicy::Baseline)),
        vec![FitnessSeverity::Critical]
    );
}

#[test]
fn escalation_policy_reports_each_risk_factor() {
    let mut input = patient(60);
    input.fitness.ecog = Some(2);
    input.fitness.significant_comorbidity = true;
    input.fitness.prep_intolerance = true;

    let findings = assess_fitness(&input, FitnessPolicy::Escalation);

    assert_eq!(
        severities(&findings),
        vec![
            FitnessSeverity::Warning,
            FitnessSeverity::Warning,
            FitnessSeverity::Warning
        ]
    );
    assert!(findings[0].text.starts_with("ECOG 2"));
}

#[test]
fn escalation_policy_leaves_fit_patients_without_findings() {
    assert!(assess_fitness(&patient(60), FitnessPolicy::Escalation).is_empty());
}

#[test]
fn at_most_one_critical_finding() {
    let mut input = patient(60);
    input.fitness.ecog = Some(4);
    input.fitness.cognition_adequate = false;
    input.fitness.high_sedation_risk = true;

    let findings = assess_fitness(&input, FitnessPolicy::Escalation);

    let critical = findings
        .iter()
        .filter(|finding| finding.severity == FitnessSeverity::Critical)
        .count();
    assert_eq!(critical, 1);
    assert_eq!(findings.len(), 3);
}

#[test]
fn engine_synthesizes_fit_finding_when_nothing_recorded() {
    let result = escalation_engine().evaluate_as(reference(), &patient(30));

    assert_eq!(result.fitness(), [FitnessFinding::fit()]);
    assert!(!result.fitness_escalated());
}

#[test]
fn critical_finding_blocks_readiness_and_escalates() {
    let mut input = patient(70);
    input.polyp_history = true;
    input.fitness.ecog = Some(3);

    let result = escalation_engine().evaluate_as(reference(), &input);

    assert_eq!(result.category(), Category::Routine);
    assert_eq!(result.category_label(), "Routine Investigation Recommended");
    assert!(result.procedure_indicated());
    assert!(!result.procedure_ready());
    assert!(result.has_critical_finding());
    assert_eq!(
        result.rationale().as_slice(),
        [
            ROUTINE_REASON.to_string(),
            FITNESS_ESCALATION_REASON.to_string()
        ]
    );
}

#[test]
fn multiple_warnings_with_reduced_ecog_escalate_without_blocking() {
    let mut input = patient(60);
    input.rectal_bleeding = true;
    input.iron_deficiency_anaemia = true;
    input.fitness.ecog = Some(2);
    input.fitness.high_sedation_risk = true;

    let result = escalation_engine().evaluate_as(reference(), &input);

    assert_eq!(result.category(), Category::Urgent);
    assert!(result.fitness_escalated());
    assert_eq!(result.category_label(), "Urgent Investigation Recommended");
    assert!(result.rationale().contains(FITNESS_ESCALATION_REASON));
    assert!(result.procedure_ready());
}

#[test]
fn warnings_without_reduced_ecog_do_not_escalate() {
    let mut input = patient(60);
    input.ibd_history = true;
    input.fitness.ecog = Some(1);
    input.fitness.cognition_adequate = false;
    input.fitness.prep_intolerance = true;
    input.fitness.high_sedation_risk = true;

    let result = escalation_engine().evaluate_as(reference(), &input);

    assert!(!result.fitness_escalated());
    assert_eq!(result.category_label(), "Routine Colonoscopy Recommended");
    assert!(result.procedure_ready());
}

#[test]
fn escalation_thresholds_follow_configuration() {
    let engine = ReferralEngine::new(TriageConfig {
        fitness_policy: FitnessPolicy::Escalation,
        escalation_min_warnings: 1,
        escalation_min_ecog: 0,
    });
    let mut input = patient(60);
    input.weight_loss = true;
    input.fitness.significant_comorbidity = true;

    let result = engine.evaluate_as(reference(), &input);

    assert!(result.fitness_escalated());
}

#[test]
fn no_escalation_when_no_procedure_is_indicated() {
    let mut input = patient(30);
    input.fitness.ecog = Some(4);

    let result = escalation_engine().evaluate_as(reference(), &input);

    assert_eq!(result.category(), Category::NotIndicated);
    assert_eq!(
        result.category_label(),
        "No Direct Access Procedure Indicated"
    );
    assert!(!result.fitness_escalated());
    assert!(!result.rationale().contains(FITNESS_ESCALATION_REASON));
    assert!(!result.procedure_ready());
}

#[test]
fn baseline_policy_never_escalates_but_still_blocks_readiness() {
    let mut input = patient(70);
    input.polyp_history = true;
    input.fitness.ecog = Some(3);

    let result = baseline_engine().evaluate_as(reference(), &input);

    assert_eq!(result.category_label(), "Routine Colonoscopy Recommended");
    assert!(!result.fitness_escalated());
    assert!(!result.procedure_ready());
    assert_eq!(result.fitness().len(), 1);
}

#[test]
fn surveillance_label_swaps_terminal_noun_when_escalated() {
    let mut input = patient(65);
    input.surveillance = true;
    input.fitness.ecog = Some(3);

    let result = escalation_engine().evaluate_as(reference(), &input);

    assert_eq!(result.category(), Category::Surveillance);
    assert_eq!(
        result.category_label(),
        "Routine Surveillance Investigation"
    );
}

#[test]
fn unknown_ecog_keeps_indicated_referral_from_being_ready() {
    for engine in [escalation_engine(), baseline_engine()] {
        let mut input = patient(60);
        input.polyp_history = true;
        input.fitness.ecog = None;

        let result = engine.evaluate_as(reference(), &input);

        assert!(result.procedure_indicated());
        assert_eq!(severities(result.fitness()), vec![FitnessSeverity::Ok]);
        assert!(!result.procedure_ready());
    }
}

#[test]
fn debug_report_lists_inputs_and_outcome() {
    let record = urgent_record();
    let input =
        crate::workflows::referral::PatientInput::from_record(&record).expect("valid record");
    let result = escalation_engine().evaluate_as(reference(), &input);

    let report = result.debug_report(&record);

    assert!(report.starts_with("--- DEBUG INFO ---"));
    assert!(report.contains("rectal_bleeding: Yes"));
    assert!(report.contains("Reference #: TEST01"));
    assert!(report.contains("Category: Urgent Colonoscopy Recommended"));
    assert!(report.contains("Emoji: 🔴"));
    assert!(report.contains("  - ✅ Patient appears fit for outpatient colonoscopy."));
    assert!(report.contains("Bowel Prep Section: Visible"));
}
