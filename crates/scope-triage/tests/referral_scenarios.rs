use scope_triage::workflows::referral::{
    Category, FitnessSeverity, PatientInput, RawReferral, ReferralEngine, TriageConfig,
};

fn evaluate(record: &RawReferral) -> scope_triage::workflows::referral::ReferralResult {
    let input = PatientInput::from_record(record).expect("valid referral record");
    ReferralEngine::new(TriageConfig::default()).evaluate(&input)
}

#[test]
fn scenario_urgent_fit_patient_is_procedure_ready() {
    let record = RawReferral::from([
        ("age", "60"),
        ("sex", "M"),
        ("rectal_bleeding", "Yes"),
        ("ida", "Yes"),
        ("ecog", "0"),
        ("cognition", "yes"),
        ("comorbidity", "no"),
        ("prep", "no"),
        ("sedation", "no"),
    ]);

    let result = evaluate(&record);

    assert_eq!(result.category(), Category::Urgent);
    assert_eq!(result.category_label(), "Urgent Colonoscopy Recommended");
    assert_eq!(result.fitness().len(), 1);
    assert_eq!(result.fitness()[0].severity, FitnessSeverity::Ok);
    assert!(result.procedure_ready());
}

#[test]
fn scenario_routine_with_critical_fitness_is_not_ready() {
    let record = RawReferral::from([("age", "70"), ("sex", "F"), ("polyp", "Yes"), ("ecog", "3")]);

    let result = evaluate(&record);

    assert_eq!(result.category(), Category::Routine);
    assert_eq!(
        result.category().label(),
        "Routine Colonoscopy Recommended"
    );
    assert!(!result.procedure_ready());
    assert!(result
        .rationale()
        .iter()
        .any(|reason| reason.contains("6-week criteria")));
    assert!(result
        .rationale()
        .iter()
        .any(|reason| reason.contains("first-line investigation")));
}

#[test]
fn scenario_no_flags_means_no_procedure() {
    let record = RawReferral::from([("age", "30"), ("sex", "F")]);

    let result = evaluate(&record);

    assert_eq!(result.category(), Category::NotIndicated);
    let rationale: Vec<&str> = result.rationale().iter().collect();
    assert_eq!(
        rationale,
        vec!["Consider specialist review, GP follow-up or further monitoring."]
    );
    assert_eq!(result.fitness().len(), 1);
    assert_eq!(result.fitness()[0].severity, FitnessSeverity::Ok);
    assert!(!result.procedure_ready());
}

#[test]
fn scenario_surveillance_only_is_ready() {
    let record = RawReferral::from([
        ("age", "65"),
        ("sex", "M"),
        ("surveillance", "Yes"),
        ("last_scope_date", "2022-01-01"),
        ("ecog", "0"),
    ]);

    let result = evaluate(&record);

    assert_eq!(result.category(), Category::Surveillance);
    assert_eq!(result.category_label(), "Routine Surveillance Colonoscopy");
    assert!(result.procedure_ready());
}

fn flag(on: bool) -> &'static str {
    if on {
        "Yes"
    } else {
        "no"
    }
}

/// Small cartesian sweep over the fields that interact with precedence and fitness.
fn sweep() -> Vec<RawReferral> {
    let mut records = Vec::new();
    for age in ["20", "49", "50", "75"] {
        for family in ["no", "category2", "category3", "unknown"] {
            for ecog in ["0", "2", "3", "4"] {
                for mask in 0u8..16 {
                    records.push(RawReferral::from([
                        ("age", age),
                        ("sex", "F"),
                        ("family", family),
                        ("ecog", ecog),
                        ("bowel_habit", flag(mask & 1 != 0)),
                        ("weightloss", flag(mask & 2 != 0)),
                        ("surveillance", flag(mask & 4 != 0)),
                        ("sedation", flag(mask & 8 != 0)),
                    ]));
                }
            }
        }
    }
    records
}

#[test]
fn bleeding_with_anaemia_is_always_urgent() {
    for record in sweep() {
        let record = record.with("rectal_bleeding", "Yes").with("ida", "Yes");
        assert_eq!(evaluate(&record).category(), Category::Urgent, "{record:?}");
    }
}

#[test]
fn readiness_implies_indication_and_no_critical_finding() {
    for record in sweep() {
        let result = evaluate(&record);
        if result.procedure_ready() {
            assert!(result.procedure_indicated(), "{record:?}");
            assert!(result.category().indicates_procedure(), "{record:?}");
            assert!(!result.has_critical_finding(), "{record:?}");
        }
        let critical = result
            .fitness()
            .iter()
            .filter(|finding| finding.severity == FitnessSeverity::Critical)
            .count();
        assert!(critical <= 1, "{record:?}");
        assert!(!result.fitness().is_empty(), "{record:?}");
    }
}

#[test]
fn high_ecog_is_never_procedure_ready() {
    for record in sweep() {
        let record = record.with("ecog", "3").with("polyp", "Yes");
        let result = evaluate(&record);
        assert!(result.procedure_indicated());
        assert!(!result.procedure_ready(), "{record:?}");
    }
}

#[test]
fn surveillance_statement_present_whenever_flagged() {
    for record in sweep() {
        let flagged = record.get("surveillance") == Some("Yes");
        let result = evaluate(&record);
        let mentions = result
            .rationale()
            .iter()
            .any(|reason| reason.contains("surveillance case"));
        assert_eq!(mentions, flagged, "{record:?}");
    }
}

#[test]
fn category3_family_history_under_25_with_no_other_trigger_is_not_indicated() {
    let record = RawReferral::from([("age", "24"), ("sex", "M"), ("family", "category3")]);
    assert_eq!(evaluate(&record).category(), Category::NotIndicated);
}

#[test]
fn repeated_evaluation_is_identical_apart_from_reference() {
    let engine = ReferralEngine::default();
    for record in sweep().into_iter().step_by(7) {
        let input = PatientInput::from_record(&record).expect("valid referral record");
        let first = engine.evaluate(&input);
        let second = engine.evaluate(&input);

        assert_eq!(first.category(), second.category());
        assert_eq!(first.category_label(), second.category_label());
        assert_eq!(first.rationale(), second.rationale());
        assert_eq!(first.fitness(), second.fitness());
        assert_eq!(first.procedure_ready(), second.procedure_ready());
    }
}
