use serde::{Deserialize, Serialize};

use super::super::domain::PatientInput;
use super::super::rationale::Rationale;
use super::config::{FitnessPolicy, TriageConfig};
use super::fitness::{FitnessFinding, FitnessSeverity, ECOG_CRITICAL};
use super::rules::{collect_signals, Criterion};

pub const SURVEILLANCE_REASON: &str =
    "This is a post-surgical surveillance case. Procedure: Routine colonoscopy as per protocol.";
pub const URGENT_REASON: &str = "High suspicion of CRC. Recommended Procedure: Colonoscopy.";
pub const ROUTINE_REASON: &str = "Meets 6-week criteria. Recommended Procedure: Colonoscopy (or CT Colonography if fitness is a concern).";
pub const NOT_INDICATED_REASON: &str =
    "Consider specialist review, GP follow-up or further monitoring.";
pub const FITNESS_ESCALATION_REASON: &str =
    "Due to fitness concerns, CT Colonography is recommended as first-line investigation.";

const PROCEDURE_NOUN: &str = "Colonoscopy";
const ESCALATED_NOUN: &str = "Investigation";

/// Referral urgency, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Two-week pathway.
    Urgent,
    /// Six-week pathway.
    Routine,
    Surveillance,
    NotIndicated,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Urgent => "Urgent Colonoscopy Recommended",
            Category::Routine => "Routine Colonoscopy Recommended",
            Category::Surveillance => "Routine Surveillance Colonoscopy",
            Category::NotIndicated => "No Direct Access Procedure Indicated",
        }
    }

    /// Label once fitness concerns steer the referral away from colonoscopy.
    pub fn escalated_label(&self) -> String {
        self.label().replace(PROCEDURE_NOUN, ESCALATED_NOUN)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Urgent => "🔴",
            Category::Routine => "🟡",
            Category::Surveillance => "🔵",
            Category::NotIndicated => "⚪️",
        }
    }

    pub fn indicates_procedure(&self) -> bool {
        !matches!(self, Category::NotIndicated)
    }
}

/// Output of the clinical-indication pass, before fitness is considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub rationale: Rationale,
    pub criteria: Vec<Criterion>,
    pub procedure_indicated: bool,
}

/// Picks the referral category by strict precedence.
///
/// The surveillance statement is recorded whenever surveillance is flagged,
/// independent of which category wins.
pub fn classify(input: &PatientInput) -> Classification {
    let signals = collect_signals(input);
    let mut rationale = Rationale::new();

    if signals.surveillance {
        rationale.add(SURVEILLANCE_REASON);
    }

    let category = if !signals.urgent.is_empty() {
        rationale.add(URGENT_REASON);
        Category::Urgent
    } else if !signals.routine.is_empty() {
        rationale.add(ROUTINE_REASON);
        Category::Routine
    } else if signals.surveillance {
        Category::Surveillance
    } else {
        rationale.add(NOT_INDICATED_REASON);
        Category::NotIndicated
    };

    Classification {
        category,
        rationale,
        criteria: signals.matched(),
        procedure_indicated: category.indicates_procedure(),
    }
}

pub(crate) struct Reconciliation {
    pub rationale: Rationale,
    pub fitness: Vec<FitnessFinding>,
    pub fitness_escalated: bool,
    pub procedure_ready: bool,
}

/// Merges the clinical classification with the fitness findings.
pub(crate) fn reconcile(
    classification: &Classification,
    findings: Vec<FitnessFinding>,
    input: &PatientInput,
    config: &TriageConfig,
) -> Reconciliation {
    let mut fitness = findings;
    if fitness.is_empty() {
        fitness.push(FitnessFinding::fit());
    }

    let critical = fitness
        .iter()
        .any(|finding| finding.severity == FitnessSeverity::Critical);
    // Readiness needs a recorded ECOG below the critical band; unknown status fails closed.
    let ecog_clear = input
        .fitness
        .ecog
        .is_some_and(|ecog| ecog < ECOG_CRITICAL);

    let fitness_escalated = config.fitness_policy == FitnessPolicy::Escalation
        && classification.procedure_indicated
        && (critical || warnings_escalate(&fitness, input, config));

    let mut rationale = classification.rationale.clone();
    if fitness_escalated {
        rationale.add(FITNESS_ESCALATION_REASON);
    }

    Reconciliation {
        rationale,
        fitness,
        fitness_escalated,
        procedure_ready: classification.procedure_indicated && !critical && ecog_clear,
    }
}

fn warnings_escalate(
    fitness: &[FitnessFinding],
    input: &PatientInput,
    config: &TriageConfig,
) -> bool {
    let warnings = fitness
        .iter()
        .filter(|finding| finding.severity == FitnessSeverity::Warning)
        .count();

    warnings >= config.escalation_min_warnings
        && input
            .fitness
            .ecog
            .is_some_and(|ecog| ecog >= config.escalation_min_ecog)
}
