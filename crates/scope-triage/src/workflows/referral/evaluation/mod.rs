mod config;
mod fitness;
mod policy;
mod rules;

pub use config::{FitnessPolicy, TriageConfig};
pub use fitness::{assess_fitness, FitnessFinding, FitnessSeverity, ECOG_CRITICAL, ECOG_REDUCED};
pub use policy::{
    classify, Category, Classification, FITNESS_ESCALATION_REASON, NOT_INDICATED_REASON,
    ROUTINE_REASON, SURVEILLANCE_REASON, URGENT_REASON,
};
pub use rules::{Criterion, SYMPTOM_AGE_THRESHOLD, SYNDROME_AGE_THRESHOLD};

use std::fmt::Write;

use serde::Serialize;

use super::domain::{PatientInput, RawReferral};
use super::rationale::Rationale;
use super::reference::ReferenceId;
use policy::reconcile;

/// Stateless evaluator that applies the triage rubric to one patient.
#[derive(Debug, Clone, Default)]
pub struct ReferralEngine {
    config: TriageConfig,
}

impl ReferralEngine {
    pub fn new(config: TriageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn evaluate(&self, input: &PatientInput) -> ReferralResult {
        self.evaluate_as(ReferenceId::generate(), input)
    }

    /// Evaluates under a caller-supplied reference.
    pub fn evaluate_as(&self, reference_id: ReferenceId, input: &PatientInput) -> ReferralResult {
        let findings = assess_fitness(input, self.config.fitness_policy);
        let classification = classify(input);
        let merged = reconcile(&classification, findings, input, &self.config);

        let category_label = if merged.fitness_escalated {
            classification.category.escalated_label()
        } else {
            classification.category.label().to_string()
        };

        ReferralResult {
            reference_id,
            category: classification.category,
            category_label,
            fitness_escalated: merged.fitness_escalated,
            rationale: merged.rationale,
            fitness: merged.fitness,
            criteria: classification.criteria,
            procedure_indicated: classification.procedure_indicated,
            procedure_ready: merged.procedure_ready,
        }
    }
}

/// Final, read-only outcome of one referral evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralResult {
    reference_id: ReferenceId,
    category: Category,
    category_label: String,
    fitness_escalated: bool,
    rationale: Rationale,
    fitness: Vec<FitnessFinding>,
    criteria: Vec<Criterion>,
    procedure_indicated: bool,
    procedure_ready: bool,
}

impl ReferralResult {
    pub fn reference_id(&self) -> &ReferenceId {
        &self.reference_id
    }

    /// Category chosen by clinical criteria; fitness never changes it.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Banner text, with "Investigation" in place of "Colonoscopy" when escalated.
    pub fn category_label(&self) -> &str {
        &self.category_label
    }

    pub fn fitness_escalated(&self) -> bool {
        self.fitness_escalated
    }

    pub fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    pub fn fitness(&self) -> &[FitnessFinding] {
        &self.fitness
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn procedure_indicated(&self) -> bool {
        self.procedure_indicated
    }

    /// Drives the bowel-prep instructions section.
    pub fn procedure_ready(&self) -> bool {
        self.procedure_ready
    }

    pub fn has_critical_finding(&self) -> bool {
        self.fitness
            .iter()
            .any(|finding| finding.severity == FitnessSeverity::Critical)
    }

    /// Plain-text dump of inputs and outcome for copy/paste into support tickets.
    pub fn debug_report(&self, inputs: &RawReferral) -> String {
        let mut info = String::from("--- DEBUG INFO ---\n\n--- INPUTS ---\n");
        for (field, value) in inputs.iter() {
            let _ = writeln!(info, "{field}: {value}");
        }

        info.push_str("\n--- OUTPUT ---\n");
        let _ = writeln!(info, "Reference #: {}", self.reference_id);
        let _ = writeln!(info, "Category: {}", self.category_label);
        let _ = writeln!(info, "Emoji: {}\n", self.category.emoji());

        info.push_str("Reasons:\n");
        for reason in self.rationale.iter() {
            let _ = writeln!(info, "  - {reason}");
        }

        info.push_str("\nFitness Assessment:\n");
        for finding in &self.fitness {
            let _ = writeln!(info, "  - {}", finding.display());
        }

        if self.procedure_ready {
            info.push_str("\nBowel Prep Section: Visible\n");
        }

        info
    }
}
