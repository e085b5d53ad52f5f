use serde::{Deserialize, Serialize};

use super::super::domain::PatientInput;
use super::config::FitnessPolicy;

pub const ECOG_CRITICAL: u8 = 3;
pub const ECOG_REDUCED: u8 = 2;

pub(crate) const CRITICAL_ECOG_TEXT: &str = "ECOG 3 or 4: Patient not suitable for colonoscopy. Recommendation: CT Colonography or palliative/supportive care.";
pub(crate) const REDUCED_ECOG_TEXT: &str =
    "ECOG 2: Reduced functional status. Consider CT Colonography or inpatient bowel preparation.";
pub(crate) const COGNITION_TEXT: &str =
    "Cognitive impairment may limit consent and bowel-prep compliance.";
pub(crate) const COMORBIDITY_TEXT: &str = "Significant comorbidity increases procedural risk.";
pub(crate) const PREP_TEXT: &str = "Previous intolerance of bowel preparation reported.";
pub(crate) const SEDATION_TEXT: &str = "High sedation risk identified.";
pub(crate) const COMBINED_RISK_TEXT: &str =
    "One or more risks identified. Consider CTC or inpatient support.";
pub(crate) const FIT_TEXT: &str = "Patient appears fit for outpatient colonoscopy.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessSeverity {
    Ok,
    Warning,
    Critical,
}

impl FitnessSeverity {
    pub fn marker(&self) -> &'static str {
        match self {
            FitnessSeverity::Ok => "✅",
            FitnessSeverity::Warning => "⚠️",
            FitnessSeverity::Critical => "❌",
        }
    }
}

/// One procedural-readiness observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessFinding {
    pub text: String,
    pub severity: FitnessSeverity,
}

impl FitnessFinding {
    pub fn ok(text: &str) -> Self {
        Self {
            text: text.to_string(),
            severity: FitnessSeverity::Ok,
        }
    }

    pub fn warning(text: &str) -> Self {
        Self {
            text: text.to_string(),
            severity: FitnessSeverity::Warning,
        }
    }

    pub fn critical(text: &str) -> Self {
        Self {
            text: text.to_string(),
            severity: FitnessSeverity::Critical,
        }
    }

    /// The explicit "fit" finding used when nothing else was recorded.
    pub fn fit() -> Self {
        Self::ok(FIT_TEXT)
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.severity.marker(), self.text)
    }
}

/// Evaluates procedural readiness without looking at clinical indication.
///
/// The baseline policy always yields exactly one finding. The escalation
/// policy yields one finding per positive factor and may yield none.
pub fn assess_fitness(input: &PatientInput, policy: FitnessPolicy) -> Vec<FitnessFinding> {
    match policy {
        FitnessPolicy::Baseline => assess_baseline(input),
        FitnessPolicy::Escalation => assess_each_factor(input),
    }
}

fn assess_baseline(input: &PatientInput) -> Vec<FitnessFinding> {
    let indicators = &input.fitness;

    if indicators.ecog.is_some_and(|ecog| ecog >= ECOG_CRITICAL) {
        return vec![FitnessFinding::critical(CRITICAL_ECOG_TEXT)];
    }

    if !indicators.cognition_adequate
        || indicators.significant_comorbidity
        || indicators.prep_intolerance
        || indicators.high_sedation_risk
    {
        return vec![FitnessFinding::warning(COMBINED_RISK_TEXT)];
    }

    vec![FitnessFinding::fit()]
}

fn assess_each_factor(input: &PatientInput) -> Vec<FitnessFinding> {
    let indicators = &input.fitness;
    let mut findings = Vec::new();

    match indicators.ecog {
        Some(ecog) if ecog >= ECOG_CRITICAL => {
            findings.push(FitnessFinding::critical(CRITICAL_ECOG_TEXT))
        }
        Some(ECOG_REDUCED) => findings.push(FitnessFinding::warning(REDUCED_ECOG_TEXT)),
        _ => {}
    }

    if !indicators.cognition_adequate {
        findings.push(FitnessFinding::warning(COGNITION_TEXT));
    }
    if indicators.significant_comorbidity {
        findings.push(FitnessFinding::warning(COMORBIDITY_TEXT));
    }
    if indicators.prep_intolerance {
        findings.push(FitnessFinding::warning(PREP_TEXT));
    }
    if indicators.high_sedation_risk {
        findings.push(FitnessFinding::warning(SEDATION_TEXT));
    }

    findings
}
