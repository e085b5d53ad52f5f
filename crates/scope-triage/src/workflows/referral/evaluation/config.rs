use serde::{Deserialize, Serialize};

/// Which fitness rule set the assessor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessPolicy {
    /// Single summary finding: critical, one combined warning, or fit.
    Baseline,
    /// One finding per positive risk factor, with escalation to CT colonography.
    Escalation,
}

/// Rubric dials for the triage engine. Escalation thresholds are product decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    pub fitness_policy: FitnessPolicy,
    pub escalation_min_warnings: usize,
    pub escalation_min_ecog: u8,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            fitness_policy: FitnessPolicy::Escalation,
            escalation_min_warnings: 2,
            escalation_min_ecog: 2,
        }
    }
}
