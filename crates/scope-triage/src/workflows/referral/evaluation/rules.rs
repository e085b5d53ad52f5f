use serde::{Deserialize, Serialize};

use super::super::domain::{FamilyHistory, PatientInput};

pub const SYMPTOM_AGE_THRESHOLD: u8 = 50;
pub const SYNDROME_AGE_THRESHOLD: u8 = 25;

/// Individual clinical criteria, recorded for audit alongside the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    BleedingWithAnaemia,
    BowelHabitChangeWithBleedingOver50,
    BowelHabitChangeOver50,
    BleedingOver50,
    IronDeficiencyAnaemia,
    UnexplainedWeightLoss,
    FamilyCategory2WithSymptoms,
    FamilyCategory3Over25,
    PolypHistory,
    IbdHistory,
    Surveillance,
}

pub(crate) struct ClinicalSignals {
    pub urgent: Vec<Criterion>,
    pub routine: Vec<Criterion>,
    pub surveillance: bool,
}

impl ClinicalSignals {
    pub fn matched(&self) -> Vec<Criterion> {
        let mut matched = self.urgent.clone();
        matched.extend(self.routine.iter().copied());
        if self.surveillance {
            matched.push(Criterion::Surveillance);
        }
        matched
    }
}

/// Evaluates every criterion independently; precedence is applied later.
pub(crate) fn collect_signals(input: &PatientInput) -> ClinicalSignals {
    let bleeding = input.rectal_bleeding;
    let anaemia = input.iron_deficiency_anaemia;
    let bowel_habit = input.bowel_habit_change;
    let over_50 = input.age_at_least(SYMPTOM_AGE_THRESHOLD);

    let mut urgent = Vec::new();
    if bleeding && anaemia {
        urgent.push(Criterion::BleedingWithAnaemia);
    }
    if bowel_habit && bleeding && over_50 {
        urgent.push(Criterion::BowelHabitChangeWithBleedingOver50);
    }

    let mut routine = Vec::new();
    if bowel_habit && over_50 {
        routine.push(Criterion::BowelHabitChangeOver50);
    }
    if bleeding && over_50 {
        routine.push(Criterion::BleedingOver50);
    }
    if anaemia {
        routine.push(Criterion::IronDeficiencyAnaemia);
    }
    if input.weight_loss {
        routine.push(Criterion::UnexplainedWeightLoss);
    }
    match input.family_history {
        FamilyHistory::Category2 if bowel_habit || bleeding => {
            routine.push(Criterion::FamilyCategory2WithSymptoms)
        }
        FamilyHistory::Category3 if input.age_at_least(SYNDROME_AGE_THRESHOLD) => {
            routine.push(Criterion::FamilyCategory3Over25)
        }
        _ => {}
    }
    if input.polyp_history {
        routine.push(Criterion::PolypHistory);
    }
    if input.ibd_history {
        routine.push(Criterion::IbdHistory);
    }

    ClinicalSignals {
        urgent,
        routine,
        surveillance: input.surveillance,
    }
}
