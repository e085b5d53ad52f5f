use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Flat `field -> value` record as submitted by the referral form.
///
/// Kept verbatim so the notification collaborator can echo the original inputs.
/// JSON numbers and booleans are accepted and kept in their textual form; nulls are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawReferral(pub BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Decimal(f64),
    Blank(()),
}

impl FieldValue {
    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Flag(flag) => Some(flag.to_string()),
            FieldValue::Integer(value) => Some(value.to_string()),
            FieldValue::Decimal(value) => Some(value.to_string()),
            FieldValue::Blank(()) => None,
        }
    }
}

impl<'de> Deserialize<'de> for RawReferral {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        Ok(Self(
            fields
                .into_iter()
                .filter_map(|(field, value)| value.into_text().map(|text| (field, text)))
                .collect(),
        ))
    }
}

impl RawReferral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: &str) {
        self.0.insert(field.to_string(), value.to_string());
    }

    /// Blank values are treated the same as missing fields.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Reads one referral per CSV row using the header row as field names.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in reader.deserialize::<BTreeMap<String, String>>() {
            let fields = row?
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect();
            records.push(Self(fields));
        }
        Ok(records)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawReferral {
    fn from(fields: [(&str, &str); N]) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
        )
    }
}

pub mod fields {
    pub const AGE: &str = "age";
    pub const SEX: &str = "sex";
    pub const RECTAL_BLEEDING: &str = "rectal_bleeding";
    pub const ANAEMIA: &str = "ida";
    pub const BOWEL_HABIT: &str = "bowel_habit";
    pub const WEIGHT_LOSS: &str = "weightloss";
    pub const POLYP: &str = "polyp";
    pub const IBD: &str = "ibd";
    pub const FAMILY: &str = "family";
    pub const SURVEILLANCE: &str = "surveillance";
    pub const LAST_SCOPE_DATE: &str = "last_scope_date";
    pub const COGNITION: &str = "cognition";
    pub const COMORBIDITY: &str = "comorbidity";
    pub const PREP: &str = "prep";
    pub const SEDATION: &str = "sedation";
    pub const ECOG: &str = "ecog";
}

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;
pub const MAX_ECOG: u8 = 4;

/// Input contract violations, reported before any classification runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("missing required field '{field}'")]
    Missing { field: &'static str },
    #[error("field '{field}' has unrecognised value '{value}'")]
    Invalid { field: &'static str, value: String },
    #[error("field '{field}' must be between {min} and {max} (found {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u8,
        max: u8,
    },
}

impl InputError {
    pub fn field(&self) -> &'static str {
        match self {
            InputError::Missing { field }
            | InputError::Invalid { field, .. }
            | InputError::OutOfRange { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Self::Male),
            "f" | "female" => Some(Self::Female),
            "o" | "other" | "x" | "u" | "unspecified" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Family history grading. Unknown codes collapse to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyHistory {
    #[default]
    None,
    /// One first-degree relative diagnosed under 55, or two affected first-degree relatives.
    Category2,
    /// Known familial syndrome or more than three affected relatives.
    Category3,
}

impl FamilyHistory {
    pub fn from_code(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("category2") => Self::Category2,
            Some("category3") => Self::Category3,
            _ => Self::None,
        }
    }
}

/// Validated, immutable view of one referral submission.
///
/// Fields are public so callers can build inputs directly. A `None` age is
/// allowed there and fails closed: every age-gated criterion is unmet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: Option<u8>,
    pub sex: Sex,
    pub rectal_bleeding: bool,
    pub bowel_habit_change: bool,
    pub iron_deficiency_anaemia: bool,
    pub weight_loss: bool,
    pub polyp_history: bool,
    pub ibd_history: bool,
    pub family_history: FamilyHistory,
    pub surveillance: bool,
    pub last_scope_date: Option<String>,
    pub fitness: FitnessIndicators,
}

/// Procedural-readiness signals, assessed separately from clinical indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessIndicators {
    pub cognition_adequate: bool,
    pub significant_comorbidity: bool,
    pub prep_intolerance: bool,
    pub high_sedation_risk: bool,
    pub ecog: Option<u8>,
}

impl Default for FitnessIndicators {
    fn default() -> Self {
        Self {
            cognition_adequate: true,
            significant_comorbidity: false,
            prep_intolerance: false,
            high_sedation_risk: false,
            ecog: None,
        }
    }
}

impl PatientInput {
    /// Baseline input with no positive flags, handy for building fixtures.
    pub fn new(age: u8, sex: Sex) -> Self {
        Self {
            age: Some(age),
            sex,
            rectal_bleeding: false,
            bowel_habit_change: false,
            iron_deficiency_anaemia: false,
            weight_loss: false,
            polyp_history: false,
            ibd_history: false,
            family_history: FamilyHistory::None,
            surveillance: false,
            last_scope_date: None,
            fitness: FitnessIndicators::default(),
        }
    }

    pub fn from_record(record: &RawReferral) -> Result<Self, InputError> {
        let age = parse_bounded(record, fields::AGE, MIN_AGE, MAX_AGE)?
            .ok_or(InputError::Missing { field: fields::AGE })?;

        let sex = match record.get(fields::SEX) {
            Some(raw) => Sex::parse(raw).ok_or_else(|| InputError::Invalid {
                field: fields::SEX,
                value: raw.to_string(),
            })?,
            None => return Err(InputError::Missing { field: fields::SEX }),
        };

        let surveillance = parse_flag(record, fields::SURVEILLANCE)?.unwrap_or(false);
        let last_scope_date = if surveillance {
            record.get(fields::LAST_SCOPE_DATE).map(str::to_string)
        } else {
            None
        };

        let fitness = FitnessIndicators {
            cognition_adequate: parse_flag(record, fields::COGNITION)?.unwrap_or(true),
            significant_comorbidity: parse_flag(record, fields::COMORBIDITY)?.unwrap_or(false),
            prep_intolerance: parse_flag(record, fields::PREP)?.unwrap_or(false),
            high_sedation_risk: parse_flag(record, fields::SEDATION)?.unwrap_or(false),
            ecog: parse_bounded(record, fields::ECOG, 0, MAX_ECOG)?,
        };

        Ok(Self {
            age: Some(age),
            sex,
            rectal_bleeding: parse_flag(record, fields::RECTAL_BLEEDING)?.unwrap_or(false),
            bowel_habit_change: parse_flag(record, fields::BOWEL_HABIT)?.unwrap_or(false),
            iron_deficiency_anaemia: parse_flag(record, fields::ANAEMIA)?.unwrap_or(false),
            weight_loss: parse_flag(record, fields::WEIGHT_LOSS)?.unwrap_or(false),
            polyp_history: parse_flag(record, fields::POLYP)?.unwrap_or(false),
            ibd_history: parse_flag(record, fields::IBD)?.unwrap_or(false),
            family_history: FamilyHistory::from_code(record.get(fields::FAMILY)),
            surveillance,
            last_scope_date,
            fitness,
        })
    }

    /// Age gate; false when the age is unknown.
    pub fn age_at_least(&self, threshold: u8) -> bool {
        self.age.map(|age| age >= threshold).unwrap_or(false)
    }
}

fn parse_flag(record: &RawReferral, field: &'static str) -> Result<Option<bool>, InputError> {
    let Some(raw) = record.get(field) else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "on" | "1" => Ok(Some(true)),
        "no" | "n" | "false" | "off" | "0" => Ok(Some(false)),
        _ => Err(InputError::Invalid {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_bounded(
    record: &RawReferral,
    field: &'static str,
    min: u8,
    max: u8,
) -> Result<Option<u8>, InputError> {
    let Some(raw) = record.get(field) else {
        return Ok(None);
    };

    let value = raw.parse::<i64>().map_err(|_| InputError::Invalid {
        field,
        value: raw.to_string(),
    })?;

    if value < i64::from(min) || value > i64::from(max) {
        return Err(InputError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }

    Ok(Some(value as u8))
}
