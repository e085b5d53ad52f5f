use serde::{Deserialize, Serialize};

/// Clinical statements in first-seen order; repeated statements collapse to one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rationale(Vec<String>);

impl Rationale {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the statement was already recorded.
    pub fn add(&mut self, statement: impl Into<String>) -> bool {
        let statement = statement.into();
        if self.contains(&statement) {
            return false;
        }
        self.0.push(statement);
        true
    }

    pub fn contains(&self, statement: &str) -> bool {
        self.0.iter().any(|existing| existing == statement)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Rationale> for Vec<String> {
    fn from(value: Rationale) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_insertion_order_and_drops_duplicates() {
        let mut rationale = Rationale::new();
        assert!(rationale.add("surveillance"));
        assert!(rationale.add("urgent"));
        assert!(!rationale.add("surveillance"));
        assert!(rationale.add("fitness"));

        let entries: Vec<&str> = rationale.iter().collect();
        assert_eq!(entries, vec!["surveillance", "urgent", "fitness"]);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut rationale = Rationale::new();
        rationale.add("one");
        rationale.add("two");
        let json = serde_json::to_value(&rationale).expect("serializes");
        assert_eq!(json, serde_json::json!(["one", "two"]));
    }
}
