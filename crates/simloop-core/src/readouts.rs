//! Named text outputs written by renderers each frame.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A single named readout value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readout {
    pub name: Cow<'static, str>,
    pub value: String,
}

/// Ordered collection of readouts; names keep their first insertion position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Readouts {
    entries: Vec<Readout>,
}

impl Readouts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the readout called `name`.
    pub fn set(&mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.value = value;
        } else {
            self.entries.push(Readout { name, value });
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_ref(), entry.value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut readouts = Readouts::new();
        readouts.set("generation", 1);
        readouts.set("population", "30");
        readouts.set("generation", 2);
        assert_eq!(readouts.get("generation"), Some("2"));
        assert_eq!(
            readouts.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["generation", "population"]
        );
    }

    #[test]
    fn serializes_as_ordered_list() {
        let mut readouts = Readouts::new();
        readouts.set("separation", format!("{:.4}", 0.0001));
        let json = serde_json::to_value(&readouts).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([{ "name": "separation", "value": "0.0001" }])
        );
    }
}
