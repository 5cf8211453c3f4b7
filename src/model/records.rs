use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentions: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub source: String,
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub characters: Option<Vec<CharacterRecord>>,
    #[serde(default)]
    pub interactions: Option<Vec<InteractionRecord>>,
}

impl AnalysisResult {
    pub fn new(characters: Vec<CharacterRecord>, interactions: Vec<InteractionRecord>) -> Self {
        Self {
            characters: Some(characters),
            interactions: Some(interactions),
        }
    }
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, mentions: i64) -> Self {
        Self {
            name: name.into(),
            mentions,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl InteractionRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: i64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            contexts: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_optional_fields_read_as_empty() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"characters":[{"name":"Alice","mentions":4,"description":null},{"name":"Bob","mentions":null}],
                "interactions":[{"source":"Alice","target":"Bob","weight":3,"contexts":null}]}"#,
        )
        .unwrap();

        assert_eq!(
            result,
            AnalysisResult::new(
                vec![CharacterRecord::new("Alice", 4), CharacterRecord::new("Bob", 0)],
                vec![InteractionRecord::new("Alice", "Bob", 3)],
            )
        );
    }

    #[test]
    fn missing_optional_fields_read_as_empty() {
        let record: InteractionRecord = serde_json::from_str(r#"{"source":"A","target":"B"}"#).unwrap();
        assert_eq!(record, InteractionRecord::new("A", "B", 0));
    }
}
