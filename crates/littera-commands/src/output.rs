//! The shared shape every command method returns, so the CLI layer can pick
//! human or structured rendering without each command knowing which.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub human: String,
    pub structured: Value,
}

impl CommandOutput {
    pub fn from_value(human: String, value: &impl Serialize) -> Self {
        let structured = serde_json::to_value(value).unwrap_or(Value::Null);
        Self { human, structured }
    }

    pub fn message(human: impl Into<String>) -> Self {
        let human = human.into();
        Self {
            structured: Value::String(human.clone()),
            human,
        }
    }
}
