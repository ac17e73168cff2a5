// SPDX-License-Identifier: MIT

//! Runtime state threaded through the prompt chain

use serde::{Deserialize, Serialize};
use std::fmt;

/// The record every stage reads from and writes into.
///
/// All fields start absent. `topic` is written once (by the caller or by the
/// letter stage's default) and never replaced; the other four are rewritten
/// on every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant: Option<bool>,
}

/// The single field (or pair, for the letter stage) a stage produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    Letter { topic: String, letter: String },
    Word(String),
    Phrase(String),
    Relevance(bool),
}

impl ChainState {
    /// Fresh state with no topic; the letter stage will supply the default
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state seeded with a topic
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    /// Topic, treating an empty string the same as an absent one
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the last check judged the phrase relevant
    pub fn is_relevant(&self) -> bool {
        self.relevant.unwrap_or(false)
    }

    /// Merge a stage's output into the state
    pub fn apply(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Letter { topic, letter } => {
                if self.topic().is_none() {
                    self.topic = Some(topic);
                }
                self.letter = Some(letter);
            }
            StateUpdate::Word(word) => self.word = Some(word),
            StateUpdate::Phrase(phrase) => self.phrase = Some(phrase),
            StateUpdate::Relevance(relevant) => self.relevant = Some(relevant),
        }
    }

    /// Drop every derived field before a retry pass so that no snapshot
    /// mixes values from two passes
    pub fn reset_pass(&mut self) {
        self.letter = None;
        self.word = None;
        self.phrase = None;
        self.relevant = None;
    }

    /// Convert state to a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field<T: fmt::Debug>(v: &Option<T>) -> String {
            match v {
                Some(v) => format!("{:?}", v),
                None => "None".to_string(),
            }
        }

        write!(
            f,
            "{{topic: {}, letter: {}, word: {}, phrase: {}, relevant: {}}}",
            field(&self.topic),
            field(&self.letter),
            field(&self.word),
            field(&self.phrase),
            field(&self.relevant)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_state_is_empty() {
        let state = ChainState::new();
        assert!(state.topic().is_none());
        assert!(state.letter.is_none());
        assert!(!state.is_relevant());
    }

    #[test]
    fn test_empty_topic_counts_as_absent() {
        let state = ChainState::with_topic("");
        assert!(state.topic().is_none());
    }

    #[test]
    fn test_letter_update_sets_default_topic_once() {
        let mut state = ChainState::new();
        state.apply(StateUpdate::Letter {
            topic: "Football".to_string(),
            letter: "G".to_string(),
        });
        assert_eq!(state.topic(), Some("Football"));

        state.apply(StateUpdate::Letter {
            topic: "Tennis".to_string(),
            letter: "R".to_string(),
        });
        assert_eq!(state.topic(), Some("Football"));
        assert_eq!(state.letter.as_deref(), Some("R"));
    }

    #[test]
    fn test_letter_update_keeps_caller_topic() {
        let mut state = ChainState::with_topic("Chess");
        state.apply(StateUpdate::Letter {
            topic: "Chess".to_string(),
            letter: "K".to_string(),
        });
        assert_eq!(state.topic(), Some("Chess"));
    }

    #[test]
    fn test_updates_overwrite() {
        let mut state = ChainState::with_topic("Chess");
        state.apply(StateUpdate::Word("King".to_string()));
        state.apply(StateUpdate::Word("Knight".to_string()));
        state.apply(StateUpdate::Relevance(false));
        state.apply(StateUpdate::Relevance(true));

        assert_eq!(state.word.as_deref(), Some("Knight"));
        assert!(state.is_relevant());
    }

    #[test]
    fn test_reset_pass_keeps_topic() {
        let mut state = ChainState {
            topic: Some("Chess".to_string()),
            letter: Some("K".to_string()),
            word: Some("King".to_string()),
            phrase: Some("The King moves.".to_string()),
            relevant: Some(false),
        };

        state.reset_pass();

        assert_eq!(state, ChainState::with_topic("Chess"));
    }

    #[test]
    fn test_to_json_omits_absent_fields() {
        let mut state = ChainState::with_topic("Chess");
        state.apply(StateUpdate::Relevance(true));

        assert_eq!(state.to_json(), json!({"topic": "Chess", "relevant": true}));
    }

    #[test]
    fn test_display() {
        let mut state = ChainState::with_topic("Chess");
        state.apply(StateUpdate::Relevance(true));

        assert_eq!(
            state.to_string(),
            r#"{topic: "Chess", letter: None, word: None, phrase: None, relevant: true}"#
        );
    }
}
