// SPDX-License-Identifier: MIT

//! The four stages of the chain
//!
//! Each stage builds one prompt from the current state, sends it to the
//! model, and turns the raw reply into a [`StateUpdate`]. Parsing never
//! fails: a reply of the wrong shape degrades to a fixed fallback.

use crate::adk::error::ModelError;
use crate::adk::model::{complete, GenerationConfig, Model};
use crate::chain::logging::banner;
use crate::chain::state::{ChainState, StateUpdate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter used when the model returns nothing
pub const DEFAULT_LETTER: &str = "A";

/// A processing stage of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Letter,
    Word,
    Phrase,
    Check,
}

impl Stage {
    /// Stages in execution order
    pub const ALL: [Stage; 4] = [Stage::Letter, Stage::Word, Stage::Phrase, Stage::Check];

    /// Display name, also used as the node id in the graph
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Letter => "Generate Letter",
            Stage::Word => "Generate Word",
            Stage::Phrase => "Generate Phrase",
            Stage::Check => "Check Topic",
        }
    }

    /// Build the prompt for this stage.
    ///
    /// `topic` is the already resolved topic; the other inputs are read
    /// from `state` and are guaranteed present by the graph order.
    pub fn prompt(&self, topic: &str, state: &ChainState) -> String {
        match self {
            Stage::Letter => format!(
                "Generate a single letter that could start a word about the topic '{}'. \
                 Only return the letter.",
                topic
            ),
            Stage::Word => format!(
                "Generate a single word about '{}' starting with '{}'. Return only the word.",
                topic,
                state.letter.as_deref().unwrap_or_default()
            ),
            Stage::Phrase => format!(
                "Generate a short phrase about '{}' including the word '{}'. One sentence only.",
                topic,
                state.word.as_deref().unwrap_or_default()
            ),
            Stage::Check => format!(
                "Topic: {}\nPhrase: {}\n\nIs this phrase relevant to the topic? Answer 'yes' or 'no'.",
                topic,
                state.phrase.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Turn the raw model reply into this stage's state update
    pub fn parse(&self, topic: &str, raw: &str) -> StateUpdate {
        match self {
            Stage::Letter => StateUpdate::Letter {
                topic: topic.to_string(),
                letter: parse_letter(raw),
            },
            Stage::Word => StateUpdate::Word(parse_word(raw)),
            Stage::Phrase => StateUpdate::Phrase(parse_phrase(raw)),
            Stage::Check => StateUpdate::Relevance(parse_relevance(raw)),
        }
    }

    /// Run the stage: one model call, then parse.
    ///
    /// `default_topic` is only consulted by the letter stage when the state
    /// has no topic yet.
    pub async fn run(
        &self,
        model: &dyn Model,
        state: &ChainState,
        default_topic: &str,
        config: Option<&GenerationConfig>,
    ) -> Result<StateUpdate, ModelError> {
        banner(self.name());

        let topic = state.topic().unwrap_or(default_topic);
        let prompt = self.prompt(topic, state);
        log::debug!("{} prompt: {:?}", self.name(), prompt);

        let raw = complete(model, &prompt, config).await?;
        let update = self.parse(topic, &raw);

        match &update {
            StateUpdate::Letter { letter, .. } => {
                log::info!("Letter generated: {:?} (raw={:?})", letter, raw.trim())
            }
            StateUpdate::Word(word) => {
                log::info!("Word generated: {:?} (raw={:?})", word, raw.trim())
            }
            StateUpdate::Phrase(phrase) => log::info!("Phrase generated: {:?}", phrase),
            StateUpdate::Relevance(relevant) => log::info!(
                "Relevance: {} (model said: {:?})",
                relevant,
                raw.trim().to_lowercase()
            ),
        }

        Ok(update)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First non-whitespace character, or [`DEFAULT_LETTER`]
pub fn parse_letter(raw: &str) -> String {
    raw.trim()
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_else(|| DEFAULT_LETTER.to_string())
}

/// First whitespace-delimited token, or empty
pub fn parse_word(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or_default().to_string()
}

/// The reply with surrounding whitespace removed
pub fn parse_phrase(raw: &str) -> String {
    raw.trim().to_string()
}

/// True iff the lowercased, trimmed reply starts with `y`
pub fn parse_relevance(raw: &str) -> bool {
    raw.trim().to_lowercase().starts_with('y')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::Content;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Model for FixedModel {
        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content, ModelError> {
            self.prompts
                .lock()
                .unwrap()
                .extend(history.iter().map(|c| c.text()));
            Ok(Content::model(self.reply.clone()))
        }
    }

    #[test]
    fn test_parse_letter() {
        assert_eq!(parse_letter("K"), "K");
        assert_eq!(parse_letter("  \n Queen"), "Q");
        assert_eq!(parse_letter(""), DEFAULT_LETTER);
        assert_eq!(parse_letter(" \t\n"), DEFAULT_LETTER);
    }

    #[test]
    fn test_parse_letter_multibyte() {
        assert_eq!(parse_letter("Éclair"), "É");
        assert_eq!(parse_letter("Éclair").chars().count(), 1);
    }

    #[test]
    fn test_parse_word() {
        assert_eq!(parse_word("King"), "King");
        assert_eq!(parse_word("  King of the board"), "King");
        assert_eq!(parse_word("Knight\nis a piece"), "Knight");
        assert_eq!(parse_word(""), "");
        assert_eq!(parse_word("   "), "");
    }

    #[test]
    fn test_parse_phrase() {
        assert_eq!(
            parse_phrase("  The King controls the chessboard.\n"),
            "The King controls the chessboard."
        );
        assert_eq!(parse_phrase("a  b   c"), "a  b   c");
    }

    #[test]
    fn test_parse_relevance() {
        assert!(parse_relevance("Yes, clearly relevant."));
        assert!(parse_relevance("  yes"));
        assert!(parse_relevance("Y"));
        assert!(!parse_relevance("no"));
        assert!(!parse_relevance("Not really, yes-ish"));
        assert!(!parse_relevance(""));
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "Generate Letter",
                "Generate Word",
                "Generate Phrase",
                "Check Topic"
            ]
        );
    }

    #[test]
    fn test_prompts_embed_inputs() {
        let state = ChainState {
            topic: Some("Chess".to_string()),
            letter: Some("K".to_string()),
            word: Some("King".to_string()),
            phrase: Some("The King controls the chessboard.".to_string()),
            relevant: None,
        };

        assert!(Stage::Letter.prompt("Chess", &state).contains("'Chess'"));

        let word = Stage::Word.prompt("Chess", &state);
        assert!(word.contains("'Chess'") && word.contains("'K'"));

        let phrase = Stage::Phrase.prompt("Chess", &state);
        assert!(phrase.contains("'King'"));

        let check = Stage::Check.prompt("Chess", &state);
        assert!(check.starts_with("Topic: Chess\nPhrase: The King controls the chessboard."));
    }

    #[tokio::test]
    async fn test_letter_stage_uses_default_topic() {
        let model = FixedModel::new("G");
        let update = Stage::Letter
            .run(&model, &ChainState::new(), "Football", None)
            .await
            .unwrap();

        assert_eq!(
            update,
            StateUpdate::Letter {
                topic: "Football".to_string(),
                letter: "G".to_string()
            }
        );
        assert!(model.prompts.lock().unwrap()[0].contains("'Football'"));
    }

    #[tokio::test]
    async fn test_letter_stage_empty_reply_ignores_topic() {
        for topic in ["Chess", "Cooking", "Astronomy"] {
            let model = FixedModel::new("");
            let update = Stage::Letter
                .run(&model, &ChainState::with_topic(topic), "Football", None)
                .await
                .unwrap();

            match update {
                StateUpdate::Letter { letter, .. } => assert_eq!(letter, DEFAULT_LETTER),
                other => panic!("Expected Letter update, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_check_stage() {
        let model = FixedModel::new("  YES.");
        let mut state = ChainState::with_topic("Chess");
        state.phrase = Some("Pawns advance.".to_string());

        let update = Stage::Check
            .run(&model, &state, "Football", None)
            .await
            .unwrap();

        assert_eq!(update, StateUpdate::Relevance(true));
    }
}
