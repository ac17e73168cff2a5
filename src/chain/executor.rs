// SPDX-License-Identifier: MIT

//! Chain executor
//!
//! Drives the state machine one stage at a time, strictly sequentially.
//! Every stage makes exactly one model call; a model error aborts the run
//! and is returned as-is.

use crate::adk::error::{ConfigError, ModelError};
use crate::adk::model::{GenerationConfig, Model};
use crate::chain::graph::{next, Transition};
use crate::chain::stages::Stage;
use crate::chain::state::ChainState;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Topic used when the initial state carries none
pub const DEFAULT_TOPIC: &str = "Football";

/// Progress reported by [`PromptChain::stream`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChainEvent {
    /// A stage finished; `state` is the snapshot right after it
    Step {
        step: usize,
        pass: usize,
        stage: Stage,
        state: ChainState,
    },
    /// The check said "no"; `pass` is the pass about to start
    Retry { pass: usize },
    /// Terminal state reached
    Done(ChainState),
}

/// Knobs the executor needs besides the model itself.
///
/// The default topic is never blank, so the letter stage always leaves a
/// non-empty topic behind.
#[derive(Debug, Clone)]
pub struct ChainOptions {
    default_topic: String,
    pub generation: GenerationConfig,
}

impl ChainOptions {
    pub fn new(
        default_topic: impl Into<String>,
        generation: GenerationConfig,
    ) -> Result<Self, ConfigError> {
        let default_topic = default_topic.into();
        if default_topic.trim().is_empty() {
            return Err(ConfigError::Empty("default_topic".to_string()));
        }
        Ok(Self {
            default_topic,
            generation,
        })
    }

    pub fn default_topic(&self) -> &str {
        &self.default_topic
    }
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            default_topic: DEFAULT_TOPIC.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

/// The letter → word → phrase → check workflow
pub struct PromptChain {
    model: Arc<dyn Model>,
    options: ChainOptions,
}

impl PromptChain {
    pub fn new(model: Arc<dyn Model>, options: ChainOptions) -> Self {
        Self { model, options }
    }

    /// Run to completion and return the final state
    pub async fn invoke(&self, initial: ChainState) -> Result<ChainState, ModelError> {
        self.execute(initial, None).await
    }

    /// Run to completion, reporting every step on `tx`.
    ///
    /// A dropped receiver does not stop the run, but a live one must be
    /// drained concurrently (e.g. from a spawned task): once the channel is
    /// full, each send waits for room and the chain stalls with it.
    pub async fn stream(
        &self,
        initial: ChainState,
        tx: mpsc::Sender<ChainEvent>,
    ) -> Result<ChainState, ModelError> {
        self.execute(initial, Some(&tx)).await
    }

    async fn execute(
        &self,
        initial: ChainState,
        tx: Option<&mpsc::Sender<ChainEvent>>,
    ) -> Result<ChainState, ModelError> {
        let mut state = initial;
        let mut stage = Stage::Letter;
        let mut step = 0;
        let mut pass = 1;

        loop {
            let update = stage
                .run(
                    self.model.as_ref(),
                    &state,
                    &self.options.default_topic,
                    Some(&self.options.generation),
                )
                .await
                .map_err(|e| {
                    log::error!("{} failed on pass {}: {}", stage, pass, e);
                    e
                })?;

            state.apply(update);
            step += 1;
            emit(
                tx,
                ChainEvent::Step {
                    step,
                    pass,
                    stage,
                    state: state.clone(),
                },
            )
            .await;

            match next(stage, &state) {
                Transition::Terminate => break,
                Transition::Continue(Stage::Letter) => {
                    pass += 1;
                    log::info!("Phrase judged not relevant, starting pass {}", pass);
                    state.reset_pass();
                    emit(tx, ChainEvent::Retry { pass }).await;
                    stage = Stage::Letter;
                }
                Transition::Continue(following) => stage = following,
            }
        }

        log::info!("Chain finished after {} steps ({} passes)", step, pass);
        emit(tx, ChainEvent::Done(state.clone())).await;
        Ok(state)
    }
}

async fn emit(tx: Option<&mpsc::Sender<ChainEvent>>, event: ChainEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event).await;
    }
}
