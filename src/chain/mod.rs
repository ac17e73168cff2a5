// SPDX-License-Identifier: MIT

//! The prompt chain
//!
//! - `state` - the record threaded through every stage
//! - `stages` - prompt building and reply parsing per stage
//! - `graph` - transition table and topology description
//! - `executor` - runs the state machine against a model
//! - `diagram` - Mermaid / PNG export of the topology
//! - `config` - settings file, env overrides, API key bootstrap
//! - `logging` - console logger and section helpers

pub mod config;
pub mod diagram;
pub mod executor;
pub mod graph;
pub mod logging;
pub mod stages;
pub mod state;

pub use executor::{ChainEvent, ChainOptions, PromptChain};
pub use graph::{ChainGraph, Transition};
pub use stages::Stage;
pub use state::{ChainState, StateUpdate};
