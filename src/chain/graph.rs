// SPDX-License-Identifier: MIT

//! Chain topology and the transition function
//!
//! The control flow is fixed: Letter → Word → Phrase → Check, and Check
//! either ends the run or loops back to Letter. [`next`] encodes that table;
//! [`ChainGraph`] describes the same topology as data for export.

use crate::chain::stages::Stage;
use crate::chain::state::ChainState;
use once_cell::sync::Lazy;
use serde::Serialize;

pub const START: &str = "__start__";
pub const END: &str = "__end__";

/// Branch label taken when the phrase is relevant
pub const DONE_LABEL: &str = "done";
/// Branch label taken when the phrase is not relevant
pub const RETRY_LABEL: &str = "retry";

/// Outcome of leaving a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Run this stage next
    Continue(Stage),
    /// The workflow is done
    Terminate,
}

/// Branch decision at the check stage.
///
/// There is no retry cap: a model that never says "yes" keeps the chain
/// looping until the caller stops it.
pub fn decide(state: &ChainState) -> Transition {
    if state.is_relevant() {
        Transition::Terminate
    } else {
        Transition::Continue(Stage::Letter)
    }
}

/// Transition out of `stage` once it has written its field into `state`
pub fn next(stage: Stage, state: &ChainState) -> Transition {
    match stage {
        Stage::Letter => Transition::Continue(Stage::Word),
        Stage::Word => Transition::Continue(Stage::Phrase),
        Stage::Phrase => Transition::Continue(Stage::Check),
        Stage::Check => decide(state),
    }
}

/// Edge in the graph description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Edge {
    /// Unconditional edge
    Direct { from: String, to: String },
    /// Labelled branches out of a decision node
    Conditional {
        from: String,
        branches: Vec<(String, String)>,
    },
}

/// Data-only description of the chain, for diagrams
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

static PROMPT_CHAIN: Lazy<ChainGraph> = Lazy::new(|| {
    let nodes: Vec<String> = Stage::ALL.iter().map(|s| s.name().to_string()).collect();

    let mut edges = vec![Edge::Direct {
        from: START.to_string(),
        to: Stage::Letter.name().to_string(),
    }];
    for pair in Stage::ALL.windows(2) {
        edges.push(Edge::Direct {
            from: pair[0].name().to_string(),
            to: pair[1].name().to_string(),
        });
    }
    edges.push(Edge::Conditional {
        from: Stage::Check.name().to_string(),
        branches: vec![
            (DONE_LABEL.to_string(), END.to_string()),
            (RETRY_LABEL.to_string(), Stage::Letter.name().to_string()),
        ],
    });

    ChainGraph { nodes, edges }
});

impl ChainGraph {
    /// The letter/word/phrase/check topology
    pub fn prompt_chain() -> Self {
        PROMPT_CHAIN.clone()
    }

    /// Nodes that own a conditional edge
    pub fn conditional_nodes(&self) -> Vec<&str> {
        self.edges
            .iter()
            .filter_map(|e| match e {
                Edge::Conditional { from, .. } => Some(from.as_str()),
                Edge::Direct { .. } => None,
            })
            .collect()
    }
}
