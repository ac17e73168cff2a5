// SPDX-License-Identifier: MIT

//! Prompt chaining over a language model.
//!
//! - [`adk`] - model abstraction, the Anthropic client and typed errors
//! - [`chain`] - the letter → word → phrase → check workflow built on top

pub mod adk;
pub mod chain;
