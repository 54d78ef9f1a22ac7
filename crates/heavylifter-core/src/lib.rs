//! Business logic and port definitions for Heavy Lifter.
//!
//! This crate defines the "ports" (the `LlmProvider` and `SqlDatabase` traits)
//! that the infrastructure layer implements, plus everything that runs between
//! them: prompt templates, SQL extraction, the chains, and the in-memory chat
//! session store. It depends only on `heavylifter-types` -- never on
//! `heavylifter-infra` or any database/HTTP crate.

pub mod chain;
pub mod chat;
pub mod llm;
pub mod prompt;
pub mod sql;

#[cfg(test)]
pub(crate) mod testing;
