//! Shared domain types for Heavy Lifter.
//!
//! This crate contains the types passed between the pipeline stages:
//! chat transcripts, LLM requests and responses, SQL query results,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod sql;
