//! Infrastructure layer for Heavy Lifter.
//!
//! Contains implementations of the ports defined in `heavylifter-core`:
//! hosted-model clients (Anthropic, Bedrock), the sqlx database adapter, and
//! the configuration loader.

pub mod config;
pub mod llm;
pub mod sql;
