//! Prompt templates and the built-in prompts the chains use.

pub mod chat;
pub mod defaults;
pub mod template;

pub use chat::{ChatPromptTemplate, FormattedChat};
pub use template::{PromptTemplate, PromptValues};
