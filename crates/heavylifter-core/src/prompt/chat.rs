//! Multi-message prompt templates.

use heavylifter_types::error::PromptError;
use heavylifter_types::llm::{Message, MessageRole};

use super::template::{PromptTemplate, PromptValues};

/// A filled chat template, ready to drop into a `CompletionRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedChat {
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

/// An ordered list of role-tagged templates.
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<(MessageRole, PromptTemplate)>,
}

impl ChatPromptTemplate {
    pub fn from_messages(messages: Vec<(MessageRole, &str)>) -> Result<Self, PromptError> {
        let messages = messages
            .into_iter()
            .map(|(role, text)| Ok((role, PromptTemplate::from_template(text)?)))
            .collect::<Result<Vec<_>, PromptError>>()?;
        Ok(Self { messages })
    }

    /// Union of every message's input variables, in order of first appearance.
    pub fn input_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for (_, template) in &self.messages {
            for var in template.input_variables() {
                if !vars.contains(var) {
                    vars.push(var.clone());
                }
            }
        }
        vars
    }

    /// Fill every message. System messages are joined (blank line between)
    /// into `system`; the rest keep their order.
    pub fn format_messages(&self, values: &PromptValues) -> Result<FormattedChat, PromptError> {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();
        for (role, template) in &self.messages {
            let content = template.format(values)?;
            match role {
                MessageRole::System => system_parts.push(content),
                role => messages.push(Message {
                    role: *role,
                    content,
                }),
            }
        }
        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };
        Ok(FormattedChat { system, messages })
    }
}
