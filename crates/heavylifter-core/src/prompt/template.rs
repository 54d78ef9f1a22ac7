//! String prompt templates with named `{placeholder}` slots.
//!
//! Syntax follows format strings: `{name}` is a slot, `{{` and `}}` are
//! literal braces. Names are identifiers (`[A-Za-z_][A-Za-z0-9_]*`).

use std::collections::BTreeMap;

use heavylifter_types::error::PromptError;

/// Values used to fill a template, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptValues {
    values: BTreeMap<String, String>,
}

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
    partials: BTreeMap<String, String>,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template string.
    pub fn from_template(source: &str) -> Result<Self, PromptError> {
        let segments = parse(source)?;
        let mut template = Self {
            source: source.to_string(),
            segments,
            partials: BTreeMap::new(),
            input_variables: Vec::new(),
        };
        template.refresh_input_variables();
        Ok(template)
    }

    /// The raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variables still to be supplied to [`format`](Self::format), in order of
    /// first appearance.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Pre-fill a variable. It is dropped from `input_variables`.
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.insert(name.into(), value.into());
        self.refresh_input_variables();
        self
    }

    /// Append another template after this one.
    pub fn concat(mut self, other: PromptTemplate) -> Self {
        self.source.push_str(&other.source);
        self.segments.extend(other.segments);
        self.partials.extend(other.partials);
        self.refresh_input_variables();
        self
    }

    /// Fill every slot. Values for names the template does not use are ignored.
    pub fn format(&self, values: &PromptValues) -> Result<String, PromptError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .get(name)
                        .or_else(|| self.partials.get(name).map(String::as_str))
                        .ok_or_else(|| PromptError::MissingVariable(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn refresh_input_variables(&mut self) {
        let mut vars: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                if !self.partials.contains_key(name) && !vars.contains(name) {
                    vars.push(name.clone());
                }
            }
        }
        self.input_variables = vars;
    }
}

fn parse(source: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                let mut name = String::new();
                let mut closed = false;
                for (_, nc) in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(nc);
                }
                if !closed {
                    return Err(PromptError::Malformed {
                        position: pos,
                        reason: "unclosed '{'".to_string(),
                    });
                }
                if !is_identifier(&name) {
                    return Err(PromptError::Malformed {
                        position: pos,
                        reason: format!("invalid variable name '{name}'"),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(PromptError::Malformed {
                        position: pos,
                        reason: "single '}' must be escaped as '}}'".to_string(),
                    });
                }
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_variables_in_first_appearance_order() {
        let template =
            PromptTemplate::from_template("Question: {question}\nSQL Query: {query}\nAgain: {question}")
                .unwrap();
        assert_eq!(template.input_variables(), &["question", "query"]);
    }

    #[test]
    fn test_format_fills_all_slots() {
        let template = PromptTemplate::from_template(
            "You are a helpful assistant that translates {input_language} to {output_language}.",
        )
        .unwrap();
        let values = PromptValues::new()
            .with("input_language", "English")
            .with("output_language", "German");
        assert_eq!(
            template.format(&values).unwrap(),
            "You are a helpful assistant that translates English to German."
        );
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::from_template("query {{ targets }} for {name}").unwrap();
        assert_eq!(template.input_variables(), &["name"]);
        let out = template.format(&PromptValues::new().with("name", "geo")).unwrap();
        assert_eq!(out, "query { targets } for geo");
    }

    #[test]
    fn test_values_may_contain_braces() {
        let template = PromptTemplate::from_template("Schema:\n{gqlSchema}").unwrap();
        let out = template
            .format(&PromptValues::new().with("gqlSchema", "type Query { deal: Deal }"))
            .unwrap();
        assert_eq!(out, "Schema:\ntype Query { deal: Deal }");
    }

    #[test]
    fn test_missing_variable_is_reported_by_name() {
        let template = PromptTemplate::from_template("{question} -> {query}").unwrap();
        let err = template
            .format(&PromptValues::new().with("question", "q"))
            .unwrap_err();
        assert_eq!(err, PromptError::MissingVariable("query".to_string()));
    }

    #[test]
    fn test_partial_removes_input_variable() {
        let template = PromptTemplate::from_template("top {top_k} from {table_info}")
            .unwrap()
            .partial("top_k", "5");
        assert_eq!(template.input_variables(), &["table_info"]);
        let out = template
            .format(&PromptValues::new().with("table_info", "t"))
            .unwrap();
        assert_eq!(out, "top 5 from t");
    }

    #[test]
    fn test_explicit_value_overrides_partial() {
        let template = PromptTemplate::from_template("{top_k}")
            .unwrap()
            .partial("top_k", "5");
        let out = template.format(&PromptValues::new().with("top_k", "10")).unwrap();
        assert_eq!(out, "10");
    }

    #[test]
    fn test_concat_joins_sources_and_variables() {
        let body = PromptTemplate::from_template("You are a {dialect} expert.\n").unwrap();
        let suffix = PromptTemplate::from_template("Question: {input}").unwrap();
        let template = body.concat(suffix);
        assert_eq!(template.input_variables(), &["dialect", "input"]);
        assert_eq!(template.source(), "You are a {dialect} expert.\nQuestion: {input}");
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(
            PromptTemplate::from_template("unclosed {name"),
            Err(PromptError::Malformed { position: 9, .. })
        ));
        assert!(matches!(
            PromptTemplate::from_template("stray } brace"),
            Err(PromptError::Malformed { position: 6, .. })
        ));
        assert!(PromptTemplate::from_template("empty {}").is_err());
        assert!(PromptTemplate::from_template("bad {1st}").is_err());
        assert!(PromptTemplate::from_template("bad {a b}").is_err());
    }

    #[test]
    fn test_template_without_variables() {
        let template = PromptTemplate::from_template("Only return the SQL.").unwrap();
        assert!(template.input_variables().is_empty());
        assert_eq!(template.format(&PromptValues::new()).unwrap(), "Only return the SQL.");
    }
}
