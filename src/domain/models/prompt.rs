//! Prompt templates
//!
//! A [`PromptTemplate`] is parsed once; the placeholder names it requires are
//! known before any field is supplied, so a missing field is reported before a
//! model is ever called.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::errors::{RagError, RagResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A validated template with `{name}` placeholders. `{{` and `}}` produce
/// literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
    fields: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template.
    pub fn new(template: impl Into<String>) -> RagResult<Self> {
        let source = template.into();
        let segments = parse(&source)?;

        let mut fields: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Field(name) = segment {
                if !fields.contains(name) {
                    fields.push(name.clone());
                }
            }
        }

        Ok(Self {
            source,
            segments,
            fields,
        })
    }

    /// Parse a template and check that it references every one of `required`.
    pub fn requiring(template: impl Into<String>, required: &[&str]) -> RagResult<Self> {
        let parsed = Self::new(template)?;
        for name in required {
            if !parsed.fields.iter().any(|f| f == name) {
                return Err(RagError::Config(format!(
                    "prompt template must contain a {{{name}}} placeholder"
                )));
            }
        }
        Ok(parsed)
    }

    /// Placeholder names in order of first appearance
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute every placeholder. Fields not named by the template are ignored.
    pub fn compose(&self, fields: &HashMap<String, String>) -> RagResult<Prompt> {
        if let Some(missing) = self.fields.iter().find(|f| !fields.contains_key(*f)) {
            return Err(RagError::MissingField(missing.clone()));
        }

        let mut text = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => text.push_str(s),
                Segment::Field(name) => text.push_str(&fields[name]),
            }
        }

        Ok(Prompt { text })
    }

    /// Convenience form of [`PromptTemplate::compose`] over `(name, value)` pairs
    pub fn compose_with(&self, pairs: &[(&str, &str)]) -> RagResult<Prompt> {
        let fields = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.compose(&fields)
    }
}

fn parse(template: &str) -> RagResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(RagError::Config(format!(
                        "unclosed placeholder '{{{name}' in prompt template"
                    )));
                }
                if !is_valid_name(&name) {
                    return Err(RagError::Config(format!(
                        "invalid placeholder name '{name}' in prompt template"
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(name));
            }
            '}' => {
                return Err(RagError::Config(
                    "unmatched '}' in prompt template (use '}}' for a literal brace)".to_string(),
                ));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Composed prompt text, ready for the inference engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt {
    text: String,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
