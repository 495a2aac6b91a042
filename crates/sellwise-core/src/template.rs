//! Prompt templates.
//!
//! Templates use Jinja syntax (minijinja): `{{ productName }}` placeholders,
//! `{% if tone %}...{% endif %}` optional sections, and list formatting
//! through `join` or the `bullets` filter. Rendering is pure.

use minijinja::Environment;
use std::fmt;

use crate::error::TaskError;
use crate::task::TaskInput;

/// A fixed template string bound to one task kind.
#[derive(Clone)]
pub struct PromptTemplate {
    name: String,
    source: String,
    env: Environment<'static>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("bullets", bullets);
        Self {
            name: name.into(),
            source: source.into(),
            env,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parses the template without rendering it.
    pub fn check(&self) -> Result<(), TaskError> {
        self.env
            .template_from_str(&self.source)
            .map(|_| ())
            .map_err(|err| self.render_error(err))
    }

    /// Substitutes `input` into the template.
    pub fn render(&self, input: &TaskInput) -> Result<String, TaskError> {
        self.env
            .render_str(&self.source, input.as_map())
            .map(|text| text.trim().to_string())
            .map_err(|err| self.render_error(err))
    }

    fn render_error(&self, err: minijinja::Error) -> TaskError {
        TaskError::precondition(format!(
            "prompt template `{}` could not be rendered: {err}",
            self.name
        ))
    }
}

impl fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("name", &self.name)
            .field("source_len", &self.source.len())
            .finish()
    }
}

/// One `- item` line per element.
fn bullets(items: Vec<String>) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
