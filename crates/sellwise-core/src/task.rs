//! Task input specifications and concrete task inputs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TaskError;

/// Semantic type of one input field.
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Text,
    Number,
    /// Closed set of accepted strings.
    Enum(Vec<String>),
    TextList,
    Boolean,
    Object(Vec<InputField>),
}

/// A named field of a [`TaskSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub kind: InputKind,
    pub required: bool,
}

impl InputField {
    pub fn required(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }

    /// Short type label used by the CLI.
    pub fn kind_label(&self) -> String {
        match &self.kind {
            InputKind::Text => "text".to_string(),
            InputKind::Number => "number".to_string(),
            InputKind::Enum(values) => format!("one of {}", values.join(" | ")),
            InputKind::TextList => "list of text".to_string(),
            InputKind::Boolean => "boolean".to_string(),
            InputKind::Object(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                format!("object {{{}}}", names.join(", "))
            }
        }
    }
}

/// Declared input contract for one task kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub name: String,
    pub fields: Vec<InputField>,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, fields: Vec<InputField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Checks `input` against the declared fields.
    ///
    /// Absent required fields, blank required text, empty required lists,
    /// wrong types and enum values outside their set are precondition failures.
    pub fn validate(&self, input: &TaskInput) -> Result<(), TaskError> {
        validate_fields(&self.fields, &input.values, "")
    }
}

fn validate_fields(
    fields: &[InputField],
    values: &Map<String, Value>,
    prefix: &str,
) -> Result<(), TaskError> {
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        match values.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(TaskError::precondition(format!(
                        "required input field `{path}` is missing"
                    )));
                }
            }
            Some(value) => validate_value(field, value, &path)?,
        }
    }
    Ok(())
}

fn validate_value(field: &InputField, value: &Value, path: &str) -> Result<(), TaskError> {
    let mismatch = |expected: &str| {
        TaskError::precondition(format!("input field `{path}` must be {expected}"))
    };

    match &field.kind {
        InputKind::Text => {
            let text = value.as_str().ok_or_else(|| mismatch("text"))?;
            if field.required && text.trim().is_empty() {
                return Err(TaskError::precondition(format!(
                    "required input field `{path}` is empty"
                )));
            }
        }
        InputKind::Number => {
            value.as_f64().ok_or_else(|| mismatch("a number"))?;
        }
        InputKind::Enum(allowed) => {
            let text = value.as_str().ok_or_else(|| mismatch("text"))?;
            if !allowed.iter().any(|candidate| candidate == text) {
                return Err(mismatch(&format!("one of {}", allowed.join(", "))));
            }
        }
        InputKind::TextList => {
            let items = value.as_array().ok_or_else(|| mismatch("a list of text"))?;
            if items.iter().any(|item| !item.is_string()) {
                return Err(mismatch("a list of text"));
            }
            if field.required && items.is_empty() {
                return Err(TaskError::precondition(format!(
                    "required input field `{path}` is empty"
                )));
            }
        }
        InputKind::Boolean => {
            value.as_bool().ok_or_else(|| mismatch("a boolean"))?;
        }
        InputKind::Object(nested) => {
            let object = value.as_object().ok_or_else(|| mismatch("an object"))?;
            validate_fields(nested, object, &format!("{path}."))?;
        }
    }
    Ok(())
}

/// Concrete field values for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskInput {
    values: Map<String, Value>,
}

impl TaskInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Builds an input from a JSON object.
    pub fn from_value(value: Value) -> Result<Self, TaskError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(TaskError::precondition("task input must be a JSON object")),
        }
    }
}

impl From<Map<String, Value>> for TaskInput {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
