//! Output shape descriptors and the provider-agnostic validator.
//!
//! A [`Shape`] describes what a model answer must look like. The same
//! descriptor is used three ways:
//! - sent to the provider as a response-schema constraint
//!   ([`Shape::to_json_schema`], [`Shape::to_openapi_schema`]),
//! - checked against the parsed reply ([`Shape::validate`]),
//! - printed for humans by the CLI.
//!
//! Validation coerces where the intent is unambiguous (numeric strings,
//! enum casing, dropping undeclared fields) and fails otherwise.

use serde_json::{Map, Number, Value, json};
use std::fmt;

/// Expected shape of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Enum(Vec<String>),
    Array { items: Box<Shape>, min_items: usize },
    Object(Vec<FieldShape>),
}

/// One named field of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
}

impl FieldShape {
    pub fn required(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

/// Where and why a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// JSONPath-like location, e.g. `$.keywords[0].difficulty`.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

impl std::error::Error for ShapeViolation {}

impl Shape {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
        }
    }

    pub fn number_range(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn non_negative() -> Self {
        Self::Number {
            min: Some(0.0),
            max: None,
        }
    }

    pub fn integer() -> Self {
        Self::Integer {
            min: None,
            max: None,
        }
    }

    pub fn integer_range(min: i64, max: i64) -> Self {
        Self::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    /// A 0–100 integer score.
    pub fn score() -> Self {
        Self::integer_range(0, 100)
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array_of(items: Shape) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: 0,
        }
    }

    pub fn non_empty_array_of(items: Shape) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: 1,
        }
    }

    pub fn text_list() -> Self {
        Self::array_of(Shape::Text)
    }

    pub fn object(fields: Vec<FieldShape>) -> Self {
        Self::Object(fields)
    }

    // ============================================================================
    // Validation
    // ============================================================================

    /// Validates `value` and returns the coerced, validated copy.
    pub fn validate(&self, value: &Value) -> Result<Value, ShapeViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<Value, ShapeViolation> {
        match self {
            Shape::Text => match value {
                Value::String(_) => Ok(value.clone()),
                other => Err(violation(path, format!("expected text, got {}", type_name(other)))),
            },
            Shape::Number { min, max } => {
                let n = as_f64(value)
                    .ok_or_else(|| violation(path, format!("expected number, got {}", type_name(value))))?;
                if let Some(min) = min
                    && n < *min
                {
                    return Err(violation(path, format!("{n} is below the minimum {min}")));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(violation(path, format!("{n} is above the maximum {max}")));
                }
                if value.is_number() {
                    return Ok(value.clone());
                }
                Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| violation(path, "number is not finite"))
            }
            Shape::Integer { min, max } => {
                let n = as_i64(value).ok_or_else(|| {
                    violation(path, format!("expected integer, got {}", describe(value)))
                })?;
                if let Some(min) = min
                    && n < *min
                {
                    return Err(violation(path, format!("{n} is below the minimum {min}")));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(violation(path, format!("{n} is above the maximum {max}")));
                }
                Ok(Value::from(n))
            }
            Shape::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(violation(
                    path,
                    format!("expected boolean, got {}", type_name(other)),
                )),
            },
            Shape::Enum(allowed) => {
                let raw = value.as_str().ok_or_else(|| {
                    violation(path, format!("expected one of {allowed:?}, got {}", type_name(value)))
                })?;
                allowed
                    .iter()
                    .find(|candidate| candidate.as_str() == raw)
                    .or_else(|| {
                        allowed
                            .iter()
                            .find(|candidate| candidate.eq_ignore_ascii_case(raw.trim()))
                    })
                    .map(|canonical| Value::String(canonical.clone()))
                    .ok_or_else(|| violation(path, format!("`{raw}` is not one of {allowed:?}")))
            }
            Shape::Array { items, min_items } => {
                let elements = value.as_array().ok_or_else(|| {
                    violation(path, format!("expected array, got {}", type_name(value)))
                })?;
                if elements.len() < *min_items {
                    return Err(violation(
                        path,
                        format!(
                            "expected at least {min_items} item(s), got {}",
                            elements.len()
                        ),
                    ));
                }
                elements
                    .iter()
                    .enumerate()
                    .map(|(index, element)| items.validate_at(&format!("{path}[{index}]"), element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Shape::Object(fields) => {
                let object = value.as_object().ok_or_else(|| {
                    violation(path, format!("expected object, got {}", type_name(value)))
                })?;
                let mut validated = Map::new();
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match object.get(&field.name) {
                        None | Some(Value::Null) if field.required => {
                            return Err(violation(&field_path, "required field is missing"));
                        }
                        None | Some(Value::Null) => {}
                        Some(field_value) => {
                            let checked = field.shape.validate_at(&field_path, field_value)?;
                            validated.insert(field.name.clone(), checked);
                        }
                    }
                }
                Ok(Value::Object(validated))
            }
        }
    }

    // ============================================================================
    // Schema emission
    // ============================================================================

    /// Standard JSON Schema (used for OpenAI `response_format`).
    pub fn to_json_schema(&self) -> Value {
        match self {
            Shape::Text => json!({ "type": "string" }),
            Shape::Number { min, max } => {
                let mut schema = json!({ "type": "number" });
                insert_bounds(&mut schema, min.map(Value::from), max.map(Value::from));
                schema
            }
            Shape::Integer { min, max } => {
                let mut schema = json!({ "type": "integer" });
                insert_bounds(&mut schema, min.map(Value::from), max.map(Value::from));
                schema
            }
            Shape::Boolean => json!({ "type": "boolean" }),
            Shape::Enum(values) => json!({ "type": "string", "enum": values }),
            Shape::Array { items, min_items } => {
                let mut schema = json!({ "type": "array", "items": items.to_json_schema() });
                if *min_items > 0 {
                    schema["minItems"] = Value::from(*min_items);
                }
                schema
            }
            Shape::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|field| (field.name.clone(), field.shape.to_json_schema()))
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required_names(fields),
                    "additionalProperties": false,
                })
            }
        }
    }

    /// OpenAPI 3.0 subset with uppercase type names (used for Gemini `responseSchema`).
    pub fn to_openapi_schema(&self) -> Value {
        match self {
            Shape::Text => json!({ "type": "STRING" }),
            Shape::Number { min, max } => {
                let mut schema = json!({ "type": "NUMBER" });
                insert_bounds(&mut schema, min.map(Value::from), max.map(Value::from));
                schema
            }
            Shape::Integer { min, max } => {
                let mut schema = json!({ "type": "INTEGER" });
                insert_bounds(&mut schema, min.map(Value::from), max.map(Value::from));
                schema
            }
            Shape::Boolean => json!({ "type": "BOOLEAN" }),
            Shape::Enum(values) => json!({ "type": "STRING", "format": "enum", "enum": values }),
            Shape::Array { items, min_items } => {
                let mut schema = json!({ "type": "ARRAY", "items": items.to_openapi_schema() });
                if *min_items > 0 {
                    schema["minItems"] = Value::from(*min_items);
                }
                schema
            }
            Shape::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|field| (field.name.clone(), field.shape.to_openapi_schema()))
                    .collect();
                let ordering: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required_names(fields),
                    "propertyOrdering": ordering,
                })
            }
        }
    }
}

fn violation(path: &str, reason: impl Into<String>) -> ShapeViolation {
    ShapeViolation {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn required_names(fields: &[FieldShape]) -> Vec<&str> {
    fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect()
}

fn insert_bounds(schema: &mut Value, min: Option<Value>, max: Option<Value>) {
    if let Some(min) = min {
        schema["minimum"] = min;
    }
    if let Some(max) = max {
        schema["maximum"] = max;
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Whole and inside `i64`; `as` would saturate anything larger.
fn is_whole_i64(f: f64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
    f.fract() == 0.0 && (-BOUND..BOUND).contains(&f)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => type_name(other).to_string(),
    }
}
