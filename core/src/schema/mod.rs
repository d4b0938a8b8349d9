//! Declarative input schemas and the interpreter that evaluates them.
//!
//! # Design
//! A `Schema` is plain data: an ordered list of `FieldSchema` values plus an
//! `additional_properties` switch. Per-field rules come from a closed set of
//! `Constraint` variants; `required` and `nullable` are field flags read by
//! the same interpreter. Field order is significant: violations are reported
//! in declaration order, never in the order of the required list.
//!
//! Evaluation goes through an explicit `CompiledSchema` handle returned by
//! [`compile`]. Compiling only resolves `Pattern` constraints into regexes,
//! so compiling on every call is equivalent to reusing a handle.
//!
//! Violation records use the same keywords, params and messages as Ajv so
//! they read the same as the errors the API server returns.

pub mod registry;

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// JSON type expected for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldType>),
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array(_) => "array",
        }
    }

    /// Ajv semantics: `integer` accepts any number without a fractional part.
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                _ => false,
            },
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array(_) => value.is_array(),
        }
    }
}

/// A rule applied to a present, correctly typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Minimum string length in characters.
    MinLength(usize),
    /// Inclusive numeric bounds.
    Range {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    /// Closed set of allowed string values, case-sensitive.
    Enum(&'static [&'static str]),
    /// Regular expression the string must match.
    Pattern(&'static str),
}

/// One declared field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// Lets the field be `null`. Absence is governed by `required` alone.
    pub nullable: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldSchema {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            nullable: false,
            constraints: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn array_of(name: &'static str, items: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(items)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn min_length(mut self, limit: usize) -> Self {
        self.constraints.push(Constraint::MinLength(limit));
        self
    }

    pub fn minimum(self, limit: f64) -> Self {
        self.range(Some(limit), None)
    }

    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.constraints.push(Constraint::Range { minimum, maximum });
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.constraints.push(Constraint::Enum(allowed));
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.constraints.push(Constraint::Pattern(pattern));
        self
    }
}

/// Declarative description of one input shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub additional_properties: bool,
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    /// An object schema that allows unknown fields.
    pub fn object() -> Self {
        Self {
            additional_properties: true,
            fields: Vec::new(),
        }
    }

    pub fn strict(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }
}

/// One failed constraint, shaped like an Ajv error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON Pointer to the offending value; empty for object-level rules.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    pub keyword: String,
    pub params: Value,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Ordered list of violations from a single validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }

    fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

enum CompiledConstraint {
    MinLength(usize),
    Range {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Enum(&'static [&'static str]),
    Pattern { source: &'static str, regex: Regex },
}

struct CompiledField {
    name: &'static str,
    field_type: FieldType,
    required: bool,
    nullable: bool,
    constraints: Vec<CompiledConstraint>,
}

/// A schema ready for evaluation. Obtain one with [`compile`].
pub struct CompiledSchema {
    additional_properties: bool,
    fields: Vec<CompiledField>,
}

/// Resolve a schema into an evaluable handle.
pub fn compile(schema: &Schema) -> Result<CompiledSchema, ApiError> {
    let fields = schema
        .fields
        .iter()
        .map(|field| {
            let constraints = field
                .constraints
                .iter()
                .map(|constraint| compile_constraint(field.name, constraint))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledField {
                name: field.name,
                field_type: field.field_type.clone(),
                required: field.required,
                nullable: field.nullable,
                constraints,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(CompiledSchema {
        additional_properties: schema.additional_properties,
        fields,
    })
}

fn compile_constraint(field: &str, constraint: &Constraint) -> Result<CompiledConstraint, ApiError> {
    Ok(match constraint {
        Constraint::MinLength(limit) => CompiledConstraint::MinLength(*limit),
        Constraint::Range { minimum, maximum } => CompiledConstraint::Range {
            minimum: *minimum,
            maximum: *maximum,
        },
        Constraint::Enum(allowed) => CompiledConstraint::Enum(allowed),
        Constraint::Pattern(source) => {
            let regex = Regex::new(source).map_err(|e| {
                ApiError::Configuration(format!("invalid pattern for field {field}: {e}"))
            })?;
            CompiledConstraint::Pattern { source, regex }
        }
    })
}

impl CompiledSchema {
    /// Evaluate every declared field and collect all violations.
    pub fn evaluate(&self, input: &Value) -> Violations {
        let mut violations = Violations::default();

        let Some(object) = input.as_object() else {
            for field in self.fields.iter().filter(|f| f.required) {
                violations.push(required_violation(field.name));
            }
            return violations;
        };

        for field in &self.fields {
            match object.get(field.name) {
                None => {
                    if field.required {
                        violations.push(required_violation(field.name));
                    }
                }
                Some(Value::Null) if field.nullable => {}
                Some(value) => field.evaluate(value, &mut violations),
            }
        }

        if !self.additional_properties {
            for key in object.keys() {
                if !self.fields.iter().any(|f| f.name == key) {
                    violations.push(Violation {
                        instance_path: String::new(),
                        schema_path: "#/additionalProperties".to_string(),
                        keyword: "additionalProperties".to_string(),
                        params: json!({ "additionalProperty": key }),
                        message: "must NOT have additional properties".to_string(),
                    });
                }
            }
        }

        violations
    }
}

impl CompiledField {
    fn evaluate(&self, value: &Value, violations: &mut Violations) {
        let instance_path = format!("/{}", escape_pointer(self.name));
        let schema_path = format!("#/properties/{}", escape_pointer(self.name));

        if !self.field_type.matches(value) {
            violations.push(type_violation(&instance_path, &schema_path, &self.field_type));
            return;
        }

        if let (FieldType::Array(items), Value::Array(elements)) = (&self.field_type, value) {
            for (i, element) in elements.iter().enumerate() {
                if !items.matches(element) {
                    violations.push(type_violation(
                        &format!("{instance_path}/{i}"),
                        &format!("{schema_path}/items"),
                        items,
                    ));
                }
            }
        }

        for constraint in &self.constraints {
            constraint.evaluate(value, &instance_path, &schema_path, violations);
        }
    }
}

impl CompiledConstraint {
    fn evaluate(&self, value: &Value, instance_path: &str, schema_path: &str, violations: &mut Violations) {
        let violation = |keyword: &str, params: Value, message: String| Violation {
            instance_path: instance_path.to_string(),
            schema_path: format!("{schema_path}/{keyword}"),
            keyword: keyword.to_string(),
            params,
            message,
        };

        match self {
            CompiledConstraint::MinLength(limit) => {
                if let Some(s) = value.as_str() {
                    if s.chars().count() < *limit {
                        violations.push(violation(
                            "minLength",
                            json!({ "limit": limit }),
                            format!("must NOT have fewer than {limit} characters"),
                        ));
                    }
                }
            }
            CompiledConstraint::Range { minimum, maximum } => {
                let Some(n) = value.as_f64() else { return };
                if let Some(min) = minimum {
                    if n < *min {
                        violations.push(violation(
                            "minimum",
                            json!({ "comparison": ">=", "limit": limit_value(*min) }),
                            format!("must be >= {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        violations.push(violation(
                            "maximum",
                            json!({ "comparison": "<=", "limit": limit_value(*max) }),
                            format!("must be <= {max}"),
                        ));
                    }
                }
            }
            CompiledConstraint::Enum(allowed) => {
                let known = value.as_str().is_some_and(|s| allowed.contains(&s));
                if !known {
                    violations.push(violation(
                        "enum",
                        json!({ "allowedValues": allowed }),
                        "must be equal to one of the allowed values".to_string(),
                    ));
                }
            }
            CompiledConstraint::Pattern { source, regex } => {
                if let Some(s) = value.as_str() {
                    if !regex.is_match(s) {
                        violations.push(violation(
                            "pattern",
                            json!({ "pattern": source }),
                            format!("must match pattern \"{source}\""),
                        ));
                    }
                }
            }
        }
    }
}

fn required_violation(field: &str) -> Violation {
    Violation {
        instance_path: String::new(),
        schema_path: "#/required".to_string(),
        keyword: "required".to_string(),
        params: json!({ "missingProperty": field }),
        message: format!("must have required property '{field}'"),
    }
}

fn type_violation(instance_path: &str, schema_path: &str, field_type: &FieldType) -> Violation {
    Violation {
        instance_path: instance_path.to_string(),
        schema_path: format!("{schema_path}/type"),
        keyword: "type".to_string(),
        params: json!({ "type": field_type.name() }),
        message: format!("must be {}", field_type.name()),
    }
}

/// Render a numeric limit the way it was written in the schema.
fn limit_value(limit: f64) -> Value {
    if limit.fract() == 0.0 && limit.abs() < 1e15 {
        json!(limit as i64)
    } else {
        json!(limit)
    }
}

/// RFC 6901 escaping for a single pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Serialize an input to the JSON value the schema interpreter reads.
pub(crate) fn to_instance<T: Serialize + ?Sized>(input: &T) -> Result<Value, ApiError> {
    serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))
}
