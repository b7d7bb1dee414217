//! MCP Tool and Prompt Parameter Types
//!
//! Parameter declarations shared by tools and prompts, the JSON Schema they
//! publish, and the binding of loosely typed caller arguments onto them.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::ToolError;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

/// One declared parameter of a tool (and of the prompt mirroring it)
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            description,
        }
    }

    pub fn optional(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: None,
            description,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Converts a supplied value to the declared type.
    ///
    /// Integers accept numeric strings, booleans accept `"true"`/`"false"`,
    /// strings accept numbers and booleans.
    fn coerce(&self, value: &Value) -> Result<Value, ToolError> {
        let coerced = match (self.ty, value) {
            (ParamType::String, Value::String(s)) => Some(Value::String(s.trim().to_string())),
            (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ParamType::Integer, Value::Number(n)) => n.as_i64().map(Value::from),
            (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ParamType::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
            (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        };

        coerced.ok_or_else(|| {
            let expected = match self.ty {
                ParamType::String => "a string",
                ParamType::Integer => "an integer",
                ParamType::Boolean => "a boolean",
            };
            ToolError::Validation(format!(
                "Argument '{}' must be {}, got {}",
                self.name, expected, value
            ))
        })
    }
}

/// Arguments after defaults were applied and types were checked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Map<String, Value>,
    supplied: Vec<&'static str>,
}

impl BoundArguments {
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// Whether the caller passed this argument (as opposed to a default)
    pub fn was_supplied(&self, name: &str) -> bool {
        self.supplied.iter().any(|s| *s == name)
    }
}

/// Binds raw caller arguments onto declared parameters.
///
/// `null`, absent and blank-string values count as not supplied. Unsupplied
/// optional parameters receive their defaults; unsupplied required ones fail
/// with `MissingArgument`. Undeclared argument names are ignored.
pub fn bind_arguments(params: &[ParamSpec], raw: &Value) -> Result<BoundArguments, ToolError> {
    let empty = Map::new();
    let raw = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ToolError::Validation(format!(
                "Arguments must be an object, got {}",
                other
            )))
        }
    };

    let mut bound = BoundArguments::default();

    for param in params {
        let supplied = raw.get(param.name).filter(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });

        match (supplied, &param.default) {
            (Some(value), _) => {
                bound
                    .values
                    .insert(param.name.to_string(), param.coerce(value)?);
                bound.supplied.push(param.name);
            }
            (None, Some(default)) => {
                bound.values.insert(param.name.to_string(), default.clone());
            }
            (None, None) if param.required => {
                return Err(ToolError::MissingArgument(param.name.to_string()));
            }
            (None, None) => {}
        }
    }

    Ok(bound)
}

/// JSON Schema object describing a parameter list
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for param in params {
        let mut property = json!({
            "type": param.ty,
            "description": param.description,
        });
        if let Some(default) = &param.default {
            property["default"] = default.clone();
        }
        properties.insert(param.name.to_string(), property);
    }

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Public metadata of a registered tool; handlers are not exposed
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl OperationDescriptor {
    /// Entry of a `tools/list` result
    pub fn to_tool_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": input_schema(&self.params),
        })
    }
}

/// One named argument of a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Public metadata of a registered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

impl PromptDescriptor {
    /// Prompt metadata mirroring a tool's parameter list
    pub fn mirroring(operation: &OperationDescriptor, description: &'static str) -> Self {
        Self {
            name: operation.name,
            description,
            arguments: operation
                .params
                .iter()
                .map(|p| PromptArgument {
                    name: p.name,
                    description: p.description,
                    required: p.required,
                })
                .collect(),
        }
    }
}
