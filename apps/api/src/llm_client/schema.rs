//! Output schemas for structured LLM replies.
//!
//! A schema is a flat list of named top-level fields with primitive, array or
//! object types. It renders into prompt instructions and checks a parsed reply.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct OutputSchema {
    fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        self.fields.push(SchemaField {
            name,
            field_type,
            description,
        });
        self
    }

    /// JSON-schema style object description, embedded verbatim in the system prompt.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.to_string(),
                json!({ "type": field.field_type.as_str(), "description": field.description }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Instructions appended to the caller's system prompt.
    pub fn instructions(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.to_json()).unwrap_or_default();
        format!(
            "Respond with a single JSON object that conforms to this schema:\n{schema}\n\
             Every required field must be present with the stated type."
        )
    }

    /// Checks that every declared field is present with the declared type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;

        for field in &self.fields {
            match object.get(field.name) {
                None => return Err(format!("missing field '{}'", field.name)),
                Some(v) if !field.field_type.accepts(v) => {
                    return Err(format!(
                        "field '{}' should be {}",
                        field.name,
                        field.field_type.as_str()
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
