//! Typed access to the field values of one input record
//!
//! Hosts hand each record over as a JSON object keyed by field name (`content`,
//! `postId`, `additionalFields`, ...). [`ItemParams`] reads those values with the
//! leniency workflow expressions need: numbers may arrive as strings, ID lists as
//! comma-separated text, and an empty string means "not set".

use mixpost_core::fields::{
    parse_id, parse_id_list, validate_limit, FieldError, ListScope, DEFAULT_LIMIT, MAX_LIMIT,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct ItemParams {
    values: Map<String, Value>,
    /// Dotted path of this collection inside the record, for error messages
    prefix: Option<String>,
}

impl ItemParams {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            prefix: None,
        }
    }

    fn path(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    /// Raw value, treating `null` as absent
    fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Value exactly as the record supplied it; `null` when absent
    pub fn raw(&self, name: &str) -> Value {
        self.value(name).cloned().unwrap_or(Value::Null)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn required_string(&self, name: &str) -> Result<String, FieldError> {
        self.optional_string(name)?
            .ok_or_else(|| FieldError::Missing(self.path(name)))
    }

    /// String value; absent and empty both read as `None`.
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
            Some(other) => Err(FieldError::invalid(
                &self.path(name),
                format!("expected text, got {other}"),
            )),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, FieldError> {
        match self.value(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                other => Err(FieldError::invalid(
                    &self.path(name),
                    format!("expected true or false, got '{other}'"),
                )),
            },
            Some(other) => Err(FieldError::invalid(
                &self.path(name),
                format!("expected true or false, got {other}"),
            )),
        }
    }

    pub fn number_or(&self, name: &str, default: u64) -> Result<u64, FieldError> {
        match self.value(name) {
            None => Ok(default),
            Some(value) => parse_id(&self.path(name), value),
        }
    }

    pub fn id(&self, name: &str) -> Result<u64, FieldError> {
        let value = self
            .value(name)
            .ok_or_else(|| FieldError::Missing(self.path(name)))?;
        parse_id(&self.path(name), value)
    }

    pub fn optional_id(&self, name: &str) -> Result<Option<u64>, FieldError> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(value) => parse_id(&self.path(name), value).map(Some),
        }
    }

    pub fn ids(&self, name: &str) -> Result<Vec<u64>, FieldError> {
        self.optional_ids(name)?
            .ok_or_else(|| FieldError::Missing(self.path(name)))
    }

    /// ID list; `Some(vec![])` when the field is present but empty.
    pub fn optional_ids(&self, name: &str) -> Result<Option<Vec<u64>>, FieldError> {
        self.value(name)
            .map(|value| parse_id_list(&self.path(name), value))
            .transpose()
    }

    /// Nested collection such as `additionalFields`; absent reads as empty.
    pub fn collection(&self, name: &str) -> Result<ItemParams, FieldError> {
        let values = match self.value(name) {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(FieldError::invalid(
                    &self.path(name),
                    format!("expected an object, got {other}"),
                ))
            }
        };

        Ok(ItemParams {
            values,
            prefix: Some(self.path(name)),
        })
    }
}

impl ItemParams {
    /// `returnAll` / `limit` pair shared by the list operations
    pub fn list_scope(&self) -> Result<ListScope, FieldError> {
        if self.bool_or("returnAll", false)? {
            return Ok(ListScope::All);
        }

        let limit = self.number_or("limit", DEFAULT_LIMIT as u64)?;
        validate_limit(limit)
            .map(ListScope::Limit)
            .map_err(|_| {
                FieldError::invalid(
                    &self.path("limit"),
                    format!("must be between 1 and {MAX_LIMIT}, got {limit}"),
                )
            })
    }
}

impl From<Value> for ItemParams {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ItemParams::new(map),
            _ => ItemParams::default(),
        }
    }
}
