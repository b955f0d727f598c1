//! Caller-supplied command parameters.

use crudcap_storage::FieldMap;
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};

/// Parameters accompanying a token, in whatever form the caller has them.
///
/// Bytes are decoded as UTF-8, text is parsed as JSON, and a JSON `null`
/// counts as no parameters at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters.
    #[default]
    Absent,
    /// Raw request bytes holding JSON text.
    Bytes(Vec<u8>),
    /// JSON text.
    Text(String),
    /// An already-parsed JSON value.
    Value(Value),
}

impl Params {
    /// Reduce to a parsed value, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Params`] if bytes are not UTF-8 or text is
    /// not JSON.
    pub fn normalize(self) -> DispatchResult<Option<Value>> {
        let text = match self {
            Self::Absent => return Ok(None),
            Self::Value(value) => return Ok(non_null(value)),
            Self::Text(text) => text,
            Self::Bytes(bytes) => String::from_utf8(bytes)
                .map_err(|e| DispatchError::Params(format!("params are not UTF-8: {e}")))?,
        };
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| DispatchError::Params(format!("could not parse params: {e}")))?;
        Ok(non_null(value))
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() { None } else { Some(value) }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Option<Value>> for Params {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Absent, Self::Value)
    }
}

impl From<FieldMap> for Params {
    fn from(map: FieldMap) -> Self {
        Self::Value(Value::Object(map))
    }
}

impl From<&str> for Params {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Params {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Params {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Params {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Field-value params for create, update and duplicate. Absent means empty.
pub(crate) fn field_values(params: Option<Value>) -> DispatchResult<FieldMap> {
    match params {
        None => Ok(FieldMap::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(DispatchError::Params(format!(
            "expected an object of field values, got {}",
            json_type(&other)
        ))),
    }
}

/// Field-name params for read: a list of names, an object whose keys are
/// the names, or a single name.
pub(crate) fn field_names(params: Value) -> DispatchResult<Vec<String>> {
    match params {
        Value::String(name) => Ok(vec![name]),
        Value::Object(map) => Ok(map.into_iter().map(|(k, _)| k).collect()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                other => Err(DispatchError::Params(format!(
                    "field names must be strings, got {}",
                    json_type(&other)
                ))),
            })
            .collect(),
        other => Err(DispatchError::Params(format!(
            "expected a list of field names, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_forms() {
        assert_eq!(Params::Absent.normalize().unwrap(), None);
        assert_eq!(Params::from(json!(null)).normalize().unwrap(), None);
        assert_eq!(Params::from("null").normalize().unwrap(), None);
        assert_eq!(
            Params::from(r#"{"title":"x"}"#).normalize().unwrap(),
            Some(json!({"title": "x"}))
        );
        assert_eq!(
            Params::from(br#"["title"]"#.as_slice()).normalize().unwrap(),
            Some(json!(["title"]))
        );
    }

    #[test]
    fn test_normalize_errors() {
        assert!(matches!(
            Params::from("{not json").normalize(),
            Err(DispatchError::Params(_))
        ));
        assert!(matches!(
            Params::from(vec![0xff, 0xfe]).normalize(),
            Err(DispatchError::Params(_))
        ));
    }

    #[test]
    fn test_field_values_shapes() {
        assert!(field_values(None).unwrap().is_empty());
        assert_eq!(field_values(Some(json!({"a": 1}))).unwrap().len(), 1);
        assert!(field_values(Some(json!(["a"]))).is_err());
    }

    #[test]
    fn test_field_names_shapes() {
        assert_eq!(field_names(json!("title")).unwrap(), ["title"]);
        assert_eq!(
            field_names(json!(["title", "comment"])).unwrap(),
            ["title", "comment"]
        );
        // Object keys keep their source order.
        assert_eq!(
            field_names(json!({"zeta": 1, "alpha": 2})).unwrap(),
            ["zeta", "alpha"]
        );
        assert!(field_names(json!([1])).is_err());
        assert!(field_names(json!(5)).is_err());
    }
}
