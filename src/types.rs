//! Core value and diagnostic types for the mock provider
//!
//! Everything the callback surface exchanges with the host is built from
//! these types: dynamically typed values, attribute paths into them, and the
//! diagnostics attached to every response.

use crate::error::{Result, TfMockError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire sentinel for values that are not yet known during planning.
const UNKNOWN_SENTINEL: &str = "__unknown__";

/// Dynamic represents a value of any type the protocol can carry.
///
/// All numbers are f64 to match the host's single number type. Objects and
/// maps share the `Map` representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Ordered sequence; sets are carried in this representation too
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str(UNKNOWN_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a null, bool, number, string, sequence or map")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer.deserialize_any(DynamicVisitor)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_SENTINEL {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_SENTINEL {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut elems = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    elems.push(elem);
                }
                Ok(Dynamic::List(elems))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut entries = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    entries.insert(key, value);
                }
                Ok(Dynamic::Map(entries))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps a Dynamic and provides codecs and path-based access.
/// This is what every callback request and response carries.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// Builds an object value from attribute name/value pairs.
    pub fn object(entries: impl IntoIterator<Item = (&'static str, Dynamic)>) -> Self {
        Self {
            value: Dynamic::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    /// Direct access to a top-level attribute of an object value.
    /// Returns None when the value is not an object or the attribute is absent.
    pub fn attr(&self, name: &str) -> Option<&Dynamic> {
        match &self.value {
            Dynamic::Map(m) => m.get(name),
            _ => None,
        }
    }

    /// Sets a top-level attribute, turning a non-object value into an object.
    pub fn set_attr(&mut self, name: &str, value: Dynamic) {
        if let Dynamic::Map(m) = &mut self.value {
            m.insert(name.to_string(), value);
            return;
        }
        let mut m = HashMap::new();
        m.insert(name.to_string(), value);
        self.value = Dynamic::Map(m);
    }

    /// JSON codec, used for state passed through move operations.
    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfMockError::Encoding(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| TfMockError::Decoding(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Msgpack codec, matching how the host protocol carries values.
    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        match &self.value {
            Dynamic::Null => Ok(vec![]),
            other => rmp_serde::encode::to_vec(other)
                .map_err(|e| TfMockError::Encoding(format!("msgpack encoding failed: {}", e))),
        }
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }
        let value = rmp_serde::decode::from_slice(data)
            .map_err(|e| TfMockError::Decoding(format!("msgpack decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Type-checked accessors over an attribute path.
    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.navigate(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(TfMockError::TypeMismatch {
                expected: "string".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        match self.navigate(path)? {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(TfMockError::TypeMismatch {
                expected: "bool".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    fn navigate<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;
        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => m
                    .get(name)
                    .ok_or_else(|| TfMockError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    l.get(*idx as usize).ok_or_else(|| {
                        TfMockError::Custom(format!("list index {} out of bounds", idx))
                    })?
                }
                _ => return Err(TfMockError::Custom("invalid path navigation".to_string())),
            };
        }
        Ok(current)
    }
}

/// AttributePath identifies an attribute within a DynamicValue, used to point
/// diagnostics at the offending part of a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    ElementKeyInt(i64),
}

/// Diagnostic is a warning or error attached to a callback response.
/// An empty diagnostics list signals success.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Capabilities the provider declares to the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerCapabilities {
    pub plan_destroy: bool,
    pub move_resource_state: bool,
}

/// Capabilities the host declares to the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCapabilities {
    pub deferral_allowed: bool,
}

/// Deferred marks a change the provider cannot act on yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub reason: DeferredReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredReason {
    Unknown,
    ResourceConfigUnknown,
    ProviderConfigUnknown,
    AbsentPrereq,
}

/// FunctionError reports a failed provider function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionError {
    pub text: String,
    pub function_argument: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_access_on_object() {
        let mut dv = DynamicValue::object([("name", Dynamic::String("test".to_string()))]);
        assert_eq!(dv.attr("name").and_then(Dynamic::as_str), Some("test"));

        dv.set_attr("count", Dynamic::Number(3.0));
        assert_eq!(dv.attr("count"), Some(&Dynamic::Number(3.0)));
        assert!(dv.attr("missing").is_none());
    }

    #[test]
    fn path_accessor_reports_type_mismatch() {
        let dv = DynamicValue::object([("flag", Dynamic::Bool(true))]);
        assert!(dv.get_bool(&AttributePath::new("flag")).unwrap());

        let err = dv.get_string(&AttributePath::new("flag")).unwrap_err();
        assert!(matches!(err, TfMockError::TypeMismatch { .. }));
    }

    #[test]
    fn json_roundtrip_preserves_object() {
        let dv = DynamicValue::object([
            ("id", Dynamic::String("x".to_string())),
            ("deferred", Dynamic::Bool(false)),
        ]);
        let encoded = dv.encode_json().unwrap();
        let decoded = DynamicValue::decode_json(&encoded).unwrap();
        assert_eq!(decoded, dv);
    }

    #[test]
    fn msgpack_roundtrip_preserves_unknown() {
        let dv = DynamicValue::object([("id", Dynamic::Unknown)]);
        let encoded = dv.encode_msgpack().unwrap();
        let decoded = DynamicValue::decode_msgpack(&encoded).unwrap();
        assert_eq!(decoded.attr("id"), Some(&Dynamic::Unknown));
    }

    #[test]
    fn standalone_unknown_roundtrips() {
        let dv = DynamicValue::unknown();
        assert!(dv.is_unknown());

        let decoded = DynamicValue::decode_msgpack(&dv.encode_msgpack().unwrap()).unwrap();
        assert!(decoded.is_unknown());
    }

    #[test]
    fn empty_msgpack_decodes_to_null() {
        let decoded = DynamicValue::decode_msgpack(&[]).unwrap();
        assert!(decoded.is_null());
    }

    #[test]
    fn path_navigation_into_lists() {
        let dv = DynamicValue::object([(
            "items",
            Dynamic::List(vec![Dynamic::String("first".to_string())]),
        )]);
        let path = AttributePath::new("items").index(0);
        assert_eq!(dv.get_string(&path).unwrap(), "first");

        let missing = AttributePath::new("items").index(9);
        assert!(dv.get_string(&missing).is_err());
    }

    #[test]
    fn malformed_json_is_a_decoding_error() {
        let err = DynamicValue::decode_json(b"{not json").unwrap_err();
        assert!(matches!(err, TfMockError::Decoding(_)));
    }
}
