//! Schema descriptors for the mock provider
//!
//! Schemas here are static descriptors the provider hands back from its
//! schema callback; the host performs validation against them. Attribute
//! presence requirements are a single tagged mode rather than a set of
//! boolean flags, so impossible combinations cannot be expressed.

use std::collections::HashMap;

/// AttributeType mirrors the host's type system.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>), // Ordered, allows duplicates
    Set(Box<AttributeType>),  // Unordered, no duplicates
    Map(Box<AttributeType>),  // String keys only
    Object(HashMap<String, AttributeType>),
    /// Any type, resolved at call time (function parameters and returns)
    Dynamic,
}

/// How an attribute participates in configuration and state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Must be set in configuration
    Required,
    /// May be set in configuration
    Optional,
    /// Only ever set by the provider
    Computed,
    /// May be set in configuration, filled in by the provider otherwise
    OptionalComputed,
}

impl AttributeMode {
    pub fn is_required(self) -> bool {
        self == AttributeMode::Required
    }

    pub fn is_optional(self) -> bool {
        matches!(
            self,
            AttributeMode::Optional | AttributeMode::OptionalComputed
        )
    }

    pub fn is_computed(self) -> bool {
        matches!(
            self,
            AttributeMode::Computed | AttributeMode::OptionalComputed
        )
    }
}

/// A single schema attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub mode: AttributeMode,
    pub description: String,
    pub sensitive: bool,
}

/// Schema describes one configuration block: the provider block, a resource
/// type, or a data source. Version is carried for state migration.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub version: i64,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Fluent builder for attributes. Defaults to optional.
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                mode: AttributeMode::Optional,
                description: String::new(),
                sensitive: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.mode = AttributeMode::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.mode = AttributeMode::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.mode = AttributeMode::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.attribute.mode = AttributeMode::OptionalComputed;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for schemas.
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                attributes: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
