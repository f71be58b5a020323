//! Wire-format resource representation
//!
//! [`ResourceObject`] is what adapters produce on the way out.
//! [`ResourceData`] and [`Linkage`] are what clients submit on the way in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// `{ "type": ..., "id": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// A relationship object of a rendered resource
///
/// The nested resource is kept in full; whether its body ends up in the
/// document's `included` array is decided when the document is rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    links: IndexMap<String, String>,
    resource: Option<Box<ResourceObject>>,
}

impl Relationship {
    pub fn set_link(&mut self, name: &str, url: impl Into<String>) {
        self.links.insert(name.to_string(), url.into());
    }

    pub fn set_resource(&mut self, resource: Option<ResourceObject>) {
        self.resource = resource.map(Box::new);
    }

    pub fn links(&self) -> &IndexMap<String, String> {
        &self.links
    }

    pub fn resource(&self) -> Option<&ResourceObject> {
        self.resource.as_deref()
    }

    /// Resource linkage: identifier of the target, or `null`
    pub fn linkage(&self) -> Option<ResourceIdentifier> {
        self.resource.as_ref().map(|r| r.identifier())
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        if !self.links.is_empty() {
            object.insert("links".to_string(), json!(self.links));
        }
        object.insert("data".to_string(), json!(self.linkage()));
        Value::Object(object)
    }
}

/// A rendered resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject {
    resource_type: String,
    id: String,
    relationship_path: Option<String>,
    attributes: IndexMap<String, Value>,
    relationships: IndexMap<String, Relationship>,
    links: IndexMap<String, String>,
}

impl ResourceObject {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship_path: Option<&str>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            relationship_path: relationship_path.map(str::to_string),
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dot-separated relationship names leading to this resource
    ///
    /// `None` for primary data.
    pub fn relationship_path(&self) -> Option<&str> {
        self.relationship_path.as_deref()
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.resource_type, &self.id)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.attributes.insert(name.to_string(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn set_relationship(&mut self, name: &str, relationship: Relationship) {
        self.relationships.insert(name.to_string(), relationship);
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    pub fn relationships(&self) -> &IndexMap<String, Relationship> {
        &self.relationships
    }

    pub fn set_link(&mut self, name: &str, url: impl Into<String>) {
        self.links.insert(name.to_string(), url.into());
    }

    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    /// Render as a JSON:API resource object (relationships as linkage)
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), json!(self.resource_type));
        object.insert("id".to_string(), json!(self.id));

        if !self.attributes.is_empty() {
            object.insert("attributes".to_string(), json!(self.attributes));
        }
        if !self.relationships.is_empty() {
            let relationships: Map<String, Value> = self
                .relationships
                .iter()
                .map(|(name, relationship)| (name.clone(), relationship.to_json()))
                .collect();
            object.insert("relationships".to_string(), Value::Object(relationships));
        }
        if !self.links.is_empty() {
            object.insert("links".to_string(), json!(self.links));
        }

        Value::Object(object)
    }
}

// =============================================================================
// Submitted data
// =============================================================================

/// Resource linkage as submitted in a relationship object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// `"data": null`
    Null,
    /// `"data": { "type": ..., "id": ... }`
    One(ResourceIdentifier),
    /// `"data": [ ... ]`
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    /// Parse the `data` member of a relationship object
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Linkage::Null),
            Value::Array(_) => serde_json::from_value(value.clone())
                .map(Linkage::Many)
                .map_err(|e| format!("invalid resource linkage: {}", e)),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map(Linkage::One)
                .map_err(|e| format!("invalid resource linkage: {}", e)),
            _ => Err("resource linkage must be null, an object or an array".to_string()),
        }
    }

    /// Parse a full relationship object (`{ "data": ... }`)
    pub fn from_relationship(value: &Value) -> Result<Self, String> {
        match value.get("data") {
            Some(data) => Self::from_value(data),
            None => Err("relationship object has no data member".to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Linkage::Null => true,
            Linkage::One(_) => false,
            Linkage::Many(items) => items.is_empty(),
        }
    }
}

/// One submitted resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    pub resource_type: String,
    pub id: Option<String>,
    pub attributes: IndexMap<String, Value>,
    pub relationships: IndexMap<String, Value>,
}

#[derive(Deserialize)]
struct RawResourceData {
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    relationships: IndexMap<String, Value>,
}

impl ResourceData {
    /// Parse a resource object from the submitted `data` member
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let raw: RawResourceData = serde_json::from_value(value.clone())
            .map_err(|e| format!("invalid resource object: {}", e))?;

        Ok(Self {
            resource_type: raw.resource_type,
            id: raw.id,
            attributes: raw.attributes,
            relationships: raw.relationships,
        })
    }
}
