//! Resource adapter contract
//!
//! An adapter maps one kind of domain value to its wire representation.
//! Adapters are looked up by resource type through
//! [`JsonApi::get_resource_adapter`](crate::core::api::JsonApi::get_resource_adapter),
//! which is how a translation adapter renders its nested locale without
//! knowing the locale adapter's concrete type.

use crate::core::document::Document;
use crate::core::error::ConfigError;
use crate::core::resource::ResourceObject;
use std::any::Any;
use thiserror::Error;

/// Faults while adapting values
///
/// These are programming or configuration errors, not request errors.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The value handed to an adapter has the wrong shape
    #[error("Could not get resource: provided data is not a {expected}")]
    UnexpectedData { expected: &'static str },

    /// No adapter is registered for the resource type
    #[error("No resource adapter registered for type '{resource_type}'")]
    UnknownType { resource_type: String },

    /// Link generation failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub trait ResourceAdapter: Send + Sync {
    /// The resource type this adapter produces
    fn resource_type(&self) -> &str;

    /// Adapt `value` into a resource of the document
    ///
    /// `None` adapts to `None`. `relationship_path` is the dot-separated
    /// path of relationship names leading to this value, `None` for primary
    /// data. Only fields requested by the document's query are populated.
    fn get_resource(
        &self,
        value: Option<&dyn Any>,
        document: &Document,
        relationship_path: Option<&str>,
    ) -> Result<Option<ResourceObject>, AdapterError>;
}

/// Path of a relationship below `parent`
pub fn relationship_path(parent: Option<&str>, relationship: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{}.{}", parent, relationship),
        _ => relationship.to_string(),
    }
}
