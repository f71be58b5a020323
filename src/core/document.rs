//! Per-request JSON:API document
//!
//! A [`Document`] is created for every request. It carries the parsed query,
//! accumulates errors from every step of the request and finally holds the
//! primary data. Errors are append-only: once recorded they stay, and a
//! read that recorded any error emits no data.

use crate::core::api::JsonApi;
use crate::core::error::{ErrorKind, ErrorObject};
use crate::core::query::JsonApiQuery;
use crate::core::resource::{ResourceIdentifier, ResourceObject};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const JSONAPI_VERSION: &str = "1.0";
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Primary data of a document
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    /// A single resource, or `null`
    Resource(Option<ResourceObject>),
    /// A resource collection (index)
    Collection(Vec<ResourceObject>),
    /// Results of a bulk write, parallel to the submission; `None` failed
    Bulk(Vec<Option<ResourceObject>>),
    /// Relationship linkage only
    Linkage(Option<ResourceIdentifier>),
}

pub struct Document {
    api: Arc<JsonApi>,
    query: JsonApiQuery,
    data: Option<PrimaryData>,
    errors: Vec<ErrorObject>,
    meta: Map<String, Value>,
    links: IndexMap<String, String>,
    status: Option<StatusCode>,
}

impl Document {
    pub fn new(api: Arc<JsonApi>, query: JsonApiQuery) -> Self {
        Self {
            api,
            query,
            data: None,
            errors: Vec::new(),
            meta: Map::new(),
            links: IndexMap::new(),
            status: None,
        }
    }

    pub fn api(&self) -> &JsonApi {
        &self.api
    }

    pub fn query(&self) -> &JsonApiQuery {
        &self.query
    }

    // === Errors ===

    pub fn add_error(&mut self, error: ErrorObject) {
        tracing::debug!(code = error.code(), index = ?error.index(), "{}", error);
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether an error was recorded for the bulk item `index`
    ///
    /// `None` is the single-resource scope.
    pub fn has_errors_at(&self, index: Option<usize>) -> bool {
        self.errors.iter().any(|e| e.index() == index)
    }

    /// Errors recorded for the bulk item `index`, in recording order
    pub fn errors_at(&self, index: Option<usize>) -> Vec<ErrorObject> {
        self.errors
            .iter()
            .filter(|e| e.index() == index)
            .cloned()
            .collect()
    }

    pub fn has_error_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    // === Data ===

    pub fn set_data(&mut self, data: PrimaryData) {
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&PrimaryData> {
        self.data.as_ref()
    }

    /// The single primary resource, if the document holds one
    pub fn resource(&self) -> Option<&ResourceObject> {
        match &self.data {
            Some(PrimaryData::Resource(resource)) => resource.as_ref(),
            _ => None,
        }
    }

    /// The primary resource collection, if the document holds one
    pub fn collection(&self) -> Option<&[ResourceObject]> {
        match &self.data {
            Some(PrimaryData::Collection(resources)) => Some(resources),
            _ => None,
        }
    }

    pub fn set_meta(&mut self, name: &str, value: Value) {
        self.meta.insert(name.to_string(), value);
    }

    pub fn meta(&self, name: &str) -> Option<&Value> {
        self.meta.get(name)
    }

    pub fn set_link(&mut self, name: &str, url: impl Into<String>) {
        self.links.insert(name.to_string(), url.into());
    }

    /// Status to report when the request succeeded (201, 204)
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        if let Some(PrimaryData::Bulk(outcomes)) = &self.data {
            let succeeded = outcomes.iter().filter(|o| o.is_some()).count();
            if succeeded == outcomes.len() {
                return self.status.unwrap_or(StatusCode::OK);
            }
            if succeeded > 0 {
                return StatusCode::MULTI_STATUS;
            }
        }

        if self.has_errors() {
            return self.error_status();
        }

        self.status.unwrap_or(StatusCode::OK)
    }

    fn error_status(&self) -> StatusCode {
        let statuses: IndexSet<StatusCode> =
            self.errors.iter().map(ErrorObject::status_code).collect();

        match statuses.len() {
            1 => statuses[0],
            _ => StatusCode::BAD_REQUEST,
        }
    }

    // === Rendering ===

    /// Render the top-level JSON:API document
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("jsonapi".to_string(), json!({ "version": JSONAPI_VERSION }));

        let bulk = matches!(self.data, Some(PrimaryData::Bulk(_)));
        if self.has_errors() {
            object.insert("errors".to_string(), json!(self.errors));
            if !bulk {
                return Value::Object(object);
            }
        }

        if let Some(data) = &self.data {
            let mut included = Included::default();

            let data = match data {
                PrimaryData::Resource(resource) => {
                    if let Some(resource) = resource {
                        included.primary(resource);
                    }
                    resource.as_ref().map_or(Value::Null, ResourceObject::to_json)
                }
                PrimaryData::Collection(resources) => {
                    resources.iter().for_each(|r| included.primary(r));
                    Value::Array(resources.iter().map(ResourceObject::to_json).collect())
                }
                PrimaryData::Bulk(outcomes) => {
                    outcomes.iter().flatten().for_each(|r| included.primary(r));
                    Value::Array(
                        outcomes
                            .iter()
                            .map(|o| o.as_ref().map_or(Value::Null, ResourceObject::to_json))
                            .collect(),
                    )
                }
                PrimaryData::Linkage(identifier) => json!(identifier),
            };
            object.insert("data".to_string(), data);

            let included = included.collect(&self.query);
            if !included.is_empty() {
                object.insert("included".to_string(), Value::Array(included));
            }
        }

        if !self.meta.is_empty() {
            object.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }
        if !self.links.is_empty() {
            object.insert("links".to_string(), json!(self.links));
        }

        Value::Object(object)
    }
}

/// Collects nested resources for the `included` member
#[derive(Default)]
struct Included<'a> {
    primary: IndexSet<ResourceIdentifier>,
    roots: Vec<&'a ResourceObject>,
}

impl<'a> Included<'a> {
    fn primary(&mut self, resource: &'a ResourceObject) {
        self.primary.insert(resource.identifier());
        self.roots.push(resource);
    }

    fn collect(self, query: &JsonApiQuery) -> Vec<Value> {
        let mut seen = self.primary;
        let mut included = Vec::new();
        let mut pending: Vec<&ResourceObject> = self.roots;

        while let Some(resource) = pending.pop() {
            for relationship in resource.relationships().values() {
                let Some(nested) = relationship.resource() else {
                    continue;
                };
                if !query.is_included(nested.relationship_path()) {
                    continue;
                }
                if seen.insert(nested.identifier()) {
                    included.push(nested.to_json());
                }
                pending.push(nested);
            }
        }

        included
    }
}

impl IntoResponse for Document {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let body = self.to_json().to_string();
        (status, [(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)], body).into_response()
    }
}

/// Error sink for one submitted resource
///
/// Every error added through a scope is tagged with the scope's bulk index,
/// so hooks never deal with indices themselves.
pub struct ErrorScope<'a> {
    document: &'a mut Document,
    resource_type: &'a str,
    index: Option<usize>,
}

impl<'a> ErrorScope<'a> {
    pub fn new(document: &'a mut Document, resource_type: &'a str, index: Option<usize>) -> Self {
        Self {
            document,
            resource_type,
            index,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn add(&mut self, error: ErrorObject) {
        self.document.add_error(error.at(self.index));
    }

    pub fn attribute_validation(&mut self, attribute: &str, message: &str) {
        let error = ErrorObject::attribute_validation(self.resource_type, attribute, message);
        self.add(error);
    }

    pub fn attribute_readonly(&mut self, attribute: &str) {
        let error = ErrorObject::attribute_readonly(self.resource_type, attribute);
        self.add(error);
    }

    pub fn relationship_validation(&mut self, relationship: &str, message: &str) {
        let error =
            ErrorObject::relationship_validation(self.resource_type, relationship, message);
        self.add(error);
    }

    pub fn relationship_readonly(&mut self, relationship: &str) {
        let error = ErrorObject::relationship_readonly(self.resource_type, relationship);
        self.add(error);
    }

    /// Whether this scope recorded any error so far
    pub fn has_errors(&self) -> bool {
        self.document.has_errors_at(self.index)
    }
}
