//! Typed error handling for JSON:API resource endpoints
//!
//! Two families of errors live here:
//!
//! - [`ErrorKind`] / [`ErrorObject`]: the business errors a request can
//!   accumulate (unknown filters, missing resources, validation and
//!   read-only violations, duplicates). They are plain data, collected in a
//!   [`Document`](crate::core::document::Document) and rendered as a
//!   JSON:API `errors` array. None of them aborts the process.
//! - [`QueryError`] and [`ConfigError`]: genuine faults at the edges
//!   (malformed query parameters, broken configuration).
//!
//! # Example
//!
//! ```rust,ignore
//! document.add_error(ErrorObject::filter_not_found("translations", "colour"));
//!
//! match document.errors()[0].kind() {
//!     ErrorKind::FilterNotFound => println!("unknown filter"),
//!     other => eprintln!("Other error: {}", other),
//! }
//! ```

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Error kinds
// =============================================================================

/// Category of a business error recorded in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A `filter[...]` parameter the resource type does not know
    FilterNotFound,

    /// A `sort` field outside the resource's sortable whitelist
    SortFieldNotFound,

    /// The requested resource does not exist
    ResourceNotFound,

    /// The requested relationship is not declared on the resource type
    RelationshipNotFound,

    /// An attribute failed validation
    AttributeValidation,

    /// An attribute cannot be changed once the resource exists
    AttributeReadonly,

    /// A relationship failed validation
    RelationshipValidation,

    /// A relationship cannot be changed once the resource exists
    RelationshipReadonly,

    /// A resource with the derived id already exists
    DataAlreadyExists,

    /// The submitted `type` does not match the endpoint
    TypeMismatch,

    /// The submitted body is not a usable JSON:API document
    InvalidDocument,
}

impl ErrorKind {
    /// HTTP status code for this kind of error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::FilterNotFound => StatusCode::BAD_REQUEST,
            ErrorKind::SortFieldNotFound => StatusCode::BAD_REQUEST,
            ErrorKind::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorKind::RelationshipNotFound => StatusCode::NOT_FOUND,
            ErrorKind::AttributeValidation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::AttributeReadonly => StatusCode::FORBIDDEN,
            ErrorKind::RelationshipValidation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::RelationshipReadonly => StatusCode::FORBIDDEN,
            ErrorKind::DataAlreadyExists => StatusCode::CONFLICT,
            ErrorKind::TypeMismatch => StatusCode::CONFLICT,
            ErrorKind::InvalidDocument => StatusCode::BAD_REQUEST,
        }
    }

    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::FilterNotFound => "FILTER_NOT_FOUND",
            ErrorKind::SortFieldNotFound => "SORT_FIELD_NOT_FOUND",
            ErrorKind::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::RelationshipNotFound => "RELATIONSHIP_NOT_FOUND",
            ErrorKind::AttributeValidation => "ATTRIBUTE_VALIDATION",
            ErrorKind::AttributeReadonly => "ATTRIBUTE_READONLY",
            ErrorKind::RelationshipValidation => "RELATIONSHIP_VALIDATION",
            ErrorKind::RelationshipReadonly => "RELATIONSHIP_READONLY",
            ErrorKind::DataAlreadyExists => "DATA_EXISTS",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::InvalidDocument => "INVALID_DOCUMENT",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ErrorKind::FilterNotFound => "Filter not found",
            ErrorKind::SortFieldNotFound => "Sort field not found",
            ErrorKind::ResourceNotFound => "Resource not found",
            ErrorKind::RelationshipNotFound => "Relationship not found",
            ErrorKind::AttributeValidation => "Invalid attribute",
            ErrorKind::AttributeReadonly => "Read-only attribute",
            ErrorKind::RelationshipValidation => "Invalid relationship",
            ErrorKind::RelationshipReadonly => "Read-only relationship",
            ErrorKind::DataAlreadyExists => "Data already exists",
            ErrorKind::TypeMismatch => "Type mismatch",
            ErrorKind::InvalidDocument => "Invalid document",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// =============================================================================
// Error objects
// =============================================================================

/// Location of the problem inside the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
    /// JSON pointer into the submitted document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,

    /// Query parameter which caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// A single JSON:API error object
///
/// Constructed through the per-kind constructors, which fill in status,
/// code, title and source. Bulk writes attach the submission index with
/// [`ErrorObject::at`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    #[serde(skip)]
    kind: ErrorKind,

    #[serde(skip)]
    index: Option<usize>,

    #[serde(skip)]
    field: Option<Field>,

    status: String,
    code: &'static str,
    title: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ErrorSource>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

/// Member of a submitted resource an error points at
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Attribute(String),
    Relationship(String),
    Data,
}

impl ErrorObject {
    fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            index: None,
            field: None,
            status: kind.status_code().as_u16().to_string(),
            code: kind.error_code(),
            title: kind.title(),
            detail: Some(detail.into()),
            source: None,
            meta: Map::new(),
        }
    }

    fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.source = Some(ErrorSource {
            pointer: None,
            parameter: Some(parameter.into()),
        });
        self
    }

    fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self.refresh_pointer();
        self
    }

    fn refresh_pointer(&mut self) {
        let Some(field) = &self.field else {
            return;
        };

        let mut pointer = String::from("/data");
        if let Some(index) = self.index {
            pointer.push_str(&format!("/{}", index));
        }
        match field {
            Field::Attribute(name) => pointer.push_str(&format!("/attributes/{}", name)),
            Field::Relationship(name) => pointer.push_str(&format!("/relationships/{}", name)),
            Field::Data => {}
        }

        self.source = Some(ErrorSource {
            pointer: Some(pointer),
            parameter: None,
        });
    }

    /// Attach the index of the bulk item this error belongs to
    ///
    /// `None` leaves the error scoped to a single-resource submission.
    pub fn at(mut self, index: Option<usize>) -> Self {
        self.index = index;
        match index {
            Some(index) => {
                self.meta.insert("index".to_string(), json!(index));
            }
            None => {
                self.meta.remove("index");
            }
        }
        self.refresh_pointer();
        self
    }

    /// An unknown `filter[name]` parameter
    pub fn filter_not_found(resource_type: &str, filter: &str) -> Self {
        Self::new(
            ErrorKind::FilterNotFound,
            format!("Filter '{}' is not supported for {}", filter, resource_type),
        )
        .with_parameter(format!("filter[{}]", filter))
    }

    /// A sort field outside the whitelist
    pub fn sort_field_not_found(resource_type: &str, field: &str) -> Self {
        Self::new(
            ErrorKind::SortFieldNotFound,
            format!("Sort field '{}' is not supported for {}", field, resource_type),
        )
        .with_parameter("sort")
    }

    /// A resource that could not be resolved from its id
    pub fn resource_not_found(resource_type: &str, id: &str) -> Self {
        Self::new(
            ErrorKind::ResourceNotFound,
            format!("Resource {} with id '{}' not found", resource_type, id),
        )
    }

    /// A relationship name the resource type does not declare
    pub fn relationship_not_found(resource_type: &str, relationship: &str) -> Self {
        Self::new(
            ErrorKind::RelationshipNotFound,
            format!(
                "Relationship '{}' not found for {}",
                relationship, resource_type
            ),
        )
    }

    /// An attribute value that failed validation
    pub fn attribute_validation(resource_type: &str, attribute: &str, message: &str) -> Self {
        Self::new(
            ErrorKind::AttributeValidation,
            format!("Attribute '{}' of {} {}", attribute, resource_type, message),
        )
        .with_field(Field::Attribute(attribute.to_string()))
    }

    /// An attempt to change a read-only attribute
    pub fn attribute_readonly(resource_type: &str, attribute: &str) -> Self {
        Self::new(
            ErrorKind::AttributeReadonly,
            format!(
                "Attribute '{}' of {} cannot be changed",
                attribute, resource_type
            ),
        )
        .with_field(Field::Attribute(attribute.to_string()))
    }

    /// A relationship value that failed validation
    pub fn relationship_validation(
        resource_type: &str,
        relationship: &str,
        message: &str,
    ) -> Self {
        Self::new(
            ErrorKind::RelationshipValidation,
            format!(
                "Relationship '{}' of {} {}",
                relationship, resource_type, message
            ),
        )
        .with_field(Field::Relationship(relationship.to_string()))
    }

    /// An attempt to change a read-only relationship
    pub fn relationship_readonly(resource_type: &str, relationship: &str) -> Self {
        Self::new(
            ErrorKind::RelationshipReadonly,
            format!(
                "Relationship '{}' of {} cannot be changed",
                relationship, resource_type
            ),
        )
        .with_field(Field::Relationship(relationship.to_string()))
    }

    /// A create that would overwrite an existing resource
    pub fn data_exists(resource_type: &str, id: &str) -> Self {
        Self::new(
            ErrorKind::DataAlreadyExists,
            format!("Resource {} with id '{}' already exists", resource_type, id),
        )
        .with_field(Field::Data)
    }

    /// A submitted resource of the wrong type
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Expected resource type '{}', got '{}'", expected, actual),
        )
        .with_field(Field::Data)
    }

    /// A submitted body which is not a usable document
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDocument, message).with_field(Field::Data)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Bulk index this error belongs to, if any
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn source(&self) -> Option<&ErrorSource> {
        self.source.as_ref()
    }

    /// JSON pointer of the offending member, if the error has one
    pub fn pointer(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.pointer.as_deref())
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(self.title),
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Malformed request query parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid value '{value}' for query parameter '{parameter}': expected a non-negative integer")]
    InvalidNumber { parameter: String, value: String },
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    /// IO error while reading configuration
    #[error("IO error while reading config '{path}': {message}")]
    IoError { path: String, message: String },

    /// A named route that is not registered
    #[error("Route '{name}' is not configured")]
    RouteNotFound { name: String },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
