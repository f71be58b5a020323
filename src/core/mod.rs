//! Core module containing the JSON:API building blocks

pub mod adapter;
pub mod api;
pub mod controller;
pub mod document;
pub mod error;
pub mod filter;
pub mod observer;
pub mod query;
pub mod resource;
pub mod sorter;

pub use adapter::{AdapterError, ResourceAdapter};
pub use api::JsonApi;
pub use controller::{
    ItemOutcome, Page, RelationshipDefinition, ResourceController, ResourceDefinition,
    ResourceEndpoint, WritableController,
};
pub use document::{Document, ErrorScope, PrimaryData};
pub use error::{ConfigError, ErrorKind, ErrorObject, QueryError};
pub use filter::StringMatcher;
pub use observer::{Observer, TracingObserver};
pub use query::{FilterValue, JsonApiQuery};
pub use resource::{Linkage, Relationship, ResourceData, ResourceIdentifier, ResourceObject};
pub use sorter::{Sortable, SortDirection, Sorter};
