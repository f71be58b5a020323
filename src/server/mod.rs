//! Assembly of the API host
//!
//! [`ApiBuilder`] registers the adapters of every resource type and builds
//! one endpoint per type on top of a shared locale registry.

pub mod builder;
pub mod host;

pub use builder::ApiBuilder;
pub use host::ApiHost;
