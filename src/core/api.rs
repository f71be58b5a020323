//! Registry of resource adapters and link generation

use crate::config::ApiConfig;
use crate::core::adapter::{AdapterError, ResourceAdapter};
use crate::core::resource::{Relationship, ResourceObject};
use std::collections::HashMap;
use std::sync::Arc;

/// The API a document belongs to
///
/// Holds the configuration and the adapters of every resource type. Shared
/// by all requests.
///
/// # Example
///
/// ```rust,ignore
/// let api = JsonApi::new(ApiConfig::default_config())
///     .with_adapter(LocaleAdapter::new())
///     .with_adapter(TranslationAdapter::new());
/// ```
pub struct JsonApi {
    config: ApiConfig,
    adapters: HashMap<String, Arc<dyn ResourceAdapter>>,
}

impl JsonApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter under its resource type, replacing any previous one
    pub fn with_adapter(mut self, adapter: impl ResourceAdapter + 'static) -> Self {
        self.register_adapter(Arc::new(adapter));
        self
    }

    pub fn register_adapter(&mut self, adapter: Arc<dyn ResourceAdapter>) {
        self.adapters
            .insert(adapter.resource_type().to_string(), adapter);
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Maximum page size for index requests
    pub fn max_limit(&self) -> usize {
        self.config.pagination.max_limit
    }

    pub fn get_resource_adapter(
        &self,
        resource_type: &str,
    ) -> Result<Arc<dyn ResourceAdapter>, AdapterError> {
        self.adapters
            .get(resource_type)
            .cloned()
            .ok_or_else(|| AdapterError::UnknownType {
                resource_type: resource_type.to_string(),
            })
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    pub fn create_resource(
        &self,
        resource_type: &str,
        id: &str,
        relationship_path: Option<&str>,
    ) -> ResourceObject {
        ResourceObject::new(resource_type, id, relationship_path)
    }

    pub fn create_relationship(&self) -> Relationship {
        Relationship::default()
    }

    /// Generate the URL of a named route
    pub fn url(&self, route: &str, params: &[(&str, &str)]) -> Result<String, AdapterError> {
        Ok(self.config.url(route, params)?)
    }
}
