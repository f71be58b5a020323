//! ApiBuilder for assembling the endpoints

use super::host::ApiHost;
use crate::config::{ApiConfig, REQUIRED_ROUTES};
use crate::core::api::JsonApi;
use crate::core::controller::ResourceEndpoint;
use crate::core::observer::{Observer, TracingObserver};
use crate::i18n::LocaleRegistry;
use crate::resources::{LocaleAdapter, LocaleController, TranslationAdapter, TranslationController};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Builder wiring configuration, adapters and controllers together
///
/// # Example
///
/// ```ignore
/// let host = ApiBuilder::new()
///     .with_config_file("config/api.yaml")?
///     .with_locale_registry(InMemoryI18n::new())
///     .build_host()?;
/// ```
pub struct ApiBuilder {
    config: Option<ApiConfig>,
    i18n: Option<Arc<dyn LocaleRegistry>>,
    observer: Arc<dyn Observer>,
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            i18n: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Use `config` instead of [`ApiConfig::default_config`]
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a YAML file
    pub fn with_config_file(mut self, path: &str) -> Result<Self> {
        let config = ApiConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load API configuration from {}", path))?;
        self.config = Some(config);
        Ok(self)
    }

    /// Set the locale registry (required)
    pub fn with_locale_registry(mut self, i18n: impl LocaleRegistry + 'static) -> Self {
        self.i18n = Some(Arc::new(i18n));
        self
    }

    pub fn with_shared_locale_registry(mut self, i18n: Arc<dyn LocaleRegistry>) -> Self {
        self.i18n = Some(i18n);
        self
    }

    /// Replace the default [`TracingObserver`]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Build the host
    ///
    /// Fails when no locale registry was set or when the configuration lacks
    /// a route the adapters link to.
    pub fn build_host(self) -> Result<ApiHost> {
        let i18n = self.i18n.ok_or_else(|| {
            anyhow::anyhow!("LocaleRegistry is required. Call .with_locale_registry()")
        })?;
        let config = self.config.unwrap_or_default();

        for route in REQUIRED_ROUTES {
            if !config.routes.contains(route) {
                anyhow::bail!("Route '{}' is missing from the configuration", route);
            }
        }

        let api = Arc::new(
            JsonApi::new(config)
                .with_adapter(LocaleAdapter::new())
                .with_adapter(TranslationAdapter::new()),
        );

        tracing::debug!(
            resource_types = ?api.resource_types(),
            max_limit = api.max_limit(),
            "api host built"
        );

        Ok(ApiHost {
            locales: ResourceEndpoint::new(
                api.clone(),
                LocaleController::new(i18n.clone()),
                self.observer.clone(),
            ),
            translations: ResourceEndpoint::new(
                api.clone(),
                TranslationController::new(i18n, self.observer.clone()),
                self.observer,
            ),
            api,
        })
    }
}
