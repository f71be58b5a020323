//! Assembled API state
//!
//! The host owns the shared [`JsonApi`] registry and one endpoint per
//! resource type. It is transport-agnostic: a routing layer maps requests to
//! the endpoint operations and returns the resulting documents.

use crate::core::api::JsonApi;
use crate::core::controller::ResourceEndpoint;
use crate::resources::{LocaleController, TranslationController};
use std::sync::Arc;

/// Host context containing every endpoint
///
/// # Example
///
/// ```rust,ignore
/// let host = ApiBuilder::new()
///     .with_locale_registry(i18n)
///     .build_host()?;
///
/// let document = host.translations.detail("en-greeting", query).await?;
/// ```
pub struct ApiHost {
    /// Adapter registry and configuration shared by all documents
    pub api: Arc<JsonApi>,

    /// Read-only `locales` endpoint
    pub locales: ResourceEndpoint<LocaleController>,

    /// Writable `translations` endpoint
    pub translations: ResourceEndpoint<TranslationController>,
}

impl ApiHost {
    pub fn api(&self) -> &JsonApi {
        &self.api
    }
}
