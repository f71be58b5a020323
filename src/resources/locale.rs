//! Locales: read-only resources backed by the locale registry

use crate::config::ROUTE_LOCALES_DETAIL;
use crate::core::adapter::{AdapterError, ResourceAdapter};
use crate::core::controller::{ResourceController, ResourceDefinition};
use crate::core::document::Document;
use crate::core::error::ErrorObject;
use crate::core::filter::{StringMatcher, matches_optional};
use crate::core::query::JsonApiQuery;
use crate::core::resource::ResourceObject;
use crate::core::sorter::Sortable;
use crate::i18n::{Locale, LocaleRegistry};
use async_trait::async_trait;
use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

pub const LOCALES: &str = "locales";

static DEFINITION: ResourceDefinition = ResourceDefinition {
    resource_type: LOCALES,
    attributes: &["code", "name", "properties"],
    relationships: &[],
    sort_fields: &["code", "name"],
    bulk: false,
};

impl Sortable for Locale {
    fn sort_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "code" => Some(Cow::Borrowed(self.code())),
            "name" => Some(Cow::Borrowed(self.name())),
            _ => None,
        }
    }
}

/// Maps a [`Locale`] to a `locales` resource
#[derive(Debug, Clone, Default)]
pub struct LocaleAdapter;

impl LocaleAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceAdapter for LocaleAdapter {
    fn resource_type(&self) -> &str {
        LOCALES
    }

    fn get_resource(
        &self,
        value: Option<&dyn Any>,
        document: &Document,
        relationship_path: Option<&str>,
    ) -> Result<Option<ResourceObject>, AdapterError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let locale = value
            .downcast_ref::<Locale>()
            .ok_or(AdapterError::UnexpectedData { expected: "locale" })?;

        let api = document.api();
        let query = document.query();

        let mut resource = api.create_resource(LOCALES, locale.code(), relationship_path);
        resource.set_link(
            "self",
            api.url(ROUTE_LOCALES_DETAIL, &[("id", locale.code())])?,
        );

        if query.is_field_requested(LOCALES, "code") {
            resource.set_attribute("code", locale.code());
        }
        if query.is_field_requested(LOCALES, "name") {
            resource.set_attribute("name", locale.name());
        }
        if query.is_field_requested(LOCALES, "properties") {
            resource.set_attribute("properties", locale.properties());
        }

        Ok(Some(resource))
    }
}

/// Filter criteria for the locale index
#[derive(Debug, Clone, Default)]
pub struct LocaleFilter {
    pub code: Option<StringMatcher>,
    pub name: Option<StringMatcher>,
}

impl LocaleFilter {
    pub fn matches(&self, locale: &Locale) -> bool {
        matches_optional(self.code.as_ref(), locale.code())
            && matches_optional(self.name.as_ref(), locale.name())
    }
}

/// Exposes the locales of a [`LocaleRegistry`]
pub struct LocaleController {
    i18n: Arc<dyn LocaleRegistry>,
}

impl LocaleController {
    pub fn new(i18n: Arc<dyn LocaleRegistry>) -> Self {
        Self { i18n }
    }
}

#[async_trait]
impl ResourceController for LocaleController {
    type Resource = Locale;
    type Filter = LocaleFilter;

    fn definition(&self) -> &ResourceDefinition {
        &DEFINITION
    }

    fn resolve_filters(&self, query: &JsonApiQuery, document: &mut Document) -> LocaleFilter {
        let mut filter = LocaleFilter::default();

        for (name, value) in query.filters() {
            match name.as_str() {
                "code" => {
                    filter.code = (!value.is_empty()).then(|| StringMatcher::new(value.as_str()));
                }
                "name" => {
                    filter.name = (!value.is_empty()).then(|| StringMatcher::new(value.as_str()));
                }
                _ => document.add_error(ErrorObject::filter_not_found(LOCALES, name)),
            }
        }

        filter
    }

    async fn get_resources(&self, filter: &LocaleFilter) -> Vec<Locale> {
        self.i18n
            .locales()
            .await
            .into_iter()
            .filter(|locale| filter.matches(locale))
            .collect()
    }

    async fn find_resource(&self, id: &str) -> Option<Locale> {
        self.i18n.locale(id).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::core::api::JsonApi;
    use crate::storage::InMemoryI18n;

    fn document(query: JsonApiQuery) -> Document {
        let api = JsonApi::new(ApiConfig::default_config()).with_adapter(LocaleAdapter::new());
        Document::new(Arc::new(api), query)
    }

    #[test]
    fn test_adapter_renders_all_fields() {
        let document = document(JsonApiQuery::new());
        let locale = Locale::new("en", "English").with_property("region", "GB");

        let resource = LocaleAdapter::new()
            .get_resource(Some(&locale as &dyn Any), &document, None)
            .unwrap()
            .unwrap();

        assert_eq!(resource.id(), "en");
        assert_eq!(resource.attribute("code").unwrap(), "en");
        assert_eq!(resource.attribute("name").unwrap(), "English");
        assert_eq!(resource.attribute("properties").unwrap()["region"], "GB");
        assert_eq!(resource.link("self"), Some("/api/v1/locales/en"));
    }

    #[test]
    fn test_adapter_sparse_fieldset() {
        let document = document(JsonApiQuery::new().with_fields(LOCALES, "code"));
        let locale = Locale::new("en", "English");

        let resource = LocaleAdapter::new()
            .get_resource(Some(&locale as &dyn Any), &document, None)
            .unwrap()
            .unwrap();

        assert!(resource.attribute("code").is_some());
        assert!(resource.attribute("name").is_none());
        assert!(resource.attribute("properties").is_none());
    }

    #[test]
    fn test_adapter_null_and_wrong_shape() {
        let document = document(JsonApiQuery::new());
        let adapter = LocaleAdapter::new();

        assert!(adapter.get_resource(None, &document, None).unwrap().is_none());
        assert!(matches!(
            adapter.get_resource(Some(&"en" as &dyn Any), &document, None),
            Err(AdapterError::UnexpectedData { expected: "locale" })
        ));
    }

    #[test]
    fn test_unknown_filter_is_recorded() {
        let controller = LocaleController::new(Arc::new(InMemoryI18n::new()));
        let query = JsonApiQuery::new()
            .with_filter("code", "en")
            .with_filter("region", "GB");
        let mut document = document(query.clone());

        let filter = controller.resolve_filters(&query, &mut document);

        assert!(filter.code.is_some());
        assert_eq!(document.errors().len(), 1);
        assert_eq!(document.errors()[0].code(), "FILTER_NOT_FOUND");
    }

    #[test]
    fn test_empty_filters_are_skipped() {
        let controller = LocaleController::new(Arc::new(InMemoryI18n::new()));
        let query = JsonApiQuery::new()
            .with_filter("code", "")
            .with_filter("name", "");
        let mut document = document(query.clone());

        let filter = controller.resolve_filters(&query, &mut document);

        assert!(filter.code.is_none());
        assert!(filter.name.is_none());
        assert!(!document.has_errors());
    }

    #[tokio::test]
    async fn test_get_resources_filters_by_name() {
        let i18n = InMemoryI18n::new();
        i18n.add_locale(Locale::new("en", "English")).await;
        i18n.add_locale(Locale::new("nl", "Nederlands")).await;
        let controller = LocaleController::new(Arc::new(i18n));

        let filter = LocaleFilter {
            name: Some(StringMatcher::new("NEDER")),
            ..Default::default()
        };
        let locales = controller.get_resources(&filter).await;

        assert_eq!(locales.len(), 1);
        assert_eq!(locales[0].code(), "nl");
        assert!(controller.find_resource("fr").await.is_none());
    }
}
