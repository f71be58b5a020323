//! Translations: key/value pairs of one locale, exposed as resources
//!
//! A translation has no storage of its own. It is materialized from the
//! translator of its locale and identified by `<locale code>-<key>`.

use crate::config::{
    ROUTE_TRANSLATIONS_DETAIL, ROUTE_TRANSLATIONS_RELATED, ROUTE_TRANSLATIONS_RELATIONSHIP,
};
use crate::core::adapter::{AdapterError, ResourceAdapter, relationship_path};
use crate::core::controller::{
    RelationshipDefinition, ResourceController, ResourceDefinition, WritableController,
};
use crate::core::document::{Document, ErrorScope};
use crate::core::error::ErrorObject;
use crate::core::filter::{StringMatcher, matches_optional};
use crate::core::observer::Observer;
use crate::core::query::JsonApiQuery;
use crate::core::resource::{Linkage, ResourceObject};
use crate::core::sorter::Sortable;
use crate::i18n::{Locale, LocaleRegistry};
use crate::resources::locale::LOCALES;
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub const TRANSLATIONS: &str = "translations";

const LOCALE: &str = "locale";

static DEFINITION: ResourceDefinition = ResourceDefinition {
    resource_type: TRANSLATIONS,
    attributes: &["key", "value"],
    relationships: &[RelationshipDefinition {
        name: LOCALE,
        target_type: LOCALES,
    }],
    sort_fields: &["locale", "key", "value"],
    bulk: true,
};

/// Separates the locale code from the key in a translation id
pub const ID_SEPARATOR: char = '-';

/// Composite translation id
///
/// The first `-` separates the locale code from the key, so keys may
/// contain `-` but locale codes may not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationId {
    pub locale: String,
    pub key: String,
}

impl TranslationId {
    pub fn new(locale: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
        }
    }

    /// Split `id` on its first `-`; `None` without a locale part
    pub fn parse(id: &str) -> Option<Self> {
        match id.split_once(ID_SEPARATOR) {
            Some((locale, key)) if !locale.is_empty() => Some(Self::new(locale, key)),
            _ => None,
        }
    }
}

impl fmt::Display for TranslationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ID_SEPARATOR}{}", self.locale, self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    locale: Locale,
    key: String,
    value: String,
}

impl Translation {
    pub fn new(locale: Locale, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locale,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> String {
        TranslationId::new(self.locale.code(), &self.key).to_string()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Sortable for Translation {
    fn sort_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "locale" => Some(Cow::Borrowed(self.locale.code())),
            "key" => Some(Cow::Borrowed(&self.key)),
            "value" => Some(Cow::Borrowed(&self.value)),
            _ => None,
        }
    }
}

/// A translation being populated from submitted data
///
/// Attributes are kept as submitted so validation can tell a missing value
/// from one of the wrong type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationDraft {
    /// Set once the translation exists
    pub id: Option<String>,
    pub locale: Option<Locale>,
    pub key: Option<Value>,
    pub value: Option<Value>,
}

/// Maps a [`Translation`] to a `translations` resource
#[derive(Debug, Clone, Default)]
pub struct TranslationAdapter;

impl TranslationAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceAdapter for TranslationAdapter {
    fn resource_type(&self) -> &str {
        TRANSLATIONS
    }

    fn get_resource(
        &self,
        value: Option<&dyn Any>,
        document: &Document,
        path: Option<&str>,
    ) -> Result<Option<ResourceObject>, AdapterError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let translation = value
            .downcast_ref::<Translation>()
            .ok_or(AdapterError::UnexpectedData {
                expected: "translation",
            })?;

        let api = document.api();
        let query = document.query();
        let id = translation.id();

        let mut resource = api.create_resource(TRANSLATIONS, &id, path);
        resource.set_link("self", api.url(ROUTE_TRANSLATIONS_DETAIL, &[("id", id.as_str())])?);

        if query.is_field_requested(TRANSLATIONS, "key") {
            resource.set_attribute("key", translation.key());
        }
        if query.is_field_requested(TRANSLATIONS, "value") {
            resource.set_attribute("value", translation.value());
        }

        if query.is_field_requested(TRANSLATIONS, LOCALE) && query.is_included(path) {
            let params = [("id", id.as_str()), ("relationship", LOCALE)];
            let nested_path = relationship_path(path, LOCALE);

            let mut relationship = api.create_relationship();
            relationship.set_link("self", api.url(ROUTE_TRANSLATIONS_RELATIONSHIP, &params)?);
            relationship.set_link("related", api.url(ROUTE_TRANSLATIONS_RELATED, &params)?);

            let locale = api.get_resource_adapter(LOCALES)?.get_resource(
                Some(translation.locale() as &dyn Any),
                document,
                Some(&nested_path),
            )?;
            relationship.set_resource(locale);

            resource.set_relationship(LOCALE, relationship);
        }

        Ok(Some(resource))
    }
}

/// Filter criteria for the translation index
#[derive(Debug, Clone, Default)]
pub struct TranslationFilter {
    /// Locale codes to read from; all locales when `None`
    pub locales: Option<Vec<String>>,
    pub key: Option<StringMatcher>,
    pub value: Option<StringMatcher>,
}

impl TranslationFilter {
    pub fn matches(&self, key: &str, value: &str) -> bool {
        matches_optional(self.key.as_ref(), key) && matches_optional(self.value.as_ref(), value)
    }
}

/// Exposes the translations of every locale in a [`LocaleRegistry`]
pub struct TranslationController {
    i18n: Arc<dyn LocaleRegistry>,
    observer: Arc<dyn Observer>,
}

impl TranslationController {
    pub fn new(i18n: Arc<dyn LocaleRegistry>, observer: Arc<dyn Observer>) -> Self {
        Self { i18n, observer }
    }

    /// Resolve the requested locale codes, skipping unknown ones
    async fn locales(&self, codes: Option<&[String]>) -> Vec<Locale> {
        let Some(codes) = codes else {
            return self.i18n.locales().await;
        };

        let mut locales = Vec::with_capacity(codes.len());
        for code in codes {
            match self.i18n.locale(code).await {
                Ok(locale) => locales.push(locale),
                Err(e) => self.observer.log_exception(&e),
            }
        }

        locales
    }
}

#[async_trait]
impl ResourceController for TranslationController {
    type Resource = Translation;
    type Filter = TranslationFilter;

    fn definition(&self) -> &ResourceDefinition {
        &DEFINITION
    }

    fn resolve_filters(&self, query: &JsonApiQuery, document: &mut Document) -> TranslationFilter {
        let mut filter = TranslationFilter::default();

        for (name, value) in query.filters() {
            match name.as_str() {
                "locale" => {
                    let codes: IndexSet<&str> = value.values().into_iter().collect();
                    filter.locales = (!codes.is_empty())
                        .then(|| codes.into_iter().map(str::to_string).collect());
                }
                "key" => {
                    filter.key = (!value.is_empty()).then(|| StringMatcher::new(value.as_str()));
                }
                "value" => {
                    filter.value = (!value.is_empty()).then(|| StringMatcher::new(value.as_str()));
                }
                _ => document.add_error(ErrorObject::filter_not_found(TRANSLATIONS, name)),
            }
        }

        filter
    }

    async fn get_resources(&self, filter: &TranslationFilter) -> Vec<Translation> {
        let mut translations = IndexMap::new();

        for locale in self.locales(filter.locales.as_deref()).await {
            let translator = match self.i18n.translator(&locale).await {
                Ok(translator) => translator,
                Err(e) => {
                    self.observer.log_exception(&e);
                    continue;
                }
            };

            for (key, value) in translator.translations().await {
                if !filter.matches(&key, &value) {
                    continue;
                }

                let translation = Translation::new(locale.clone(), key, value);
                translations.insert(translation.id(), translation);
            }
        }

        translations.into_values().collect()
    }

    async fn find_resource(&self, id: &str) -> Option<Translation> {
        let id = TranslationId::parse(id)?;
        let locale = self.i18n.locale(&id.locale).await.ok()?;
        let translator = self.i18n.translator(&locale).await.ok()?;
        let value = translator.translation(&id.key).await?;

        Some(Translation::new(locale, id.key, value))
    }

    fn related<'a>(
        &self,
        resource: &'a Translation,
        relationship: &str,
    ) -> Option<&'a (dyn Any + Send + Sync)> {
        match relationship {
            LOCALE => Some(resource.locale()),
            _ => None,
        }
    }
}

/// `None`, `null` and `""` count as missing
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[async_trait]
impl WritableController for TranslationController {
    type Draft = TranslationDraft;
    type Related = Locale;

    fn new_draft(&self) -> TranslationDraft {
        TranslationDraft::default()
    }

    fn draft_from(&self, translation: Translation) -> TranslationDraft {
        TranslationDraft {
            id: Some(translation.id()),
            locale: Some(translation.locale),
            key: Some(Value::String(translation.key)),
            value: Some(Value::String(translation.value)),
        }
    }

    async fn existing_id(&self, draft: &TranslationDraft) -> Option<String> {
        if draft.id.is_some() {
            return None;
        }

        let locale = draft.locale.as_ref()?;
        let key = draft.key.as_ref()?.as_str()?;

        let translator = match self.i18n.translator(locale).await {
            Ok(translator) => translator,
            Err(e) => {
                self.observer.log_exception(&e);
                return None;
            }
        };
        translator.translation(key).await?;

        Some(TranslationId::new(locale.code(), key).to_string())
    }

    fn process_attribute(
        &self,
        draft: &TranslationDraft,
        attribute: &str,
        value: &Value,
        errors: &mut ErrorScope<'_>,
    ) -> bool {
        if attribute == "key" && draft.id.is_some() && draft.key.as_ref() != Some(value) {
            errors.attribute_readonly(attribute);
            return false;
        }

        true
    }

    fn apply_attribute(&self, draft: &mut TranslationDraft, attribute: &str, value: Value) {
        match attribute {
            "key" => draft.key = Some(value),
            "value" => draft.value = Some(value),
            _ => {}
        }
    }

    fn process_relationship(
        &self,
        _draft: &TranslationDraft,
        relationship: &str,
        linkage: &Linkage,
        errors: &mut ErrorScope<'_>,
    ) -> bool {
        let invalid = match relationship {
            LOCALE => matches!(linkage, Linkage::Many(_) | Linkage::Null),
            _ => linkage.is_empty(),
        };

        if invalid {
            errors.relationship_validation(relationship, "cannot be a collection or null");
            return false;
        }

        true
    }

    async fn get_relationship(&self, relationship: &str, id: &str) -> Option<Locale> {
        if relationship != LOCALE {
            return None;
        }

        match self.i18n.locale(id).await {
            Ok(locale) => Some(locale),
            Err(e) => {
                self.observer.log_exception(&e);
                None
            }
        }
    }

    fn process_relationship_data(
        &self,
        draft: &TranslationDraft,
        relationship: &str,
        value: Option<&Locale>,
        errors: &mut ErrorScope<'_>,
    ) -> bool {
        if relationship != LOCALE {
            return true;
        }

        let Some(locale) = value else {
            errors.relationship_validation(relationship, "is required");
            return false;
        };

        if locale.code().contains(ID_SEPARATOR) {
            errors.relationship_validation(relationship, "has a code that cannot be used in an id");
            return false;
        }

        let changed = draft
            .locale
            .as_ref()
            .is_some_and(|current| current.code() != locale.code());
        if draft.id.is_some() && changed {
            errors.relationship_readonly(relationship);
            return false;
        }

        true
    }

    fn apply_relationship(
        &self,
        draft: &mut TranslationDraft,
        relationship: &str,
        value: Option<Locale>,
    ) {
        if relationship == LOCALE {
            draft.locale = value;
        }
    }

    fn validate_resource(&self, draft: &TranslationDraft, errors: &mut ErrorScope<'_>) {
        for (attribute, value) in [("key", &draft.key), ("value", &draft.value)] {
            if is_missing(value.as_ref()) {
                errors.attribute_validation(attribute, "is required");
            } else if !value.as_ref().is_some_and(Value::is_string) {
                errors.attribute_validation(attribute, "should be a string");
            }
        }

        if draft.locale.is_none() {
            errors.relationship_validation(LOCALE, "is required");
        }
    }

    async fn save_resource(&self, draft: TranslationDraft) -> Result<Translation, ErrorObject> {
        let (Some(locale), Some(Value::String(key)), Some(Value::String(value))) =
            (draft.locale, draft.key, draft.value)
        else {
            return Err(ErrorObject::invalid_document("translation is incomplete"));
        };

        let translator = self.i18n.translator(&locale).await.map_err(|e| {
            self.observer.log_exception(&e);
            ErrorObject::relationship_validation(TRANSLATIONS, LOCALE, "could not be resolved")
        })?;
        translator.set_translation(&key, Some(value.clone())).await;

        tracing::debug!(locale = locale.code(), key = %key, "translation saved");

        Ok(Translation::new(locale, key, value))
    }

    async fn delete_resource(&self, translation: Translation) -> Result<(), ErrorObject> {
        let id = translation.id();
        let translator = self
            .i18n
            .translator(translation.locale())
            .await
            .map_err(|e| {
                self.observer.log_exception(&e);
                ErrorObject::resource_not_found(TRANSLATIONS, &id)
            })?;
        translator.set_translation(translation.key(), None).await;

        tracing::debug!(id = %id, "translation deleted");

        Ok(())
    }
}
