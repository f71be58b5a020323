//! In-memory locale registry and translators for testing and development

use crate::i18n::{Locale, LocaleNotFound, LocaleRegistry, Translator};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory translator
///
/// Keys keep their insertion order.
#[derive(Default)]
pub struct InMemoryTranslator {
    translations: RwLock<IndexMap<String, String>>,
}

impl InMemoryTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Translator for InMemoryTranslator {
    async fn translations(&self) -> IndexMap<String, String> {
        self.translations.read().await.clone()
    }

    async fn translation(&self, key: &str) -> Option<String> {
        self.translations.read().await.get(key).cloned()
    }

    async fn set_translation(&self, key: &str, value: Option<String>) {
        let mut translations = self.translations.write().await;
        match value {
            Some(value) => {
                translations.insert(key.to_string(), value);
            }
            None => {
                translations.shift_remove(key);
            }
        }
    }
}

/// In-memory locale registry
///
/// Locales keep their registration order; every locale owns one translator.
#[derive(Clone, Default)]
pub struct InMemoryI18n {
    locales: Arc<RwLock<IndexMap<String, (Locale, Arc<InMemoryTranslator>)>>>,
}

impl InMemoryI18n {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locale, replacing one with the same code
    pub async fn add_locale(&self, locale: Locale) {
        let code = locale.code().to_string();
        self.locales
            .write()
            .await
            .insert(code, (locale, Arc::new(InMemoryTranslator::new())));
    }

    /// Seed a translation, registering nothing when the locale is unknown
    pub async fn set_translation(
        &self,
        code: &str,
        key: &str,
        value: &str,
    ) -> Result<(), LocaleNotFound> {
        let translator = self.translator_for(code).await?;
        translator
            .set_translation(key, Some(value.to_string()))
            .await;
        Ok(())
    }

    async fn translator_for(&self, code: &str) -> Result<Arc<InMemoryTranslator>, LocaleNotFound> {
        self.locales
            .read()
            .await
            .get(code)
            .map(|(_, translator)| translator.clone())
            .ok_or_else(|| LocaleNotFound {
                code: code.to_string(),
            })
    }
}

#[async_trait]
impl LocaleRegistry for InMemoryI18n {
    async fn locales(&self) -> Vec<Locale> {
        self.locales
            .read()
            .await
            .values()
            .map(|(locale, _)| locale.clone())
            .collect()
    }

    async fn locale(&self, code: &str) -> Result<Locale, LocaleNotFound> {
        self.locales
            .read()
            .await
            .get(code)
            .map(|(locale, _)| locale.clone())
            .ok_or_else(|| LocaleNotFound {
                code: code.to_string(),
            })
    }

    async fn translator(&self, locale: &Locale) -> Result<Arc<dyn Translator>, LocaleNotFound> {
        let translator: Arc<dyn Translator> = self.translator_for(locale.code()).await?;
        Ok(translator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locales_keep_registration_order() {
        let i18n = InMemoryI18n::new();
        i18n.add_locale(Locale::new("nl", "Nederlands")).await;
        i18n.add_locale(Locale::new("en", "English")).await;

        let codes: Vec<String> = i18n
            .locales()
            .await
            .iter()
            .map(|l| l.code().to_string())
            .collect();
        assert_eq!(codes, vec!["nl", "en"]);
    }

    #[tokio::test]
    async fn test_unknown_locale() {
        let i18n = InMemoryI18n::new();
        let err = i18n.locale("xx").await.unwrap_err();
        assert_eq!(err.code, "xx");
        assert!(i18n.set_translation("xx", "k", "v").await.is_err());
    }

    #[tokio::test]
    async fn test_translator_read_your_writes() {
        let i18n = InMemoryI18n::new();
        i18n.add_locale(Locale::new("en", "English")).await;
        let locale = i18n.locale("en").await.unwrap();
        let translator = i18n.translator(&locale).await.unwrap();

        translator
            .set_translation("greeting", Some("Hello".to_string()))
            .await;
        assert_eq!(
            translator.translation("greeting").await,
            Some("Hello".to_string())
        );

        translator.set_translation("greeting", None).await;
        assert_eq!(translator.translation("greeting").await, None);
        assert!(translator.translations().await.is_empty());
    }

    #[tokio::test]
    async fn test_translations_keep_insertion_order() {
        let translator = InMemoryTranslator::new();
        translator.set_translation("b", Some("2".to_string())).await;
        translator.set_translation("a", Some("1".to_string())).await;
        translator.set_translation("c", Some("3".to_string())).await;
        translator.set_translation("a", None).await;

        let keys: Vec<String> = translator.translations().await.into_keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }
}
