//! Locale registry and translator contracts
//!
//! These are the collaborators the resource controllers consume. The crate
//! ships an in-memory implementation in [`crate::storage::in_memory`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A locale, identified by its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    code: String,
    name: String,
    #[serde(default)]
    properties: IndexMap<String, String>,
}

impl Locale {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }
}

/// The registry has no locale with the requested code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Locale '{code}' not found")]
pub struct LocaleNotFound {
    pub code: String,
}

/// Key/value translations of one locale
#[async_trait]
pub trait Translator: Send + Sync {
    /// All translations, in the translator's own order
    async fn translations(&self) -> IndexMap<String, String>;

    /// The value for `key`, `None` when the key is not translated
    async fn translation(&self, key: &str) -> Option<String>;

    /// Set the value for `key`; `None` deletes the translation
    async fn set_translation(&self, key: &str, value: Option<String>);
}

/// Source of locales and their translators
#[async_trait]
pub trait LocaleRegistry: Send + Sync {
    /// All locales, in registry order
    async fn locales(&self) -> Vec<Locale>;

    /// The locale with `code`
    async fn locale(&self, code: &str) -> Result<Locale, LocaleNotFound>;

    /// The translator of `locale`
    async fn translator(&self, locale: &Locale) -> Result<Arc<dyn Translator>, LocaleNotFound>;
}
