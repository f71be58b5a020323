//! Shared fixture for the endpoint integration tests
//!
//! Builds an [`ApiHost`] over an in-memory registry seeded with three
//! locales and a handful of translations:
//!
//! | locale | key             | value      |
//! |--------|-----------------|------------|
//! | en     | greeting        | Hello      |
//! | en     | farewell        | Goodbye    |
//! | en     | label.sign-in   | Sign in    |
//! | en     | title           | Welcome    |
//! | nl     | greeting        | Hallo      |
//! | nl     | farewell        | Tot ziens  |
//!
//! `fr` exists but has no translations.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use i18n_jsonapi::prelude::*;
use serde_json::{Value, json};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub const SEED: &[(&str, &str, &str)] = &[
    ("en", "greeting", "Hello"),
    ("en", "farewell", "Goodbye"),
    ("en", "label.sign-in", "Sign in"),
    ("en", "title", "Welcome"),
    ("nl", "greeting", "Hallo"),
    ("nl", "farewell", "Tot ziens"),
];

/// Observer keeping every report for assertions
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn log_exception(&self, error: &(dyn Error + 'static)) {
        self.events.lock().unwrap().push(format!("exception: {}", error));
    }

    fn data_quality(&self, resource_type: &str, id: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("data quality: {} {} {}", resource_type, id, message));
    }
}

pub struct Fixture {
    pub i18n: InMemoryI18n,
    pub host: ApiHost,
    pub observer: RecordingObserver,
}

impl Fixture {
    /// Current stored value, bypassing the endpoints
    pub async fn stored(&self, code: &str, key: &str) -> Option<String> {
        let locale = self.i18n.locale(code).await.ok()?;
        let translator = self.i18n.translator(&locale).await.ok()?;
        translator.translation(key).await
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn fixture() -> Fixture {
    init_tracing();

    let i18n = InMemoryI18n::new();
    i18n.add_locale(Locale::new("en", "English").with_property("region", "GB"))
        .await;
    i18n.add_locale(Locale::new("nl", "Nederlands")).await;
    i18n.add_locale(Locale::new("fr", "Français")).await;

    for (code, key, value) in SEED {
        i18n.set_translation(code, key, value).await.unwrap();
    }

    let observer = RecordingObserver::default();
    let host = ApiBuilder::new()
        .with_locale_registry(i18n.clone())
        .with_observer(observer.clone())
        .build_host()
        .unwrap();

    Fixture {
        i18n,
        host,
        observer,
    }
}

pub fn query(pairs: &[(&str, &str)]) -> JsonApiQuery {
    JsonApiQuery::from_pairs(pairs.iter().copied()).unwrap()
}

/// Ids of the primary collection, in document order
pub fn ids(document: &Document) -> Vec<String> {
    document
        .collection()
        .unwrap_or_default()
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

/// Error codes in recording order
pub fn codes(document: &Document) -> Vec<&'static str> {
    document.errors().iter().map(|e| e.code()).collect()
}

pub fn translation(locale: &str, key: &str, value: &str) -> Value {
    json!({
        "type": "translations",
        "attributes": { "key": key, "value": value },
        "relationships": {
            "locale": { "data": { "type": "locales", "id": locale } }
        }
    })
}

pub fn body(data: Value) -> Value {
    json!({ "data": data })
}
