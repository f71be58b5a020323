//! # i18n-jsonapi
//!
//! JSON:API resource endpoints for locales and translations.
//!
//! ## Features
//!
//! - **Query Parsing**: `filter[...]`, `sort`, `page[...]`, `fields[...]` and `include`
//! - **Sparse Fieldsets**: Adapters only render what the query requests
//! - **Error Accumulation**: Every problem of a request is reported at once
//! - **Bulk Writes**: Create, update or delete many translations per request,
//!   with per-item outcomes and a multi-status response
//! - **Pluggable Storage**: Controllers consume `LocaleRegistry` and
//!   `Translator` traits; an in-memory backend is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use i18n_jsonapi::prelude::*;
//!
//! let i18n = InMemoryI18n::new();
//! i18n.add_locale(Locale::new("en", "English")).await;
//! i18n.set_translation("en", "greeting", "Hello").await?;
//!
//! let host = ApiBuilder::new().with_locale_registry(i18n).build_host()?;
//!
//! let query = JsonApiQuery::from_pairs([("filter[locale]", "en"), ("sort", "-key")])?;
//! let document = host.translations.index(query).await?;
//! println!("{}", document.to_json());
//! ```

pub mod config;
pub mod core;
pub mod i18n;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AdapterError, Document, ErrorKind, ErrorObject, ItemOutcome, JsonApi, JsonApiQuery,
        Observer, PrimaryData, ResourceAdapter, ResourceController, ResourceEndpoint,
        ResourceObject, TracingObserver, WritableController,
    };

    // === I18n ===
    pub use crate::i18n::{Locale, LocaleNotFound, LocaleRegistry, Translator};

    // === Resources ===
    pub use crate::resources::{
        LocaleAdapter, LocaleController, Translation, TranslationAdapter, TranslationController,
        TranslationId,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryI18n, InMemoryTranslator};

    // === Config ===
    pub use crate::config::ApiConfig;

    // === Server ===
    pub use crate::server::{ApiBuilder, ApiHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
