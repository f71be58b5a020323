//! Translations Example
//!
//! Walks through the endpoint operations over an in-memory registry:
//! - Filtered, sorted index with the locale included
//! - A bulk create where one item fails validation
//! - A read-only violation on update
//!
//! Run with `RUST_LOG=debug` to see the endpoint events.

use anyhow::Result;
use i18n_jsonapi::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let i18n = InMemoryI18n::new();
    i18n.add_locale(Locale::new("en", "English")).await;
    i18n.add_locale(Locale::new("nl", "Nederlands")).await;
    i18n.set_translation("en", "greeting", "Hello").await?;
    i18n.set_translation("en", "farewell", "Goodbye").await?;
    i18n.set_translation("nl", "greeting", "Hallo").await?;

    let host = ApiBuilder::new().with_locale_registry(i18n).build_host()?;

    println!("📚 GET /api/v1/translations?filter[key]=greet*&sort=-locale&include=locale");
    let query = JsonApiQuery::from_pairs([
        ("filter[key]", "greet*"),
        ("sort", "-locale"),
        ("include", "locale"),
    ])?;
    let document = host.translations.index(query).await?;
    println!("{}\n", serde_json::to_string_pretty(&document.to_json())?);

    println!("📦 POST /api/v1/translations (bulk)");
    let body = json!({
        "data": [
            {
                "type": "translations",
                "attributes": { "key": "farewell", "value": "Tot ziens" },
                "relationships": { "locale": { "data": { "type": "locales", "id": "nl" } } }
            },
            {
                "type": "translations",
                "attributes": { "key": "title", "value": 42 },
                "relationships": { "locale": { "data": { "type": "locales", "id": "nl" } } }
            }
        ]
    });
    let document = host.translations.create(&body, JsonApiQuery::new()).await?;
    println!("status {}", document.status());
    println!("{}\n", serde_json::to_string_pretty(&document.to_json())?);

    println!("✏️  PATCH /api/v1/translations/en-greeting (key change)");
    let body = json!({
        "data": {
            "type": "translations",
            "id": "en-greeting",
            "attributes": { "key": "salute" }
        }
    });
    let document = host
        .translations
        .update(Some("en-greeting"), &body, JsonApiQuery::new())
        .await?;
    println!("status {}", document.status());
    println!("{}", serde_json::to_string_pretty(&document.to_json())?);

    Ok(())
}
