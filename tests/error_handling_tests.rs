//! Tests for the error handling system
//!
//! These tests verify that:
//! - Error kinds map to the right HTTP status codes
//! - Error documents are properly formatted JSON:API
//! - Faults outside the request taxonomy surface as typed errors

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::*;
use i18n_jsonapi::core::QueryError;
use i18n_jsonapi::prelude::*;
use serde_json::{Value, json};
use std::any::Any;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_filter_not_found_returns_400() {
        assert_eq!(ErrorKind::FilterNotFound.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resource_not_found_returns_404() {
        assert_eq!(ErrorKind::ResourceNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_returns_422() {
        assert_eq!(
            ErrorKind::AttributeValidation.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorKind::RelationshipValidation.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_readonly_returns_403() {
        assert_eq!(ErrorKind::AttributeReadonly.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::RelationshipReadonly.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_data_exists_returns_409() {
        assert_eq!(ErrorKind::DataAlreadyExists.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_query_error_returns_400() {
        let err = JsonApiQuery::from_pairs([("page[limit]", "ten")]).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, QueryError::InvalidNumber { .. }));
    }
}

// =============================================================================
// Error Document Tests
// =============================================================================

mod error_document_tests {
    use super::*;

    #[tokio::test]
    async fn test_error_document_format() {
        let fx = fixture().await;
        let document = fx.host.translations.detail("nope", query(&[])).await.unwrap();

        let json = document.to_json();
        assert!(json.get("data").is_none());
        assert_eq!(json["jsonapi"]["version"], "1.0");

        let error = &json["errors"][0];
        assert_eq!(error["status"], "404");
        assert_eq!(error["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(error["title"], "Resource not found");
        assert!(error["detail"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_error_response() {
        let fx = fixture().await;
        let response = fx
            .host
            .translations
            .index(query(&[("filter[colour]", "red")]))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mixed_statuses_fall_back_to_400() {
        let fx = fixture().await;
        let mut document = fx.host.translations.document(query(&[]));
        document.add_error(ErrorObject::resource_not_found("translations", "a"));
        document.add_error(ErrorObject::data_exists("translations", "b"));

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_all_failed_bulk_uses_error_status() {
        let fx = fixture().await;
        let items = json!([
            { "type": "translations", "id": "en-nope" },
            { "type": "translations", "id": "nl-nope" },
        ]);

        let document = fx
            .host
            .translations
            .delete_bulk(&body(items), query(&[]))
            .await
            .unwrap();

        assert_eq!(document.status(), StatusCode::NOT_FOUND);
        assert_eq!(document.to_json()["data"], json!([null, null]));
    }

    #[tokio::test]
    async fn test_body_without_data() {
        let fx = fixture().await;
        let document = fx
            .host
            .translations
            .create(&json!({ "meta": {} }), query(&[]))
            .await
            .unwrap();

        assert_eq!(codes(&document), vec!["INVALID_DOCUMENT"]);
        assert_eq!(document.errors()[0].pointer(), Some("/data"));
    }

    #[tokio::test]
    async fn test_malformed_relationship_object() {
        let fx = fixture().await;
        let data = json!({
            "type": "translations",
            "attributes": { "key": "k", "value": "v" },
            "relationships": { "locale": { "type": "locales", "id": "en" } }
        });

        let document = fx
            .host
            .translations
            .create(&body(data), query(&[]))
            .await
            .unwrap();

        assert!(document.has_error_kind(ErrorKind::RelationshipValidation));
        assert_eq!(
            document.errors()[0].pointer(),
            Some("/data/relationships/locale")
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_array() {
        let fx = fixture().await;
        let document = fx
            .host
            .translations
            .delete_bulk(&body(json!({ "type": "translations", "id": "en-greeting" })), query(&[]))
            .await
            .unwrap();

        assert_eq!(codes(&document), vec!["INVALID_DOCUMENT"]);
        assert_eq!(fx.stored("en", "greeting").await.as_deref(), Some("Hello"));
    }
}

// =============================================================================
// Fault Tests
// =============================================================================

mod fault_tests {
    use super::*;

    #[tokio::test]
    async fn test_adapter_rejects_wrong_value() {
        let fx = fixture().await;
        let document = fx.host.locales.document(query(&[]));
        let adapter = fx.host.api().get_resource_adapter("locales").unwrap();

        let value: Value = json!("en");
        let err = adapter
            .get_resource(Some(&value as &dyn Any), &document, None)
            .unwrap_err();

        assert!(matches!(err, AdapterError::UnexpectedData { .. }));
        assert!(err.to_string().contains("not a locale"));
    }

    #[tokio::test]
    async fn test_unknown_adapter_type() {
        let fx = fixture().await;
        assert!(matches!(
            fx.host.api().get_resource_adapter("users"),
            Err(AdapterError::UnknownType { .. })
        ));
    }

    #[tokio::test]
    async fn test_locale_not_found_is_converted() {
        let fx = fixture().await;
        let err = fx.i18n.locale("xx").await.unwrap_err();
        assert_eq!(err, LocaleNotFound { code: "xx".to_string() });

        let document = fx.host.locales.detail("xx", query(&[])).await.unwrap();
        assert_eq!(codes(&document), vec!["RESOURCE_NOT_FOUND"]);
    }

    #[test]
    fn test_config_error_from_yaml() {
        let err = ApiConfig::from_yaml_str("pagination: [").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }
}
