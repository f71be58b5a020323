//! Configuration loading and management

use crate::core::error::ConfigError;
use indexmap::IndexMap;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

pub const ROUTE_LOCALES_INDEX: &str = "api.locales.index";
pub const ROUTE_LOCALES_DETAIL: &str = "api.locales.detail";
pub const ROUTE_TRANSLATIONS_INDEX: &str = "api.translations.index";
pub const ROUTE_TRANSLATIONS_DETAIL: &str = "api.translations.detail";
pub const ROUTE_TRANSLATIONS_RELATED: &str = "api.translations.related";
pub const ROUTE_TRANSLATIONS_RELATIONSHIP: &str = "api.translations.relationship";

/// Routes the adapters generate links for
pub const REQUIRED_ROUTES: &[&str] = &[
    ROUTE_LOCALES_DETAIL,
    ROUTE_TRANSLATIONS_DETAIL,
    ROUTE_TRANSLATIONS_RELATED,
    ROUTE_TRANSLATIONS_RELATIONSHIP,
];

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Hard cap on the page size, whatever the client asks for
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_max_limit() -> usize {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
        }
    }
}

/// Named routes used to generate resource links
///
/// Templates use `{name}` placeholders, e.g. `/translations/{id}/{relationship}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: IndexMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, template: &str) {
        self.routes.insert(name.to_string(), template.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Expand the route `name` with `params`
    pub fn path(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ConfigError> {
        let template = self
            .routes
            .get(name)
            .ok_or_else(|| ConfigError::RouteNotFound {
                name: name.to_string(),
            })?;

        Ok(expand(template, params))
    }
}

/// Characters escaped in a substituted path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Single pass over `template`; substituted values are never rescanned.
/// Placeholders without a matching param are kept verbatim.
fn expand(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let token = &rest[start..];

        let Some(end) = token.find('}') else {
            rest = token;
            break;
        };

        let name = &token[1..end];
        match params.iter().find(|(param, _)| *param == name) {
            Some((_, value)) => path.extend(utf8_percent_encode(value, PATH_SEGMENT)),
            None => path.push_str(&token[..=end]),
        }
        rest = &token[end + 1..];
    }

    path.push_str(rest);
    path
}

/// Complete configuration of the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for every generated link, may be empty
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub routes: RouteTable,
}

impl ApiConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Routes missing from the YAML fall back to the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;

        for (name, template) in Self::default_routes().routes {
            if !config.routes.contains(&name) {
                config.routes.insert(&name, &template);
            }
        }

        Ok(config)
    }

    /// Absolute URL of a named route
    pub fn url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ConfigError> {
        let path = self.routes.path(name, params)?;
        Ok(format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }

    pub fn default_routes() -> RouteTable {
        let mut routes = RouteTable::new();
        routes.insert(ROUTE_LOCALES_INDEX, "/api/v1/locales");
        routes.insert(ROUTE_LOCALES_DETAIL, "/api/v1/locales/{id}");
        routes.insert(ROUTE_TRANSLATIONS_INDEX, "/api/v1/translations");
        routes.insert(ROUTE_TRANSLATIONS_DETAIL, "/api/v1/translations/{id}");
        routes.insert(
            ROUTE_TRANSLATIONS_RELATED,
            "/api/v1/translations/{id}/{relationship}",
        );
        routes.insert(
            ROUTE_TRANSLATIONS_RELATIONSHIP,
            "/api/v1/translations/{id}/relationships/{relationship}",
        );
        routes
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self {
            base_url: String::new(),
            pagination: PaginationConfig::default(),
            routes: Self::default_routes(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default_config();
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(
            config
                .url(ROUTE_TRANSLATIONS_DETAIL, &[("id", "en-greeting")])
                .unwrap(),
            "/api/v1/translations/en-greeting"
        );
    }

    #[test]
    fn test_url_with_base_and_multiple_params() {
        let mut config = ApiConfig::default_config();
        config.base_url = "https://example.org/".to_string();

        let url = config
            .url(
                ROUTE_TRANSLATIONS_RELATIONSHIP,
                &[("id", "nl-title"), ("relationship", "locale")],
            )
            .unwrap();
        assert_eq!(
            url,
            "https://example.org/api/v1/translations/nl-title/relationships/locale"
        );
    }

    #[test]
    fn test_url_params_are_single_segments() {
        let config = ApiConfig::default_config();

        let url = config
            .url(ROUTE_TRANSLATIONS_DETAIL, &[("id", "en-a/b?c#d")])
            .unwrap();
        assert_eq!(url, "/api/v1/translations/en-a%2Fb%3Fc%23d");

        let url = config
            .url(
                ROUTE_TRANSLATIONS_RELATIONSHIP,
                &[("id", "en-x{relationship}"), ("relationship", "locale")],
            )
            .unwrap();
        assert_eq!(
            url,
            "/api/v1/translations/en-x%7Brelationship%7D/relationships/locale"
        );
    }

    #[test]
    fn test_unmatched_placeholders_are_kept() {
        let mut routes = RouteTable::new();
        routes.insert("odd", "/things/{id}/{other}/{open");

        assert_eq!(
            routes.path("odd", &[("id", "1")]).unwrap(),
            "/things/1/{other}/{open"
        );
    }

    #[test]
    fn test_unknown_route() {
        let config = ApiConfig::default_config();
        assert!(matches!(
            config.url("api.things.index", &[]),
            Err(ConfigError::RouteNotFound { .. })
        ));
    }

    #[test]
    fn test_yaml_overrides_and_defaults() {
        let yaml = r#"
base_url: "http://localhost:8080"
pagination:
  max_limit: 25
routes:
  api.locales.detail: "/locales/{id}"
"#;
        let config = ApiConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.pagination.max_limit, 25);
        assert_eq!(
            config.url(ROUTE_LOCALES_DETAIL, &[("id", "en")]).unwrap(),
            "http://localhost:8080/locales/en"
        );
        assert!(config.routes.contains(ROUTE_TRANSLATIONS_INDEX));
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: \"https://api.example.org\"").unwrap();

        let config = ApiConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.pagination.max_limit, 100);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ApiConfig::from_yaml_file("/nonexistent/api.yaml"),
            Err(ConfigError::IoError { .. })
        ));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ApiConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ApiConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.pagination.max_limit, config.pagination.max_limit);
        assert!(parsed.routes.contains(ROUTE_TRANSLATIONS_RELATED));
    }
}
