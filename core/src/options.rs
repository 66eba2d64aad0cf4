#![deny(missing_docs)]

//! # Resolver Options
//!
//! Policy for the orchestrator: whether to resolve at all, whether other
//! documents may be fetched, and per-URI overrides.
//!
//! Every historical shape of the `resolve` field is accepted:
//!
//! ```yaml
//! resolve: false                      # disable resolution
//! resolve: { remote: false }          # same-document references only
//! resolve:                            # overrides
//!   - { uri: "pet.json#/Pet", value: { type: object } }
//!   - { uri: "https://example.com/x.json", resolve: false }
//!   - { key: host, value: api.example.com }
//! resolve: { "pet.json#/Pet": { value: { type: object } } }
//! ```
//!
//! Shapes that cannot be understood fall back to the defaults.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Base environment the resolver runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseMode {
    /// Network fetches are allowed.
    #[default]
    Remote,
    /// Only the filesystem is available; `http(s)` documents are not fetched.
    Local,
}

impl BaseMode {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "local" => BaseMode::Local,
            _ => BaseMode::Remote,
        }
    }
}

/// Per-URI resolution override.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionItem {
    /// The reference URI (or document URI) this override applies to.
    pub uri: String,
    /// When false, the reference is acknowledged as absent without fetching.
    pub resolve: bool,
    /// Literal content injected instead of fetching.
    pub value: Option<JsonValue>,
}

/// Parameter-level override, consumed by a [`crate::resolver::ParameterResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterItem {
    /// Parameter / variable name.
    pub key: String,
    /// Value to apply.
    pub value: Option<JsonValue>,
}

/// One entry of the custom override table.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomResolution {
    /// Override keyed by reference URI.
    Reference(ResolutionItem),
    /// Override keyed by parameter name.
    Parameter(ParameterItem),
}

/// The `resolve` section of the options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ResolveSetting")]
pub struct ResolutionOptions {
    /// Allow loading references that live in other documents.
    pub remote: bool,
    /// Allow loading references that live in the document being processed.
    pub local: bool,
    /// Overrides keyed by URI (references) or key (parameters).
    pub custom: IndexMap<String, CustomResolution>,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            remote: true,
            local: true,
            custom: IndexMap::new(),
        }
    }
}

impl ResolutionOptions {
    /// Options with every kind of loading switched on or off.
    pub fn toggled(enabled: bool) -> Self {
        Self {
            remote: enabled,
            local: enabled,
            custom: IndexMap::new(),
        }
    }

    /// True when neither local nor remote loading is allowed.
    pub fn is_disabled(&self) -> bool {
        !self.remote && !self.local
    }

    /// Finds the override for a reference, by exact URI first, then by document URI.
    pub fn override_for(&self, uri: &str, data_uri: Option<&str>) -> Option<&ResolutionItem> {
        let lookup = |key: &str| match self.custom.get(key) {
            Some(CustomResolution::Reference(item)) => Some(item),
            _ => None,
        };
        lookup(uri).or_else(|| data_uri.filter(|d| !d.is_empty()).and_then(lookup))
    }

    /// Parameter overrides, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterItem> {
        self.custom.values().filter_map(|entry| match entry {
            CustomResolution::Parameter(item) => Some(item),
            CustomResolution::Reference(_) => None,
        })
    }

    /// Adds overrides, replacing earlier ones with the same URI or key.
    pub fn add_custom_resolutions<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = CustomResolution>,
    {
        for entry in entries {
            let key = match &entry {
                CustomResolution::Reference(item) => item.uri.clone(),
                CustomResolution::Parameter(item) => item.key.clone(),
            };
            self.custom.insert(key, entry);
        }
        self
    }
}

/// Top-level resolver options.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawResolverOptions")]
pub struct ResolverOptions {
    /// Base environment.
    pub base: BaseMode,
    /// Resolution policy.
    pub resolve: ResolutionOptions,
    /// Deadline for a whole resolution run, in seconds.
    pub timeout_secs: Option<u64>,
}

impl ResolverOptions {
    /// Options that skip the resolution step entirely.
    pub fn disabled() -> Self {
        Self {
            resolve: ResolutionOptions::toggled(false),
            ..Self::default()
        }
    }

    /// Disallows fetching other documents.
    pub fn without_remote(mut self) -> Self {
        self.resolve.remote = false;
        self
    }

    /// Sets the run deadline.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Parses options from YAML (JSON is valid YAML).
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Options(format!("Failed to parse resolver options: {}", e)))
    }

    /// Reads options from a YAML or JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Options(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}

// --- Deserialization shapes ---

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResolverOptions {
    Mode(String),
    Full(FullOptions),
    Other(JsonValue),
}

#[derive(Deserialize)]
struct FullOptions {
    #[serde(default)]
    base: Option<JsonValue>,
    #[serde(default)]
    resolve: Option<ResolutionOptions>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl From<RawResolverOptions> for ResolverOptions {
    fn from(raw: RawResolverOptions) -> Self {
        match raw {
            RawResolverOptions::Mode(mode) => ResolverOptions {
                base: BaseMode::parse(&mode),
                ..Self::default()
            },
            RawResolverOptions::Full(full) => ResolverOptions {
                base: full
                    .base
                    .as_ref()
                    .and_then(JsonValue::as_str)
                    .map(BaseMode::parse)
                    .unwrap_or_default(),
                resolve: full.resolve.unwrap_or_default(),
                timeout_secs: full.timeout_secs,
            },
            RawResolverOptions::Other(_) => Self::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResolveSetting {
    Toggle(bool),
    List(Vec<JsonValue>),
    Detailed(DetailedSetting),
    Keyed(IndexMap<String, JsonValue>),
    Other(JsonValue),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DetailedSetting {
    #[serde(default)]
    remote: Option<bool>,
    #[serde(default)]
    local: Option<bool>,
    #[serde(default)]
    custom: Option<JsonValue>,
}

#[derive(Deserialize, Default)]
struct RawEntry {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    resolve: Option<bool>,
    #[serde(default)]
    value: Option<JsonValue>,
}

impl RawEntry {
    fn into_custom(self, fallback_uri: Option<&str>) -> Option<CustomResolution> {
        if let Some(uri) = self.uri.filter(|u| !u.is_empty()) {
            return Some(CustomResolution::Reference(ResolutionItem {
                uri,
                resolve: self.resolve.unwrap_or(true),
                value: self.value,
            }));
        }
        if let Some(key) = self.key.filter(|k| !k.is_empty()) {
            return Some(CustomResolution::Parameter(ParameterItem {
                key,
                value: self.value,
            }));
        }
        fallback_uri.map(|uri| {
            CustomResolution::Reference(ResolutionItem {
                uri: uri.to_string(),
                resolve: self.resolve.unwrap_or(true),
                value: self.value,
            })
        })
    }
}

fn custom_from_list(entries: Vec<JsonValue>) -> Vec<CustomResolution> {
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawEntry>(entry).ok())
        .filter_map(|entry| entry.into_custom(None))
        .collect()
}

fn custom_from_map(entries: IndexMap<String, JsonValue>) -> Vec<CustomResolution> {
    entries
        .into_iter()
        .filter_map(|(uri, entry)| {
            serde_json::from_value::<RawEntry>(entry)
                .ok()
                .and_then(|raw| raw.into_custom(Some(&uri)))
        })
        .collect()
}

fn custom_from_value(value: JsonValue) -> Vec<CustomResolution> {
    match value {
        JsonValue::Array(entries) => custom_from_list(entries),
        JsonValue::Object(map) => custom_from_map(map.into_iter().collect()),
        _ => Vec::new(),
    }
}

impl From<ResolveSetting> for ResolutionOptions {
    fn from(setting: ResolveSetting) -> Self {
        match setting {
            ResolveSetting::Toggle(enabled) => ResolutionOptions::toggled(enabled),
            ResolveSetting::List(entries) => {
                ResolutionOptions::default().add_custom_resolutions(custom_from_list(entries))
            }
            ResolveSetting::Detailed(detailed) => {
                let base = ResolutionOptions {
                    remote: detailed.remote.unwrap_or(true),
                    local: detailed.local.unwrap_or(true),
                    custom: IndexMap::new(),
                };
                match detailed.custom {
                    Some(custom) => base.add_custom_resolutions(custom_from_value(custom)),
                    None => base,
                }
            }
            ResolveSetting::Keyed(entries) => {
                ResolutionOptions::default().add_custom_resolutions(custom_from_map(entries))
            }
            ResolveSetting::Other(_) => ResolutionOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ResolverOptions::from_yaml_str("").unwrap();
        assert_eq!(options, ResolverOptions::default());
        assert!(options.resolve.remote);
        assert!(options.resolve.local);
        assert_eq!(options.base, BaseMode::Remote);
    }

    #[test]
    fn test_resolve_false_disables_everything() {
        let options = ResolverOptions::from_yaml_str("resolve: false").unwrap();
        assert!(options.resolve.is_disabled());
    }

    #[test]
    fn test_resolve_remote_false() {
        let options = ResolverOptions::from_yaml_str("resolve: { remote: false }").unwrap();
        assert!(!options.resolve.remote);
        assert!(options.resolve.local);
    }

    #[test]
    fn test_resolve_list_of_overrides() {
        let yaml = r#"
base: LOCAL
resolve:
  - uri: "pet.json#/Pet"
    value: { type: object }
  - uri: "https://example.com/x.json"
    resolve: false
  - key: host
    value: api.example.com
  - 42
"#;
        let options = ResolverOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.base, BaseMode::Local);
        assert_eq!(options.resolve.custom.len(), 3);

        let pet = options.resolve.override_for("pet.json#/Pet", Some("pet.json"));
        assert_eq!(pet.and_then(|i| i.value.clone()), Some(json!({ "type": "object" })));

        let remote = options
            .resolve
            .override_for("https://example.com/x.json#/A", Some("https://example.com/x.json"));
        assert_eq!(remote.map(|i| i.resolve), Some(false));

        let params: Vec<&str> = options.resolve.parameters().map(|p| p.key.as_str()).collect();
        assert_eq!(params, vec!["host"]);
    }

    #[test]
    fn test_resolve_keyed_overrides() {
        let yaml = r##"
resolve:
  "#/definitions/Pet":
    value: { type: string }
  "#/definitions/Skip":
    resolve: false
"##;
        let options = ResolverOptions::from_yaml_str(yaml).unwrap();
        let pet = options.resolve.override_for("#/definitions/Pet", Some(""));
        assert_eq!(pet.and_then(|i| i.value.clone()), Some(json!({ "type": "string" })));
        let skip = options.resolve.override_for("#/definitions/Skip", Some(""));
        assert_eq!(skip.map(|i| i.resolve), Some(false));
        assert!(options.resolve.override_for("#/definitions/Other", Some("")).is_none());
    }

    #[test]
    fn test_detailed_with_custom() {
        let json = r#"{ "resolve": { "local": false, "custom": [ { "key": "token", "value": 3 } ] }, "timeout_secs": 9 }"#;
        let options = ResolverOptions::from_yaml_str(json).unwrap();
        assert!(options.resolve.remote);
        assert!(!options.resolve.local);
        assert_eq!(options.timeout_secs, Some(9));
        assert_eq!(
            options.resolve.parameters().next(),
            Some(&ParameterItem {
                key: "token".into(),
                value: Some(json!(3))
            })
        );
    }

    #[test]
    fn test_malformed_shapes_fall_back_to_defaults() {
        let options = ResolverOptions::from_yaml_str("resolve: 12").unwrap();
        assert_eq!(options.resolve, ResolutionOptions::default());

        let options = ResolverOptions::from_yaml_str("local").unwrap();
        assert_eq!(options.base, BaseMode::Local);

        let options = ResolverOptions::from_yaml_str("[1, 2]").unwrap();
        assert_eq!(options, ResolverOptions::default());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.yaml");
        std::fs::write(&path, "resolve: { remote: false }\n").unwrap();

        let options = ResolverOptions::from_path(&path).unwrap();
        assert!(!options.resolve.remote);

        let missing = ResolverOptions::from_path(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(AppError::Options(_))));
    }
}
