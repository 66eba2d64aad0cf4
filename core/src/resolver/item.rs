#![deny(missing_docs)]

//! # Item
//!
//! The document being processed: where it lives and what it contains.
//! Its location is the base against which the data URIs of other documents
//! are resolved.

use crate::error::{AppError, AppResult};
use crate::refs::pointer::{is_remote, resolve_uri, split_fragment};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// A source document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    /// File path or URL of the document, if known.
    pub location: Option<String>,
    /// Raw content (JSON or YAML).
    pub content: String,
}

impl Item {
    /// Creates an item from a location and its content.
    pub fn new(location: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            content: content.into(),
        }
    }

    /// Creates an item with no location. Relative data URIs resolve against
    /// the working directory.
    pub fn inline(content: impl Into<String>) -> Self {
        Self {
            location: None,
            content: content.into(),
        }
    }

    /// Reads an item from disk.
    pub async fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Fetch {
                location: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(path.display().to_string(), content))
    }

    /// True when `data_uri` designates this item's own document.
    ///
    /// Besides the empty data URI and the literal location, any relative path
    /// that leads back to the item (`api.yaml`, `./api.yaml`,
    /// `../specs/api.yaml` for `specs/api.yaml`) is local.
    pub fn is_local(&self, data_uri: &str) -> bool {
        if data_uri.is_empty() {
            return true;
        }
        match self.location.as_deref() {
            Some(location) => {
                location == data_uri
                    || normalize_location(&self.resolve_location(data_uri))
                        == normalize_location(location)
            }
            None => false,
        }
    }

    /// Rewrites `uri` to its fragment-only form when it points into this
    /// item, so one target is registered under one URI.
    pub fn canonical_uri(&self, uri: &str) -> String {
        match split_fragment(uri) {
            (data_uri, fragment) if !data_uri.is_empty() && self.is_local(data_uri) => {
                format!("#{}", fragment.unwrap_or_default())
            }
            _ => uri.to_string(),
        }
    }

    /// Location to fetch for `data_uri`.
    ///
    /// URLs are joined against a URL location; file paths are taken as
    /// siblings of the item's file. Absolute data URIs are returned as-is.
    pub fn resolve_location(&self, data_uri: &str) -> String {
        if data_uri.is_empty() {
            return self.location.clone().unwrap_or_default();
        }
        if Url::parse(data_uri).is_ok() || Path::new(data_uri).is_absolute() {
            return data_uri.to_string();
        }

        match self.location.as_deref() {
            Some(location) if is_remote(location) || location.starts_with("file://") => {
                resolve_uri(data_uri, location)
            }
            Some(location) => {
                let sibling: PathBuf = Path::new(location)
                    .parent()
                    .map(|dir| dir.join(data_uri))
                    .unwrap_or_else(|| PathBuf::from(data_uri));
                sibling.display().to_string()
            }
            None => data_uri.to_string(),
        }
    }
}

/// Lexically removes `.` and `..` from a file path; URLs are re-serialized.
fn normalize_location(location: &str) -> String {
    if let Ok(url) = Url::parse(location) {
        return url.to_string();
    }
    let mut normalized = PathBuf::new();
    for component in Path::new(location).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_local() {
        let item = Item::new("specs/api.yaml", "{}");
        assert!(item.is_local(""));
        assert!(item.is_local("specs/api.yaml"));
        assert!(!item.is_local("common.yaml"));
    }

    #[test]
    fn test_is_local_through_relative_paths() {
        let item = Item::new("specs/api.yaml", "{}");
        assert!(item.is_local("api.yaml"));
        assert!(item.is_local("./api.yaml"));
        assert!(item.is_local("../specs/api.yaml"));
        assert!(!item.is_local("common/api.yaml"));
        assert!(!item.is_local("../api.yaml"));

        let remote = Item::new("https://example.com/specs/api.yaml", "{}");
        assert!(remote.is_local("api.yaml"));
        assert!(remote.is_local("../specs/api.yaml"));
        assert!(!remote.is_local("https://example.com/api.yaml"));

        assert!(!Item::inline("{}").is_local("api.yaml"));
    }

    #[test]
    fn test_canonical_uri() {
        let item = Item::new("specs/api.yaml", "{}");
        assert_eq!(item.canonical_uri("api.yaml#/definitions/Tag"), "#/definitions/Tag");
        assert_eq!(item.canonical_uri("api.yaml"), "#");
        assert_eq!(item.canonical_uri("#/definitions/Tag"), "#/definitions/Tag");
        assert_eq!(
            item.canonical_uri("common/owner.yaml#/Owner"),
            "common/owner.yaml#/Owner"
        );
    }

    #[test]
    fn test_resolve_location_for_files() {
        let item = Item::new("specs/api.yaml", "{}");
        assert_eq!(item.resolve_location(""), "specs/api.yaml");
        assert_eq!(
            item.resolve_location("common/pet.json"),
            Path::new("specs").join("common/pet.json").display().to_string()
        );
        assert_eq!(
            item.resolve_location("https://example.com/pet.json"),
            "https://example.com/pet.json"
        );
    }

    #[test]
    fn test_resolve_location_for_urls() {
        let item = Item::new("https://example.com/specs/api.yaml", "{}");
        assert_eq!(
            item.resolve_location("common/pet.json"),
            "https://example.com/specs/common/pet.json"
        );
        assert_eq!(
            item.resolve_location("../pet.json"),
            "https://example.com/pet.json"
        );
    }

    #[test]
    fn test_resolve_location_without_location() {
        let item = Item::inline("{}");
        assert_eq!(item.resolve_location("pet.json"), "pet.json");
        assert_eq!(item.resolve_location(""), "");
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        std::fs::write(&path, r#"{"swagger":"2.0"}"#).unwrap();

        let item = Item::from_file(&path).await.unwrap();
        assert_eq!(item.content, r#"{"swagger":"2.0"}"#);
        assert_eq!(item.location, Some(path.display().to_string()));

        let missing = Item::from_file(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(AppError::Fetch { .. })));
    }
}
