#![deny(missing_docs)]

//! # Pointer Utilities
//!
//! Helpers for splitting reference URIs, walking JSON Pointer fragments
//! (RFC 6901) and composing relative references against a base URI (RFC 3986).
//!
//! Absolute bases go through `url`. Relative bases (`#/definitions/User`,
//! `models/pet.json`, `/specs/api.yaml`) are composed path-wise so that the
//! composed URI stays relative and `..` segments above the base survive.

use percent_encoding::percent_decode_str;
use serde_json::Value as JsonValue;
use url::Url;

/// Splits a URI into its document part and its fragment (without `#`).
///
/// `"pet.json#/definitions/Pet"` -> `("pet.json", Some("/definitions/Pet"))`
pub fn split_fragment(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('#') {
        Some((doc, fragment)) => (doc, Some(fragment)),
        None => (uri, None),
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`, in that order).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a key so it can be used as a JSON Pointer segment.
pub fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Walks `fragment` (e.g. `/definitions/User`) inside `document`.
///
/// An empty fragment addresses the whole document. Returns `None` when a
/// segment does not exist or the fragment is not a JSON Pointer.
pub fn extract_sub_tree<'a>(document: &'a JsonValue, fragment: &str) -> Option<&'a JsonValue> {
    if fragment.is_empty() {
        return Some(document);
    }
    let pointer = fragment.strip_prefix('/')?;

    pointer
        .split('/')
        .map(decode_pointer_segment)
        .try_fold(document, |node, key| match node {
            JsonValue::Object(map) => map.get(&key),
            JsonValue::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => None,
        })
}

/// Returns true if `location` must be fetched over the network.
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves `reference` against `base` following RFC 3986 composition rules.
///
/// - Absolute references are returned normalized.
/// - Fragment-only references stay within the base document.
/// - Relative paths replace the last segment of the base document path.
pub fn resolve_uri(reference: &str, base: &str) -> String {
    if let Ok(url) = Url::parse(reference) {
        return url.to_string();
    }

    if let Ok(base_url) = Url::parse(base) {
        return base_url
            .join(reference)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| reference.to_string());
    }

    let (base_doc, _) = split_fragment(base);
    let (ref_doc, ref_fragment) = split_fragment(reference);
    let fragment = ref_fragment
        .map(|f| format!("#{}", f))
        .unwrap_or_default();

    if ref_doc.is_empty() {
        return format!("{}{}", base_doc, fragment);
    }

    let doc = if ref_doc.starts_with('/') {
        normalize_path(ref_doc)
    } else {
        let dir = match base_doc.rfind('/') {
            Some(idx) => &base_doc[..=idx],
            None => "",
        };
        normalize_path(&format!("{}{}", dir, ref_doc))
    };

    format!("{}{}", doc, fragment)
}

/// Removes `.` and `..` segments from a relative or absolute path.
///
/// Leading `..` segments of a relative path cannot be popped and are kept.
fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if trailing && !normalized.is_empty() && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
