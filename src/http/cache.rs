//! HTTP cache control module
//!
//! `ETag` generation, conditional request handling and the cache policies
//! applied to rendered pages.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a quoted `ETag` for a response body, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma separated list, and the `*` wildcard.
/// Returns true when the client copy is current (respond 304).
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Cache policy for a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Published page, shared caches may keep it for `max-age` seconds
    Public(u32),
    /// Preview renders change with every edit and must never be stored
    NoStore,
}

impl CachePolicy {
    /// Policy for a page render
    pub const fn for_page(previewing: bool, max_age: u32) -> Self {
        if previewing {
            Self::NoStore
        } else {
            Self::Public(max_age)
        }
    }

    /// Whether conditional requests may be answered with 304
    pub const fn is_revalidatable(self) -> bool {
        matches!(self, Self::Public(_))
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoStore => "no-store".to_string(),
        }
    }
}
