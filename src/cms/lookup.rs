//! Route parameters and lookup key derivation

use std::borrow::Cow;

/// Path segments captured by the catch-all page route.
///
/// `None` means the router supplied no segments at all (the site root); it is
/// treated exactly like an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(Option<Vec<String>>);

impl RouteParams {
    pub const fn new(segments: Option<Vec<String>>) -> Self {
        Self(segments)
    }

    /// Split a request path into percent-decoded, non-empty segments.
    ///
    /// An encoded slash stays encoded so `/a%2Fb` keeps a different lookup
    /// key from `/a/b`.
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map_or_else(|_| s.to_string(), Cow::into_owned)
                    .replace('/', "%2F")
            })
            .collect();

        if segments.is_empty() {
            Self::new(None)
        } else {
            Self::new(Some(segments))
        }
    }

    pub fn segments(&self) -> &[String] {
        self.0.as_deref().unwrap_or_default()
    }

    pub fn lookup_key(&self) -> String {
        lookup_key(self.segments())
    }
}

/// Build the content lookup key: `/` followed by the segments joined with `/`
pub fn lookup_key(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}
