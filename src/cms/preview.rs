//! Live-preview detection
//!
//! The visual editor loads pages with marker query parameters. A request that
//! carries one of them is being previewed, and must be handed to the CMS
//! component even when no published entry matches.

const PREVIEW_PARAMS: [&str; 3] = ["builder.preview", "builder.frameEditing", "__builder_editing__"];

/// Whether the request with this query string is a live preview
pub fn is_previewing(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };

    url::form_urlencoded::parse(query.as_bytes()).any(|(key, value)| {
        PREVIEW_PARAMS.contains(&&*key) && !matches!(&*value, "false" | "0")
    })
}
