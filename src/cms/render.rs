//! Content rendering
//!
//! A single decision per request: hand the entry to the CMS component, or
//! answer with the not-found view. Previews always reach the CMS component so
//! editors can build pages that are not published yet.

use std::sync::Arc;

use super::preview::is_previewing;
use super::{CmsClient, CmsError, Content};

/// Produces the markup for a CMS page
pub trait PageRenderer: Send + Sync {
    fn render(&self, content: Option<&Content>, model: &str) -> Result<String, CmsError>;
}

/// What the renderer decided for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Page { html: String, previewing: bool },
    NotFound,
}

pub struct ContentRenderer {
    component: Arc<dyn PageRenderer>,
}

impl ContentRenderer {
    pub fn new(component: Arc<dyn PageRenderer>) -> Self {
        Self { component }
    }

    /// Render for a request whose query string is `query`
    pub fn render(
        &self,
        content: Option<&Content>,
        model: &str,
        query: Option<&str>,
    ) -> Result<RenderOutcome, CmsError> {
        self.render_with_preview(content, model, is_previewing(query))
    }

    pub fn render_with_preview(
        &self,
        content: Option<&Content>,
        model: &str,
        previewing: bool,
    ) -> Result<RenderOutcome, CmsError> {
        if content.is_none() && !previewing {
            return Ok(RenderOutcome::NotFound);
        }

        let html = self.component.render(content, model)?;
        Ok(RenderOutcome::Page { html, previewing })
    }
}

const DEFAULT_TITLE: &str = "Page";

/// Emits an HTML document that mounts the CMS web component.
///
/// The fetched entry is embedded as JSON so the component can hydrate without
/// a second round trip; in preview mode the entry may be `null` and the
/// component loads the draft itself.
pub struct ShellRenderer {
    client: Arc<CmsClient>,
}

impl ShellRenderer {
    pub fn new(client: Arc<CmsClient>) -> Self {
        Self { client }
    }
}

impl PageRenderer for ShellRenderer {
    fn render(&self, content: Option<&Content>, model: &str) -> Result<String, CmsError> {
        let title = content.and_then(Content::title).unwrap_or(DEFAULT_TITLE);
        let payload = escape_script_json(&serde_json::to_string(&content)?);

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script async src="{script}"></script>
</head>
<body>
    <builder-component model="{model}" api-key="{api_key}"></builder-component>
    <script type="application/json" id="builder-content">{payload}</script>
    <script>
        (function () {{
            var el = document.querySelector("builder-component");
            var data = document.getElementById("builder-content");
            var content = data ? JSON.parse(data.textContent) : null;
            if (el && content) {{
                el.options = {{ content: content }};
            }}
        }})();
    </script>
</body>
</html>"#,
            title = escape_html(title),
            script = escape_html(self.client.script_url()),
            model = escape_html(model),
            api_key = escape_html(self.client.api_key()),
        ))
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON placed inside a `<script>` element must not contain `</script>`
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::RecordingRenderer;
    use crate::config::CmsConfig;

    fn page(title: &str) -> Content {
        Content::from(serde_json::json!({ "name": title, "data": { "title": title } }))
    }

    #[test]
    fn test_decision_table() {
        let recorder = Arc::new(RecordingRenderer::default());
        let renderer = ContentRenderer::new(recorder.clone());
        let content = page("About");

        for (content, previewing) in [
            (Some(&content), false),
            (Some(&content), true),
            (None, true),
            (None, false),
        ] {
            let outcome = renderer
                .render_with_preview(content, "page", previewing)
                .unwrap();
            let expect_page = content.is_some() || previewing;
            assert_eq!(
                matches!(outcome, RenderOutcome::Page { .. }),
                expect_page,
                "content={content:?} previewing={previewing}"
            );
        }

        // Only the three page branches reached the component
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn test_content_passed_through_unchanged() {
        let recorder = Arc::new(RecordingRenderer::default());
        let renderer = ContentRenderer::new(recorder.clone());
        let content = page("About");

        let outcome = renderer.render(Some(&content), "page", None).unwrap();

        assert_eq!(
            outcome,
            RenderOutcome::Page {
                html: "<cms model=\"page\">About</cms>".to_string(),
                previewing: false,
            }
        );
        assert_eq!(recorder.calls(), vec![(Some(content), "page".to_string())]);
    }

    #[test]
    fn test_preview_bypasses_not_found() {
        let recorder = Arc::new(RecordingRenderer::default());
        let renderer = ContentRenderer::new(recorder.clone());

        let outcome = renderer
            .render(None, "page", Some("builder.preview=page"))
            .unwrap();

        assert!(matches!(outcome, RenderOutcome::Page { previewing: true, .. }));
        assert_eq!(recorder.calls(), vec![(None, "page".to_string())]);
    }

    #[test]
    fn test_missing_content_is_not_found() {
        let recorder = Arc::new(RecordingRenderer::default());
        let renderer = ContentRenderer::new(recorder.clone());

        let outcome = renderer.render(None, "page", Some("page=2")).unwrap();

        assert_eq!(outcome, RenderOutcome::NotFound);
        assert!(recorder.calls().is_empty());
    }

    fn shell() -> ShellRenderer {
        let client = CmsClient::new(&CmsConfig {
            api_key: Some("public-key".to_string()),
            api_host: "https://cdn.builder.io".to_string(),
            model: "page".to_string(),
            script_url: "https://cdn.builder.io/js/webcomponents".to_string(),
        })
        .unwrap();
        ShellRenderer::new(Arc::new(client))
    }

    #[test]
    fn test_shell_mounts_component() {
        let html = shell().render(Some(&page("About us")), "page").unwrap();
        assert!(html.contains("<title>About us</title>"));
        assert!(html.contains(r#"<builder-component model="page" api-key="public-key">"#));
        assert!(html.contains(r#"src="https://cdn.builder.io/js/webcomponents""#));
        assert!(html.contains(r#""title":"About us""#));
    }

    #[test]
    fn test_shell_without_content() {
        let html = shell().render(None, "page").unwrap();
        assert!(html.contains("<title>Page</title>"));
        assert!(html.contains(r#"id="builder-content">null</script>"#));
    }

    #[test]
    fn test_shell_escapes_payload() {
        let html = shell()
            .render(Some(&page("</script><script>alert(1)</script>")), "page")
            .unwrap();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("\\u003c/script\\u003e"));
        assert!(html.contains("<title>&lt;/script&gt;&lt;script&gt;alert(1)&lt;/script&gt;</title>"));
    }
}
