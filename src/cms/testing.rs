//! In-memory content source and renderer used by unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::render::PageRenderer;
use super::{CmsError, Content, ContentQuery, ContentSource};

/// Content source backed by a map of lookup key to entry
#[derive(Default)]
pub struct StaticSource {
    pages: HashMap<String, Content>,
    failing: bool,
    queries: Mutex<Vec<ContentQuery>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every fetch fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url_path: &str, name: &str) -> Self {
        self.pages.insert(
            url_path.to_string(),
            Content::from(serde_json::json!({
                "id": format!("id-{name}"),
                "name": name,
                "data": { "title": name, "url": url_path }
            })),
        );
        self
    }

    pub fn queries(&self) -> Vec<ContentQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn get(&self, query: &ContentQuery) -> Result<Option<Content>, CmsError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing {
            let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            return Err(CmsError::Payload(err));
        }
        Ok(self.pages.get(&query.url_path).cloned())
    }
}

/// Renderer that records its inputs and emits a marker document
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<(Option<Content>, String)>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<(Option<Content>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageRenderer for RecordingRenderer {
    fn render(&self, content: Option<&Content>, model: &str) -> Result<String, CmsError> {
        self.calls
            .lock()
            .unwrap()
            .push((content.cloned(), model.to_string()));
        let title = content.and_then(Content::title).unwrap_or("none");
        Ok(format!("<cms model=\"{model}\">{title}</cms>"))
    }
}
