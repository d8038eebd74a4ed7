//! Path resolver
//!
//! Maps route parameters to a lookup key and asks the content source for the
//! entry targeted at it. One fetch per call; nothing is cached or retried.

use std::sync::Arc;

use super::{CmsError, Content, ContentQuery, ContentSource, RouteParams};

/// Result of resolving a request path
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub lookup_key: String,
    pub content: Option<Content>,
}

pub struct PathResolver {
    source: Arc<dyn ContentSource>,
    model: String,
}

impl PathResolver {
    pub fn new(source: Arc<dyn ContentSource>, model: impl Into<String>) -> Self {
        Self {
            source,
            model: model.into(),
        }
    }

    /// Content model every lookup is issued against
    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn resolve(&self, params: &RouteParams) -> Result<Resolved, CmsError> {
        let lookup_key = params.lookup_key();
        let query = ContentQuery {
            model: self.model.clone(),
            url_path: lookup_key.clone(),
        };

        let content = self.source.get(&query).await?;
        Ok(Resolved {
            lookup_key,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::StaticSource;

    #[tokio::test]
    async fn test_resolve_about() {
        let source = Arc::new(StaticSource::new().with_page("/about", "About"));
        let resolver = PathResolver::new(source.clone(), "page");

        let resolved = resolver
            .resolve(&RouteParams::new(Some(vec!["about".to_string()])))
            .await
            .unwrap();

        assert_eq!(resolved.lookup_key, "/about");
        assert_eq!(resolved.content.unwrap().title(), Some("About"));
        assert_eq!(
            source.queries(),
            vec![ContentQuery {
                model: "page".to_string(),
                url_path: "/about".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_resolve_root_without_params() {
        let source = Arc::new(StaticSource::new());
        let resolver = PathResolver::new(source.clone(), "page");

        let resolved = resolver.resolve(&RouteParams::default()).await.unwrap();

        assert_eq!(resolved.lookup_key, "/");
        assert!(resolved.content.is_none());
        assert_eq!(source.queries()[0].url_path, "/");
    }

    #[tokio::test]
    async fn test_resolve_issues_one_fetch_per_call() {
        let source = Arc::new(StaticSource::new());
        let resolver = PathResolver::new(source.clone(), "landing");
        let params = RouteParams::from_path("/x/y");

        resolver.resolve(&params).await.unwrap();
        resolver.resolve(&params).await.unwrap();

        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.model == "landing" && q.url_path == "/x/y"));
    }

    #[tokio::test]
    async fn test_resolve_propagates_fetch_errors() {
        let resolver = PathResolver::new(Arc::new(StaticSource::failing()), "page");
        let result = resolver.resolve(&RouteParams::from_path("/about")).await;
        assert!(result.is_err());
    }
}
