// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::cms::{CmsClient, ContentRenderer, PathResolver, ShellRenderer};

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: PathResolver,
    pub renderer: ContentRenderer,
}

impl AppState {
    pub fn new(config: &Config, resolver: PathResolver, renderer: ContentRenderer) -> Self {
        Self {
            config: config.clone(),
            resolver,
            renderer,
        }
    }

    /// Wire one CMS client into both the resolver and the page renderer
    pub fn with_client(config: &Config, client: &Arc<CmsClient>) -> Self {
        let resolver = PathResolver::new(client.clone(), config.cms.model.clone());
        let renderer = ContentRenderer::new(Arc::new(ShellRenderer::new(Arc::clone(client))));
        Self::new(config, resolver, renderer)
    }
}
