use thiserror::Error;

/// Errors raised at the CMS boundary
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS API key is not configured (set cms.api_key or BUILDER_API_KEY)")]
    MissingApiKey,
    #[error("Invalid CMS API host '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Content request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed content payload: {0}")]
    Payload(#[from] serde_json::Error),
}
