//! Content service client
//!
//! The content service is an external collaborator: it owns the page schema
//! and storage. This module only knows how to ask it for the entry targeted
//! at a URL path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::CmsError;
use crate::config::CmsConfig;

/// Opaque content entry returned by the content service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(serde_json::Value);

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl Content {
    /// Human readable title: `data.title`, falling back to the entry name
    pub fn title(&self) -> Option<&str> {
        self.0
            .pointer("/data/title")
            .and_then(serde_json::Value::as_str)
            .or_else(|| self.0.get("name").and_then(serde_json::Value::as_str))
    }
}

/// What to fetch: a content model, targeted by URL path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub model: String,
    pub url_path: String,
}

/// Source of page content
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the entry matching `query`, `None` when nothing matches
    async fn get(&self, query: &ContentQuery) -> Result<Option<Content>, CmsError>;
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    results: Vec<Content>,
}

/// HTTP client for the content API.
///
/// Built once at startup from [`CmsConfig`] and shared by the resolver and the
/// renderer.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    api_key: String,
    api_host: Url,
    script_url: String,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CmsError::MissingApiKey)?
            .to_string();

        let api_host = Url::parse(&config.api_host).map_err(|e| CmsError::InvalidBaseUrl {
            url: config.api_host.clone(),
            reason: e.to_string(),
        })?;
        if api_host.cannot_be_a_base() {
            return Err(CmsError::InvalidBaseUrl {
                url: config.api_host.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("cms-pages/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key,
            api_host,
            script_url: config.script_url.clone(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    /// `{api_host}/api/v3/content/{model}`
    fn content_url(&self, model: &str) -> Url {
        let mut url = self.api_host.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v3", "content", model]);
        }
        url
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn get(&self, query: &ContentQuery) -> Result<Option<Content>, CmsError> {
        let response = self
            .http
            .get(self.content_url(&query.model))
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("userAttributes.urlPath", query.url_path.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ContentResponse = response.json().await?;
        // A null entry means nothing is published for the path
        Ok(body.results.into_iter().find(|content| !content.0.is_null()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::{Bytes, Incoming};
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use tokio::sync::mpsc;

    fn cms_config(api_key: Option<&str>, api_host: &str) -> CmsConfig {
        CmsConfig {
            api_key: api_key.map(ToString::to_string),
            api_host: api_host.to_string(),
            model: "page".to_string(),
            script_url: "https://cdn.example.com/js/webcomponents".to_string(),
        }
    }

    /// Serve a fixed response on an ephemeral port, reporting each request URI
    async fn spawn_content_server(
        status: u16,
        body: &'static str,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let tx = tx.clone();
                        async move {
                            let _ = tx.send(req.uri().to_string());
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from(body)))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        (format!("http://{addr}"), rx)
    }

    fn query(url_path: &str) -> ContentQuery {
        ContentQuery {
            model: "page".to_string(),
            url_path: url_path.to_string(),
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = CmsClient::new(&cms_config(None, "https://cdn.builder.io")).unwrap_err();
        assert!(matches!(err, CmsError::MissingApiKey));

        let err = CmsClient::new(&cms_config(Some("   "), "https://cdn.builder.io")).unwrap_err();
        assert!(matches!(err, CmsError::MissingApiKey));
    }

    #[test]
    fn test_invalid_api_host_is_rejected() {
        let err = CmsClient::new(&cms_config(Some("key"), "not a url")).unwrap_err();
        assert!(matches!(err, CmsError::InvalidBaseUrl { .. }));

        let err = CmsClient::new(&cms_config(Some("key"), "mailto:cms@example.com")).unwrap_err();
        assert!(matches!(err, CmsError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_content_url() {
        let client = CmsClient::new(&cms_config(Some("key"), "https://cdn.builder.io")).unwrap();
        assert_eq!(
            client.content_url("page").as_str(),
            "https://cdn.builder.io/api/v3/content/page"
        );

        let client = CmsClient::new(&cms_config(Some("key"), "http://localhost:4000/cms/")).unwrap();
        assert_eq!(
            client.content_url("landing").as_str(),
            "http://localhost:4000/cms/api/v3/content/landing"
        );
    }

    #[test]
    fn test_content_title() {
        let content = Content::from(serde_json::json!({
            "name": "About page",
            "data": { "title": "About us" }
        }));
        assert_eq!(content.title(), Some("About us"));

        let content = Content::from(serde_json::json!({ "name": "About page" }));
        assert_eq!(content.title(), Some("About page"));

        let content = Content::from(serde_json::json!({ "data": {} }));
        assert_eq!(content.title(), None);
    }

    #[tokio::test]
    async fn test_get_returns_first_result() {
        let (host, mut requests) = spawn_content_server(
            200,
            r#"{"results":[{"id":"abc","name":"About"},{"id":"def","name":"Other"}]}"#,
        )
        .await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();

        let content = client.get(&query("/about")).await.unwrap().unwrap();
        assert_eq!(content.0["id"], "abc");

        let uri = requests.recv().await.unwrap();
        let url = Url::parse(&format!("http://localhost{uri}")).unwrap();
        assert_eq!(url.path(), "/api/v3/content/page");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("apiKey".to_string(), "test-key".to_string())));
        assert!(pairs.contains(&("userAttributes.urlPath".to_string(), "/about".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_get_empty_results_is_none() {
        let (host, _requests) = spawn_content_server(200, r#"{"results":[]}"#).await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();
        assert!(client.get(&query("/missing")).await.unwrap().is_none());

        let (host, _requests) = spawn_content_server(200, "{}").await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();
        assert!(client.get(&query("/")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_null_result_is_none() {
        let (host, _requests) = spawn_content_server(200, r#"{"results":[null]}"#).await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();
        assert!(client.get(&query("/about")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_error_status_is_error() {
        let (host, _requests) = spawn_content_server(500, r#"{"message":"boom"}"#).await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();
        let err = client.get(&query("/about")).await.unwrap_err();
        assert!(matches!(err, CmsError::Http(_)));
    }

    #[tokio::test]
    async fn test_get_malformed_body_is_error() {
        let (host, _requests) = spawn_content_server(200, "not json").await;
        let client = CmsClient::new(&cms_config(Some("test-key"), &host)).unwrap();
        assert!(client.get(&query("/about")).await.is_err());
    }
}
