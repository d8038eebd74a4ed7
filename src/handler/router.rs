//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health probes,
//! then page resolution for every other path.

use crate::cms::{RenderOutcome, RouteParams};
use crate::config::AppState;
use crate::http::{self, cache, CachePolicy};
use crate::logger::{self, AccessLogEntry, PageOutcome};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for page serving
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Page resolution details recorded in the access log
struct PageLog {
    lookup_key: String,
    outcome: PageOutcome,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (mut response, page) = dispatch(&req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(hyper::header::SERVER, server);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.referer = header_string(req.headers(), "referer");
        entry.user_agent = header_string(req.headers(), "user-agent");
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        if let Some(page) = page {
            entry.lookup_key = Some(page.lookup_key);
            entry.outcome = Some(page.outcome);
        }
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(
    req: &Request<B>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Option<PageLog>) {
    let method = req.method();
    let is_head = *method == Method::HEAD;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return (resp, None);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return (resp, None);
    }

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let path = req.uri().path();

    // 3. Health check endpoints
    let health = &state.config.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return (http::build_health_response("ok", is_head), None);
    }

    // 4. Everything else is a CMS page
    let ctx = RequestContext {
        path,
        query: req.uri().query(),
        is_head,
        if_none_match: header_string(req.headers(), "if-none-match"),
    };
    let (response, page) = serve_page(&ctx, state).await;
    (response, Some(page))
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Resolve the request path to content and render it, or answer 404
async fn serve_page(ctx: &RequestContext<'_>, state: &AppState) -> (Response<Full<Bytes>>, PageLog) {
    let params = RouteParams::from_path(ctx.path);

    let resolved = match state.resolver.resolve(&params).await {
        Ok(resolved) => resolved,
        Err(e) => {
            let lookup_key = params.lookup_key();
            logger::log_fetch_failed(&lookup_key, &e);
            return (
                http::build_502_response(ctx.is_head),
                PageLog {
                    lookup_key,
                    outcome: PageOutcome::Error,
                },
            );
        }
    };
    logger::log_content_resolved(&resolved.lookup_key, resolved.content.is_some());

    let rendered = state
        .renderer
        .render(resolved.content.as_ref(), state.resolver.model(), ctx.query);

    match rendered {
        Ok(RenderOutcome::NotFound) => (
            http::build_404_response(ctx.is_head),
            PageLog {
                lookup_key: resolved.lookup_key,
                outcome: PageOutcome::NotFound,
            },
        ),
        Ok(RenderOutcome::Page { html, previewing }) => {
            let outcome = if resolved.content.is_some() {
                PageOutcome::Content
            } else {
                PageOutcome::Preview
            };
            let policy = CachePolicy::for_page(previewing, state.config.http.page_max_age);
            let etag = cache::generate_etag(html.as_bytes());

            let response = if policy.is_revalidatable()
                && cache::check_etag_match(ctx.if_none_match.as_deref(), &etag)
            {
                http::build_304_response(&etag, policy)
            } else {
                http::build_page_response(html, &etag, policy, ctx.is_head)
            };

            (
                response,
                PageLog {
                    lookup_key: resolved.lookup_key,
                    outcome,
                },
            )
        }
        Err(e) => {
            logger::log_fetch_failed(&resolved.lookup_key, &e);
            (
                http::build_502_response(ctx.is_head),
                PageLog {
                    lookup_key: resolved.lookup_key,
                    outcome: PageOutcome::Error,
                },
            )
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
