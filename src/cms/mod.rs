//! CMS integration module
//!
//! Turns a request path into externally managed page content and decides how
//! that content is rendered:
//! - `lookup`: route segments and the lookup key derived from them
//! - `client`: the content service boundary (`ContentSource`) and its HTTP client
//! - `resolver`: path resolution, one awaited fetch per request
//! - `preview`: live-preview detection from the request query
//! - `render`: the content-or-404 decision and the page shell renderer

pub mod client;
mod error;
pub mod lookup;
pub mod preview;
pub mod render;
pub mod resolver;

#[cfg(test)]
pub mod testing;

pub use client::{CmsClient, Content, ContentQuery, ContentSource};
pub use error::CmsError;
pub use lookup::RouteParams;
pub use render::{ContentRenderer, RenderOutcome, ShellRenderer};
pub use resolver::PathResolver;
