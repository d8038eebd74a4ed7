//! HTTP protocol layer module
//!
//! Response builders and cache helpers, independent of how a page was
//! resolved.

pub mod cache;
pub mod response;

pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_502_response, build_health_response, build_options_response, build_page_response,
};
