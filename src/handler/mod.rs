//! Request handler module
//!
//! Dispatches HTTP requests onto the CMS page pipeline.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
