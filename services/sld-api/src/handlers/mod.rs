//! HTTP request handlers for the SLD API.
//!
//! - `sld`: Encoding style requests and reading SLD documents
//! - `health`: Health checks and Prometheus metrics

pub mod health;
pub mod sld;

pub use health::{health_handler, metrics_handler};
pub use sld::{encode_handler, parse_handler, ApiError, SLD_CONTENT_TYPE};
