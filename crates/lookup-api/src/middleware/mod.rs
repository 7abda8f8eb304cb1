//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`cors`]: origin-mirroring CORS with credentials; also answers every
//!   `OPTIONS` request before authentication.

pub mod cors;
pub mod tracing_layer;
