//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first, as a request sees it)
//!
//! 1. Sentry layers (added by the binary only, not by [`crate::app`])
//! 2. `TraceLayer` (request span, status and latency)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Request ID (records the id on the request span, echoes the header)

pub mod request_id;
pub mod session;

pub use request_id::request_id_middleware;
pub use session::create_session_layer;
