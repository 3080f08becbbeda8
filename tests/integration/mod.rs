//! Integration tests
//!
//! HTTP endpoints through the router, and the realtime layer through the
//! hub and presence registry.

mod api;
mod realtime;
