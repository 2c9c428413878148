//! # Router Module
//!
//! Maintains the routing table that maps `(HTTP method, normalized path)`
//! pairs to registered procedures.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Normalizing route strings once, at registration time
//! - Exact-match resolution of incoming `(method, path)` pairs
//! - Replace-on-reregister semantics (last registration wins)
//! - Route table dumps for startup diagnostics
//!
//! Path templates and wildcards are deliberately out of scope: a route is a
//! literal path, and anything that does not match literally is a 404.

mod core;

pub use core::Router;
