//! # Server Module
//!
//! The `may_minihttp` adapter: everything that touches the wire.
//!
//! The dispatcher itself never sees a socket. This module parses raw
//! requests into [`InboundRequest`](crate::dispatcher::InboundRequest)
//! values, writes dispatch outcomes back as HTTP (envelope JSON or file
//! attachments), and wraps the coroutine server with a handle for
//! readiness polling and shutdown.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::{write_envelope, write_file_reply};
pub use service::GatewayService;
