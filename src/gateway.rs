//! The application object that owns a routing table and serves it.
//!
//! A [`Gateway`] is constructed, populated with procedures, and then
//! consumed by [`Gateway::serve`], which moves the routing table behind an
//! `Arc` into the request workers. That consumption is what enforces the
//! registration-before-traffic discipline: once the server is running there
//! is no handle left to mutate the table through, so the read path needs no
//! locking. Independent gateways are just independent values; tests can run
//! as many as they like side by side.

use crate::dispatcher::Dispatcher;
use crate::method::HttpMethod;
use crate::procedure::Procedure;
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::server::{GatewayService, HttpServer, ServerHandle};
use serde_json::Value;
use std::io;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::info;

/// Registration surface plus server bootstrap.
#[derive(Debug, Default)]
pub struct Gateway {
    router: Router,
}

impl Gateway {
    #[must_use]
    pub fn new() -> Self {
        Gateway {
            router: Router::new(),
        }
    }

    /// Register a procedure under its own name at `POST /<name>`.
    pub fn register(&mut self, procedure: Procedure) {
        let route = procedure.name().to_string();
        self.register_at(procedure, &route, HttpMethod::Post);
    }

    /// Register a procedure under an explicit route and method.
    ///
    /// The route is normalized (`search`, `/search` and `/search/` are the
    /// same key); registering an occupied `(method, route)` pair replaces
    /// the previous procedure.
    pub fn register_at(&mut self, procedure: Procedure, route: &str, method: HttpMethod) {
        self.router.register(method, route, procedure);
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Print the registered routes to stdout.
    pub fn dump_routes(&self) {
        self.router.dump_routes();
    }

    /// The routing table as JSON, for programmatic inspection.
    #[must_use]
    pub fn routes_json(&self) -> Value {
        self.router.routes_json()
    }

    /// Seal the table and hand back a dispatcher, without a server.
    ///
    /// This is the serve path minus the socket; tests use it to drive the
    /// full pipeline in-process.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(Arc::new(self.router))
    }

    /// Seal the table and serve it on `addr`.
    ///
    /// Applies the environment runtime configuration (coroutine stack size,
    /// worker count) before the listener starts. Returns once the listener
    /// is spawned; call [`ServerHandle::join`] to block on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be
    /// bound.
    pub fn serve<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let config = RuntimeConfig::from_env();
        may::config()
            .set_stack_size(config.stack_size)
            .set_workers(config.workers);

        let route_count = self.router.len();
        let dispatcher = self.into_dispatcher();
        let service = GatewayService::new(dispatcher);
        let handle = HttpServer(service).start(addr)?;

        info!(
            addr = %handle.addr(),
            routes = route_count,
            workers = config.workers,
            "Running development server at http://{}",
            handle.addr()
        );
        Ok(handle)
    }
}
