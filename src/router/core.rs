//! Router core module - the (method, path) routing table.

use crate::method::HttpMethod;
use crate::procedure::Procedure;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Routing table mapping `(method, normalized path)` to a registered
/// procedure.
///
/// Lookup is exact string match only: no patterns, no wildcards, and no
/// trailing-slash tolerance beyond the one-time normalization performed at
/// registration. Tables are populated before traffic starts and shared
/// read-only behind an `Arc` afterwards, so the steady-state read path
/// takes no locks.
#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: HashMap<HttpMethod, HashMap<String, Arc<Procedure>>>,
}

impl Router {
    /// Create an empty routing table.
    #[must_use]
    pub fn new() -> Self {
        Router {
            routes: HashMap::new(),
        }
    }

    /// Normalize a route string into its dispatch key.
    ///
    /// Prepends `/` when absent and strips trailing slashes, so that
    /// `add`, `/add` and `/add/` all register the same key. Normalization
    /// is idempotent, and the root path stays `/`.
    #[must_use]
    pub fn normalize_path(route: &str) -> String {
        let mut path = if route.starts_with('/') {
            route.to_string()
        } else {
            format!("/{route}")
        };
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        path
    }

    /// Insert a procedure under `(method, normalize_path(route))`.
    ///
    /// Registering the same pair twice silently replaces the previous
    /// descriptor; the last registration wins.
    pub fn register(&mut self, method: HttpMethod, route: &str, procedure: Procedure) {
        let path = Self::normalize_path(route);
        let by_path = self.routes.entry(method).or_default();

        if let Some(previous) = by_path.get(&path) {
            warn!(
                method = %method,
                path = %path,
                previous_handler = previous.name(),
                new_handler = procedure.name(),
                "Replaced existing route registration"
            );
        } else {
            info!(
                method = %method,
                path = %path,
                handler = procedure.name(),
                required = procedure.signature().required().len(),
                optional = procedure.signature().optional().len(),
                "Route registered"
            );
        }

        by_path.insert(path, Arc::new(procedure));
    }

    /// Exact-match lookup for a request's `(method, path)` pair.
    #[must_use]
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Option<&Arc<Procedure>> {
        self.routes.get(&method).and_then(|by_path| by_path.get(path))
    }

    /// Number of registered routes across all methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.values().all(HashMap::is_empty)
    }

    /// Iterate over every registered route in method order.
    pub fn iter(&self) -> impl Iterator<Item = (HttpMethod, &str, &Arc<Procedure>)> {
        HttpMethod::ALL.iter().flat_map(move |method| {
            self.routes
                .get(method)
                .into_iter()
                .flat_map(move |by_path| {
                    let mut paths: Vec<_> = by_path.iter().collect();
                    paths.sort_by_key(|(path, _)| path.as_str());
                    paths
                        .into_iter()
                        .map(move |(path, procedure)| (*method, path.as_str(), procedure))
                })
        })
    }

    /// Print all registered routes to stdout.
    ///
    /// Useful for verifying the table after startup, the way you would
    /// inspect a framework's route list during development.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.len());
        for (method, path, procedure) in self.iter() {
            println!(
                "[route] {method} {path} -> {} (required={:?} optional={:?})",
                procedure.name(),
                procedure.signature().required(),
                procedure.signature().optional(),
            );
        }
    }

    /// Render the routing table as JSON for programmatic inspection.
    ///
    /// Shape: `{"POST": {"/add": { ...descriptor metadata... }}}`.
    #[must_use]
    pub fn routes_json(&self) -> Value {
        let mut by_method = Map::new();
        for method in HttpMethod::ALL {
            let Some(paths) = self.routes.get(&method) else {
                continue;
            };
            if paths.is_empty() {
                continue;
            }
            let mut entries = Map::new();
            for (path, procedure) in paths {
                entries.insert(path.clone(), procedure.describe());
            }
            by_method.insert(method.to_string(), Value::Object(entries));
        }
        Value::Object(by_method)
    }
}
