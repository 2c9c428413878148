//! fnwire exposes ordinary Rust functions as HTTP-invokable remote
//! procedures.
//!
//! ## Overview
//!
//! A function is described by a [`Signature`] (its parameter names, in
//! declaration order, plus default values for the optional tail), wrapped
//! in a [`Procedure`], and registered on a [`Gateway`] under an HTTP method
//! and path. At request time the dispatcher parses the JSON body (or the
//! query string for `GET`), binds the named fields to positional arguments,
//! and calls the function directly on the serving coroutine. The return
//! value travels back inside a uniform JSON envelope:
//!
//! ```json
//! {"exit_code": 0, "status_code": 200, "result": 3, "error": ""}
//! ```
//!
//! Handlers that produce a [`FileReply`] bypass the envelope and are sent
//! as a download attachment instead.
//!
//! Most users write handlers with the `#[procedure]` attribute from the
//! companion `fnwire_macros` crate, which derives the signature from the
//! function definition itself. The builder API below is the macro-free
//! equivalent.
//!
//! ## Quick start
//!
//! ```rust
//! use fnwire::{DispatchOutcome, Gateway, InboundRequest, IntoReply, Procedure, Signature};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), fnwire::SignatureError> {
//! let signature = Signature::builder()
//!     .param("a")
//!     .param_with_default("b", json!(2))
//!     .build()?;
//!
//! let add = Procedure::new("add", signature, |args| {
//!     let a = args[0].as_i64().unwrap_or(0);
//!     let b = args[1].as_i64().unwrap_or(0);
//!     (a + b).into_reply()
//! });
//!
//! let mut gateway = Gateway::new();
//! gateway.register(add);
//!
//! // In production: gateway.serve("127.0.0.1:8080")?. For a taste of the
//! // pipeline without a socket, dispatch in-process:
//! let dispatcher = gateway.into_dispatcher();
//! let outcome = dispatcher.dispatch(InboundRequest::json("POST", "/add", &json!({"a": 1})));
//! match outcome {
//!     DispatchOutcome::Envelope(envelope) => assert_eq!(envelope.result, json!(3)),
//!     DispatchOutcome::File(_) => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`method`]: the supported HTTP method set
//! - [`signature`]: call-contract types and the builder
//! - [`binder`]: named fields to positional arguments
//! - [`procedure`]: registered callables, replies, handler errors
//! - [`router`]: the exact-match routing table
//! - [`dispatcher`]: the request pipeline and response envelope
//! - [`server`]: the `may_minihttp` front end
//! - [`gateway`]: registration surface and server bootstrap
//! - [`runtime_config`]: coroutine tuning from the environment
//! - [`ids`]: request identifiers for log correlation
//!
//! ## Runtime
//!
//! The server runs on [may](https://docs.rs/may) stackful coroutines via
//! `may_minihttp`. Handlers are invoked synchronously on the serving
//! coroutine, so they should avoid blocking syscalls that would stall a
//! scheduler thread. Stack size and worker count are tunable through
//! `FNWIRE_STACK_SIZE` and `FNWIRE_WORKERS`.

pub mod binder;
pub mod dispatcher;
pub mod gateway;
pub mod ids;
pub mod method;
pub mod procedure;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod signature;

pub use binder::{bind, BindError};
pub use dispatcher::{DispatchOutcome, Dispatcher, Envelope, InboundRequest};
pub use gateway::Gateway;
pub use ids::RequestId;
pub use method::{HttpMethod, UnsupportedMethod};
pub use procedure::{FileReply, HandlerError, HandlerResult, IntoReply, Procedure, Reply};
pub use router::Router;
pub use runtime_config::RuntimeConfig;
pub use server::ServerHandle;
pub use signature::{Signature, SignatureBuilder, SignatureError};
