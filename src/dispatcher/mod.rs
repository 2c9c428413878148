//! # Dispatcher Module
//!
//! The per-request pipeline: validate, look up, parse, bind, invoke, shape.
//!
//! ## Overview
//!
//! The dispatcher is the request-handler entry point. For each inbound
//! request it walks a fixed state machine:
//!
//! 1. Method check - anything outside {GET, POST, PUT, PATCH} is a 405
//! 2. Content-type check - body methods must declare `application/json` (415)
//! 3. Route lookup - exact match against the routing table (404)
//! 4. Field extraction - JSON body for POST/PUT/PATCH, query string for GET (400)
//! 5. Binding - named fields to positional arguments (400)
//! 6. Invocation - a direct, blocking call on the request worker
//! 7. Response shaping - the JSON [`Envelope`], or a raw file attachment
//!
//! Each step is terminal on failure and every failure becomes an envelope;
//! handler panics are contained at this boundary and degrade to a 500.
//!
//! The dispatcher is deliberately server-agnostic: it consumes an
//! [`InboundRequest`] and produces a [`DispatchOutcome`], leaving the wire
//! format to the server adapter. Tests drive it directly without a socket.

mod core;

pub use core::{query_fields, DispatchOutcome, Dispatcher, Envelope, InboundRequest};
