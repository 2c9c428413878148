//! Parameter contracts derived once at registration time.
//!
//! A [`Signature`] captures what the request binder needs to know about a
//! procedure: its parameter names in declaration order and which trailing
//! parameters carry default values. Required parameters always precede
//! optional ones, mirroring how defaulted parameters sit at the end of a
//! function signature.
//!
//! Contracts are normally produced by the `#[procedure]` attribute macro at
//! compile time. [`SignatureBuilder`] is the explicit escape hatch for
//! procedures assembled at runtime (closures, generated handlers); it
//! enforces the same ordering rules with typed errors instead of compile
//! errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Ordered parameter contract for one procedure.
///
/// Invariants held by construction: `all` is `required` followed by
/// `optional`, and `defaults` has exactly one entry per optional name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    all: Vec<String>,
    required: Vec<String>,
    optional: Vec<String>,
    defaults: HashMap<String, Value>,
}

impl Signature {
    /// Start building a contract parameter by parameter.
    #[must_use]
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// Contract with no parameters at all.
    #[must_use]
    pub fn empty() -> Self {
        Signature {
            all: Vec::new(),
            required: Vec::new(),
            optional: Vec::new(),
            defaults: HashMap::new(),
        }
    }

    /// Assemble a contract from a full name list and the defaults map.
    ///
    /// The defaulted names must form a suffix of `all`; the `#[procedure]`
    /// macro guarantees this before emitting a call, which is why this
    /// constructor is infallible.
    #[doc(hidden)]
    #[must_use]
    pub fn from_parts(all: Vec<String>, defaults: HashMap<String, Value>) -> Self {
        debug_assert!(defaults.len() <= all.len());
        let required_count = all.len().saturating_sub(defaults.len());
        debug_assert!(all[required_count..]
            .iter()
            .all(|name| defaults.contains_key(name)));
        let required = all[..required_count].to_vec();
        let optional = all[required_count..].to_vec();
        Signature {
            all,
            required,
            optional,
            defaults,
        }
    }

    /// Parameter names in declaration order.
    #[must_use]
    pub fn all(&self) -> &[String] {
        &self.all
    }

    /// Names without a default, in declaration order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Names with a default, in declaration order.
    #[must_use]
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// Default values keyed by optional parameter name.
    #[must_use]
    pub fn defaults(&self) -> &HashMap<String, Value> {
        &self.defaults
    }

    /// Total parameter count.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.all.len()
    }
}

/// Why an explicitly built contract was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("duplicate parameter `{0}`")]
    DuplicateParameter(String),
    #[error("required parameter `{0}` follows a parameter with a default")]
    RequiredAfterOptional(String),
}

/// Builds a [`Signature`] one parameter at a time, preserving call order.
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<(String, Option<Value>)>,
}

impl SignatureBuilder {
    /// Append a required parameter.
    #[must_use]
    pub fn param(mut self, name: &str) -> Self {
        self.params.push((name.to_string(), None));
        self
    }

    /// Append an optional parameter with its default value.
    #[must_use]
    pub fn param_with_default(mut self, name: &str, default: Value) -> Self {
        self.params.push((name.to_string(), Some(default)));
        self
    }

    /// Validate ordering and produce the contract.
    pub fn build(self) -> Result<Signature, SignatureError> {
        let mut all = Vec::with_capacity(self.params.len());
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut defaults = HashMap::new();
        let mut seen_default = false;

        for (name, default) in self.params {
            if all.contains(&name) {
                return Err(SignatureError::DuplicateParameter(name));
            }
            match default {
                Some(value) => {
                    seen_default = true;
                    optional.push(name.clone());
                    defaults.insert(name.clone(), value);
                }
                None => {
                    if seen_default {
                        return Err(SignatureError::RequiredAfterOptional(name));
                    }
                    required.push(name.clone());
                }
            }
            all.push(name);
        }

        Ok(Signature {
            all,
            required,
            optional,
            defaults,
        })
    }
}
