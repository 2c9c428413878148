//! Binds named request fields to positional procedure arguments.

use crate::signature::Signature;
use serde_json::{Map, Value};

/// A request that cannot be bound to the procedure's contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A required parameter is absent from the parsed fields. The name is
    /// the first missing one in declaration order; later parameters are not
    /// checked.
    #[error("Missing required parameter '{name}'")]
    MissingParameter { name: String },
}

/// Map named fields onto the contract's positional argument list.
///
/// Required parameters are checked in declaration order and must all be
/// present. Optional parameters take the field value when supplied and fall
/// back to their declared default otherwise. Values pass through untouched;
/// nothing here inspects or coerces them.
pub fn bind(fields: &Map<String, Value>, signature: &Signature) -> Result<Vec<Value>, BindError> {
    let mut args = Vec::with_capacity(signature.arity());

    for name in signature.required() {
        match fields.get(name) {
            Some(value) => args.push(value.clone()),
            None => {
                return Err(BindError::MissingParameter { name: name.clone() });
            }
        }
    }

    for name in signature.optional() {
        match fields.get(name) {
            Some(value) => args.push(value.clone()),
            None => {
                // Every optional name has a default by construction.
                let default = signature.defaults().get(name).cloned().unwrap_or(Value::Null);
                args.push(default);
            }
        }
    }

    Ok(args)
}
