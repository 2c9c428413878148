//! Request identifiers for log correlation.

use std::fmt;
use ulid::Ulid;

/// A per-request ULID, minted when a request enters the dispatcher and
/// attached to every log line emitted on its behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        RequestId(Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_display_is_canonical_ulid() {
        let id = RequestId::new();
        assert_eq!(id.to_string().len(), 26);
    }
}
