use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of HTTP methods a procedure can be registered under.
///
/// Anything outside this set is answered with `405 Method Not Allowed`
/// before routing is even attempted, so the rest of the crate never has to
/// reason about open-ended method strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    /// All supported methods, in a fixed order used by route dumps.
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a JSON body.
    ///
    /// GET requests take their fields from the query string instead and skip
    /// the content-type check entirely.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method string outside the supported set. Maps to the 405 response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}
