//! Runtime tuning read from the environment at serve time.
//!
//! Two knobs, both optional:
//!
//! - `FNWIRE_STACK_SIZE`: per-coroutine stack size in bytes, decimal or
//!   `0x`-prefixed hex. Default 0x4000 (16 KiB).
//! - `FNWIRE_WORKERS`: OS threads backing the coroutine scheduler.
//!   Default 4.
//!
//! Invalid values are logged and fall back to the default rather than
//! aborting startup.

use tracing::warn;

pub const DEFAULT_STACK_SIZE: usize = 0x4000;
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for each request coroutine, in bytes.
    pub stack_size: usize,
    /// Number of scheduler worker threads.
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl RuntimeConfig {
    /// Read `FNWIRE_STACK_SIZE` and `FNWIRE_WORKERS`, falling back to the
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match std::env::var("FNWIRE_STACK_SIZE") {
            Ok(raw) => match parse_size(&raw) {
                Some(size) => size,
                None => {
                    warn!(
                        value = %raw,
                        default = DEFAULT_STACK_SIZE,
                        "Invalid FNWIRE_STACK_SIZE, using default"
                    );
                    DEFAULT_STACK_SIZE
                }
            },
            Err(_) => DEFAULT_STACK_SIZE,
        };

        let workers = match std::env::var("FNWIRE_WORKERS") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(
                        value = %raw,
                        default = DEFAULT_WORKERS,
                        "Invalid FNWIRE_WORKERS, using default"
                    );
                    DEFAULT_WORKERS
                }
            },
            Err(_) => DEFAULT_WORKERS,
        };

        RuntimeConfig {
            stack_size,
            workers,
        }
    }
}

/// Parse a byte count, accepting `0x` hex or plain decimal. Zero is
/// rejected; a zero-size stack is never what the operator meant.
fn parse_size(raw: &str) -> Option<usize> {
    let trimmed = raw.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        usize::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse::<usize>().ok()
    };
    parsed.filter(|&size| size > 0)
}
