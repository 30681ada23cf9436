//! Errors reported by a [`Runtime`](crate::Runtime).

use std::error::Error;
use std::fmt;

/// Failure of a runtime to provide physical memory.
///
/// This is the only resource-exhaustion error in the workspace: arenas
/// plan in an unbounded logical space and defer every capacity limit to
/// the single `alloc` call made at materialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime could not satisfy an allocation of `requested` bytes.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes still available, if the runtime knows.
        available: Option<usize>,
    },
    /// The underlying device reported a failure unrelated to capacity.
    Device {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                write!(f, "out of memory: requested {requested} bytes")?;
                if let Some(avail) = available {
                    write!(f, ", {avail} bytes available")?;
                }
                Ok(())
            }
            Self::Device { reason } => write!(f, "device error: {reason}"),
        }
    }
}

impl Error for RuntimeError {}
