//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use stratum_core::{Offset, RuntimeError};

/// Errors that can occur during arena operations.
///
/// Everything except [`Runtime`](ArenaError::Runtime) and
/// [`AddressSpaceExhausted`](ArenaError::AddressSpaceExhausted) is a
/// caller bug: the arena state is left untouched and the call can be
/// corrected, but retrying it unchanged will fail the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// `reserve()` or `release()` after the layout was bound to a
    /// physical buffer.
    AlreadyBound,
    /// A zero-byte reservation or release.
    ZeroSize,
    /// Released an offset that has no live reservation.
    UnknownOffset {
        /// The offending offset.
        offset: Offset,
    },
    /// Released a live offset with a size that pads differently from the
    /// size it was reserved with.
    SizeMismatch {
        /// The offset being released.
        offset: Offset,
        /// Padded size recorded at reservation.
        reserved: usize,
        /// Padded size supplied to release.
        released: usize,
    },
    /// Released a range that extends past the planned extent.
    OutOfRange {
        /// Start of the released range.
        offset: Offset,
        /// Padded length of the released range.
        len: usize,
        /// Current logical extent of the arena.
        extent: usize,
    },
    /// Padding or bumping the logical address space overflowed `usize`.
    AddressSpaceExhausted {
        /// Number of bytes requested.
        requested: usize,
    },
    /// Configuration failed validation.
    InvalidConfig {
        /// Which invariant was violated.
        reason: String,
    },
    /// The runtime could not provide the physical buffer.
    Runtime(RuntimeError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound => {
                write!(f, "arena layout is frozen: physical buffer already bound")
            }
            Self::ZeroSize => write!(f, "zero-byte reservations are not supported"),
            Self::UnknownOffset { offset } => {
                write!(f, "no live reservation at offset {offset}")
            }
            Self::SizeMismatch {
                offset,
                reserved,
                released,
            } => {
                write!(
                    f,
                    "size mismatch at offset {offset}: reserved {reserved} bytes, released {released} bytes"
                )
            }
            Self::OutOfRange {
                offset,
                len,
                extent,
            } => {
                write!(
                    f,
                    "range {offset}+{len} extends past arena extent {extent}"
                )
            }
            Self::AddressSpaceExhausted { requested } => {
                write!(f, "logical address space exhausted: requested {requested} bytes")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::Runtime(e) => write!(f, "runtime allocation failed: {e}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RuntimeError> for ArenaError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_is_exposed_as_source() {
        let err = ArenaError::from(RuntimeError::OutOfMemory {
            requested: 64,
            available: None,
        });
        assert!(err.source().is_some());
        assert!(ArenaError::AlreadyBound.source().is_none());
    }

    #[test]
    fn size_mismatch_message_names_both_sizes() {
        let err = ArenaError::SizeMismatch {
            offset: Offset(16),
            reserved: 24,
            released: 8,
        };
        assert_eq!(
            err.to_string(),
            "size mismatch at offset 0x10: reserved 24 bytes, released 8 bytes"
        );
    }
}
