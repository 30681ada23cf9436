//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for an arena planner.
///
/// Fixed at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Padding unit in bytes. Every reservation is rounded up to a
    /// multiple of this value, so every offset is one too.
    ///
    /// Default: 8 (`size_of::<u64>()`, the widest supported element type).
    /// Must be non-zero.
    pub alignment: usize,

    /// Whether the planner records the size of each live reservation and
    /// rejects releases that do not match one.
    ///
    /// Default: `true`. With `false` the planner trusts the caller's
    /// `(offset, size)` pair, and a wrong size silently corrupts the
    /// free-block index.
    pub verify_releases: bool,
}

impl ArenaConfig {
    /// Default alignment: the size of the widest element type.
    pub const DEFAULT_ALIGNMENT: usize = std::mem::size_of::<u64>();

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            alignment: Self::DEFAULT_ALIGNMENT,
            verify_releases: true,
        }
    }

    /// Override the alignment.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Enable or disable release verification.
    pub fn with_verify_releases(mut self, verify: bool) -> Self {
        self.verify_releases = verify;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.alignment == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "alignment must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
