//! Point-in-time arena diagnostics.

use std::fmt;

/// Snapshot of an arena's accounting counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes currently reserved (sum of live padded sizes).
    pub used: usize,
    /// Maximum value `used` has ever reached.
    pub peak: usize,
    /// End of the highest range ever handed out. The physical buffer is
    /// sized to this.
    pub extent: usize,
    /// Number of blocks in the free-block index.
    pub free_blocks: usize,
    /// Bytes in the free-block index.
    pub free_bytes: usize,
    /// Number of live reservations, if the arena tracks them.
    pub live: Option<usize>,
}

impl ArenaStats {
    /// Fraction of the extent that is free, in `[0, 1]`.
    ///
    /// Zero for an empty arena.
    pub fn fragmentation(&self) -> f64 {
        if self.extent == 0 {
            0.0
        } else {
            self.free_bytes as f64 / self.extent as f64
        }
    }

    /// Bytes the physical buffer holds beyond the peak concurrent demand.
    pub fn overhead(&self) -> usize {
        self.extent.saturating_sub(self.peak)
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used memory: {}, peak memory: {}, extent: {}, free blocks: {} ({} bytes)",
            self.used, self.peak, self.extent, self.free_blocks, self.free_bytes
        )?;
        if let Some(live) = self.live {
            write!(f, ", live: {live}")?;
        }
        Ok(())
    }
}
