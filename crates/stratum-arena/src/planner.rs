//! Offset planning: first-fit reservation and coalescing release.
//!
//! [`Planner`] is the bookkeeping half of an arena. It knows nothing about
//! physical memory; it only hands out aligned, non-overlapping logical
//! offsets and takes them back. [`Arena`](crate::Arena) wraps a planner
//! together with a runtime and the bind-once lifecycle.

use stratum_core::Offset;
use tracing::{trace, warn};

use crate::align::padded_size;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::free_list::FreeBlockIndex;
use crate::live::LiveRegistry;
use crate::stats::ArenaStats;

/// Logical address-space planner.
///
/// # Accounting
///
/// - `used` is the sum of live padded sizes.
/// - `peak` is the maximum `used` has reached.
/// - `extent` is the end of the highest range ever handed out.
///
/// `used + free_bytes == extent` holds after every operation: each byte
/// below the extent is either live or in the free-block index.
///
/// `peak` and `extent` differ only when fragmentation forced a bump past
/// a hole that was too small. The physical buffer must cover `extent`.
#[derive(Clone, Debug)]
pub struct Planner {
    alignment: usize,
    free: FreeBlockIndex,
    /// Present iff `verify_releases` is on.
    live: Option<LiveRegistry>,
    used: usize,
    peak: usize,
    extent: usize,
}

impl Planner {
    /// Create an empty planner.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if the config fails
    /// validation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            alignment: config.alignment,
            free: FreeBlockIndex::new(),
            live: config.verify_releases.then(LiveRegistry::new),
            used: 0,
            peak: 0,
            extent: 0,
        })
    }

    /// Reserve `size` bytes and return the offset of the reservation.
    ///
    /// The size is padded to a multiple of the alignment. The offset is
    /// the start of the lowest-addressed free block that can hold the
    /// padded size (splitting off any remainder), or the current extent
    /// if no free block fits.
    pub fn reserve(&mut self, size: usize) -> Result<Offset, ArenaError> {
        let len = self.padded(size)?;

        let start = match self.free.first_fit(len) {
            Some(start) => start,
            None => {
                let start = self.extent;
                self.extent = start
                    .checked_add(len)
                    .ok_or(ArenaError::AddressSpaceExhausted { requested: size })?;
                trace!(offset = start, len, extent = self.extent, "bump reservation");
                start
            }
        };

        self.used += len;
        self.peak = self.peak.max(self.used);
        if let Some(live) = &mut self.live {
            live.insert(start, len);
        }
        Ok(Offset(start))
    }

    /// Release a reservation made by [`reserve`](Self::reserve).
    ///
    /// `size` is padded the same way as on reserve. The freed range is
    /// merged with any adjacent free blocks.
    ///
    /// With release verification on, an offset without a live reservation
    /// or a size that pads differently is rejected and nothing changes.
    /// With it off, only ranges past the extent are rejected.
    pub fn release(&mut self, offset: Offset, size: usize) -> Result<(), ArenaError> {
        let len = self.padded(size)?;
        let start = offset.get();

        let checked = match &self.live {
            Some(live) => live.check(start, len),
            None => self.check_in_range(start, len),
        };
        if let Err(e) = checked {
            warn!(%offset, size, error = %e, "release rejected");
            return Err(e);
        }

        let merged = self.free.insert_coalesced(start, len);
        self.used -= merged.reclaimed();
        if let Some(live) = &mut self.live {
            live.remove(start);
        }
        trace!(
            %offset,
            len,
            block_start = merged.start,
            block_len = merged.len,
            "released"
        );
        Ok(())
    }

    /// Padded size for a request of `size` bytes.
    pub fn padded(&self, size: usize) -> Result<usize, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        padded_size(size, self.alignment)
            .ok_or(ArenaError::AddressSpaceExhausted { requested: size })
    }

    fn check_in_range(&self, start: usize, len: usize) -> Result<(), ArenaError> {
        match start.checked_add(len) {
            Some(end) if end <= self.extent => Ok(()),
            _ => Err(ArenaError::OutOfRange {
                offset: Offset(start),
                len,
                extent: self.extent,
            }),
        }
    }

    /// The padding unit in bytes.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes currently reserved.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Maximum bytes ever reserved at once.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// End of the highest range ever handed out.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Whether releases are checked against recorded reservations.
    pub fn verifies_releases(&self) -> bool {
        self.live.is_some()
    }

    /// The free-block index.
    pub fn free_list(&self) -> &FreeBlockIndex {
        &self.free
    }

    /// Iterate over free blocks as `(offset, len)` in ascending order.
    pub fn free_blocks(&self) -> impl Iterator<Item = (Offset, usize)> + '_ {
        self.free.iter().map(|(s, l)| (Offset(s), l))
    }

    /// Iterate over live reservations as `(offset, padded len)` in
    /// ascending order.
    ///
    /// Returns `None` when release verification is off, since the planner
    /// then keeps no record of individual reservations.
    pub fn live_reservations(&self) -> Option<impl Iterator<Item = (Offset, usize)> + '_> {
        self.live
            .as_ref()
            .map(|live| live.iter().map(|(o, l)| (Offset(o), l)))
    }

    /// Current accounting counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            used: self.used,
            peak: self.peak,
            extent: self.extent,
            free_blocks: self.free.len(),
            free_bytes: self.free.free_bytes(),
            live: self.live.as_ref().map(LiveRegistry::len),
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            alignment: ArenaConfig::DEFAULT_ALIGNMENT,
            free: FreeBlockIndex::new(),
            live: Some(LiveRegistry::new()),
            used: 0,
            peak: 0,
            extent: 0,
        }
    }
}
