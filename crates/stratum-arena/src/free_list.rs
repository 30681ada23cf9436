//! Address-ordered free-block index with first-fit search and coalescing.
//!
//! [`FreeBlockIndex`] maps block start → block length for every unused
//! range below the arena's extent. Blocks never overlap, and no two blocks
//! touch: [`FreeBlockIndex::insert_coalesced`] merges a released range with
//! its neighbours before inserting it, so coalescing is eager.

use std::collections::BTreeMap;

/// Result of inserting a range into the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coalesced {
    /// Start of the merged free block.
    pub start: usize,
    /// Length of the merged free block.
    pub len: usize,
    /// Bytes in the merged block that were already free before the insert.
    ///
    /// `len - absorbed` is the number of bytes newly returned to the free
    /// pool, which is what the planner subtracts from `used`.
    pub absorbed: usize,
}

impl Coalesced {
    /// Bytes newly made free by this insert.
    pub fn reclaimed(&self) -> usize {
        self.len - self.absorbed
    }
}

/// Ordered index of free blocks, keyed by start offset.
#[derive(Clone, Debug, Default)]
pub struct FreeBlockIndex {
    blocks: BTreeMap<usize, usize>,
    /// Sum of all block lengths.
    free_bytes: usize,
}

impl FreeBlockIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `len` bytes from the lowest-addressed block that can hold them.
    ///
    /// Returns the start of the taken range. The chosen block is removed;
    /// if it was larger than `len`, the tail is re-inserted as a new block
    /// starting right after the taken range. Returns `None` if no block is
    /// large enough.
    pub fn first_fit(&mut self, len: usize) -> Option<usize> {
        let (start, block_len) = self
            .blocks
            .iter()
            .find(|&(_, &block_len)| block_len >= len)
            .map(|(&s, &l)| (s, l))?;

        self.blocks.remove(&start);
        let leftover = block_len - len;
        if leftover > 0 {
            self.blocks.insert(start + len, leftover);
        }
        self.free_bytes -= len;
        Some(start)
    }

    /// Insert `[start, start + len)` as free, merging with every block it
    /// touches or overlaps.
    ///
    /// Merges right first (absorbing each block whose start lies at or
    /// before the growing tail), then left (absorbing the preceding block
    /// if it reaches the candidate's start). The merged range is inserted
    /// as a single block.
    pub fn insert_coalesced(&mut self, start: usize, len: usize) -> Coalesced {
        let mut head = start;
        let mut tail = start + len;
        let mut absorbed = 0usize;

        // Merge right.
        while let Some((&s, &l)) = self.blocks.range(head..).next() {
            if s > tail {
                break;
            }
            self.blocks.remove(&s);
            tail = tail.max(s + l);
            absorbed += l;
        }

        // Merge left.
        if let Some((&s, &l)) = self.blocks.range(..head).next_back() {
            if s + l >= head {
                self.blocks.remove(&s);
                tail = tail.max(s + l);
                head = s;
                absorbed += l;
            }
        }

        let merged = tail - head;
        self.blocks.insert(head, merged);
        self.free_bytes = self.free_bytes - absorbed + merged;

        Coalesced {
            start: head,
            len: merged,
            absorbed,
        }
    }

    /// Whether `[start, start + len)` intersects any free block.
    pub fn overlaps(&self, start: usize, len: usize) -> bool {
        let end = start + len;
        if let Some((&s, &l)) = self.blocks.range(..end).next_back() {
            return s + l > start;
        }
        false
    }

    /// Iterate over `(start, len)` pairs in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.blocks.iter().map(|(&s, &l)| (s, l))
    }

    /// Length of the block starting exactly at `start`, if any.
    pub fn get(&self, start: usize) -> Option<usize> {
        self.blocks.get(&start).copied()
    }

    /// Number of free blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no free blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total free bytes across all blocks.
    pub fn free_bytes(&self) -> usize {
        self.free_bytes
    }

    /// Length of the largest single block, or 0 if empty.
    pub fn largest_block(&self) -> usize {
        self.blocks.values().copied().max().unwrap_or(0)
    }

    /// Check that blocks are non-empty, disjoint and non-adjacent, and that
    /// the cached byte total is accurate.
    pub fn invariants_hold(&self) -> bool {
        let mut prev_end: Option<usize> = None;
        let mut total = 0usize;
        for (&s, &l) in &self.blocks {
            if l == 0 {
                return false;
            }
            if let Some(end) = prev_end {
                if s <= end {
                    return false;
                }
            }
            prev_end = Some(s + l);
            total += l;
        }
        total == self.free_bytes
    }
}
