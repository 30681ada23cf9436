//! Registry of live reservations, used to verify releases.

use std::collections::BTreeMap;

use stratum_core::Offset;

use crate::error::ArenaError;

/// Maps each live reservation's offset to its padded length.
#[derive(Clone, Debug, Default)]
pub(crate) struct LiveRegistry {
    entries: BTreeMap<usize, usize>,
}

impl LiveRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, offset: usize, len: usize) {
        let prev = self.entries.insert(offset, len);
        debug_assert!(prev.is_none(), "offset {offset} handed out twice");
    }

    /// Check that `(offset, len)` names a live reservation, without
    /// removing it.
    pub(crate) fn check(&self, offset: usize, len: usize) -> Result<(), ArenaError> {
        match self.entries.get(&offset) {
            None => Err(ArenaError::UnknownOffset {
                offset: Offset(offset),
            }),
            Some(&reserved) if reserved != len => Err(ArenaError::SizeMismatch {
                offset: Offset(offset),
                reserved,
                released: len,
            }),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn remove(&mut self, offset: usize) {
        self.entries.remove(&offset);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&o, &l)| (o, l))
    }
}
