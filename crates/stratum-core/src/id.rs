//! Strongly-typed identifiers and the logical [`Offset`] type.

use std::fmt;
use std::ops::Add;

/// A logical byte offset into an arena's not-yet-materialized buffer.
///
/// Offsets are opaque keys handed out by the arena planner. They only
/// become addresses once the arena is bound to a physical buffer, at
/// which point `base + offset` locates the reservation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset(pub usize);

impl Offset {
    /// The start of the logical address space.
    pub const ZERO: Offset = Offset(0);

    /// The raw byte offset.
    pub fn get(self) -> usize {
        self.0
    }

    /// Offset `bytes` past this one, or `None` on overflow.
    pub fn checked_add(self, bytes: usize) -> Option<Offset> {
        self.0.checked_add(bytes).map(Offset)
    }
}

impl Add<usize> for Offset {
    type Output = Offset;

    fn add(self, bytes: usize) -> Offset {
        Offset(self.0 + bytes)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for Offset {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Identifies a tensor whose buffer is being planned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(pub u32);

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TensorId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an operator in an execution sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u32);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OpId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
