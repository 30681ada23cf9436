//! Size padding.

/// Round `size` up to the next multiple of `alignment`.
///
/// Computes `((size - 1) / alignment + 1) * alignment`, the smallest
/// multiple of `alignment` that is `>= size`. Returns `None` for a zero
/// `size` (not a meaningful request) or if the result overflows `usize`.
///
/// `alignment` must be non-zero; [`ArenaConfig::validate`] enforces this.
///
/// [`ArenaConfig::validate`]: crate::ArenaConfig::validate
pub fn padded_size(size: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment > 0, "alignment must be non-zero");
    if size == 0 {
        return None;
    }
    ((size - 1) / alignment + 1).checked_mul(alignment)
}
