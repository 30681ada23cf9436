//! Tensor shapes and broadcasting.

use smallvec::SmallVec;
use std::fmt::Write as _;

/// Dimensions of a tensor, outermost first.
///
/// Uses `SmallVec<[usize; 4]>` to avoid heap allocation for tensors of
/// rank 4 or lower, which covers typical NCHW activations.
pub type Shape = SmallVec<[usize; 4]>;

/// Number of elements in a tensor of the given dimensions.
///
/// A rank-0 tensor holds one element. Returns `None` on overflow.
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Multidirectional (numpy-style) broadcast of two shapes.
///
/// Shapes are aligned at their trailing dimension. Each aligned pair must
/// be equal or contain a 1; the result takes the larger extent. Returns
/// `None` if the shapes are incompatible.
pub fn broadcast(a: &[usize], b: &[usize]) -> Option<Shape> {
    let rank = a.len().max(b.len());
    let mut out: Shape = SmallVec::with_capacity(rank);
    for i in 0..rank {
        // Walk from the outermost result dimension; missing leading dims are 1.
        let da = dim_from_back(a, rank - 1 - i);
        let db = dim_from_back(b, rank - 1 - i);
        let d = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => return None,
        };
        out.push(d);
    }
    Some(out)
}

fn dim_from_back(dims: &[usize], back: usize) -> usize {
    if back < dims.len() {
        dims[dims.len() - 1 - back]
    } else {
        1
    }
}

/// Render dimensions as `[d0,d1,...]`.
pub fn format_dims(dims: &[usize]) -> String {
    let mut s = String::with_capacity(2 + dims.len() * 3);
    s.push('[');
    for (i, d) in dims.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        let _ = write!(s, "{d}");
    }
    s.push(']');
    s
}
