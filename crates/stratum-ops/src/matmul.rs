//! Batched matrix multiply.
//!
//! `C = op(A) × op(B)` where `op` optionally transposes the last two
//! dimensions. Leading (batch) dimensions broadcast numpy-style, so
//! `[2, 1, m, k] × [3, k, n]` yields `[2, 3, m, n]`.

use stratum_core::shape::broadcast;
use stratum_core::{DataType, Shape};

use crate::error::OpError;
use crate::tensor::TensorDesc;

/// Matrix multiply with optional transposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatMul {
    /// Transpose the last two dimensions of A.
    pub trans_a: bool,
    /// Transpose the last two dimensions of B.
    pub trans_b: bool,
}

/// Problem size of a matrix multiply: `C[m, n] = A[m, k] × B[k, n]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mnk {
    /// Rows of C.
    pub m: usize,
    /// Columns of C.
    pub n: usize,
    /// Contracted dimension.
    pub k: usize,
}

impl MatMul {
    /// Create a matrix multiply.
    pub fn new(trans_a: bool, trans_b: bool) -> Self {
        Self { trans_a, trans_b }
    }

    /// Extract `m`, `n`, `k` from the inputs, checking that both inner
    /// dimensions agree.
    pub fn mnk(&self, a: &TensorDesc, b: &TensorDesc) -> Result<Mnk, OpError> {
        for t in [a, b] {
            if t.rank() < 2 {
                return Err(OpError::RankTooLow {
                    op: "Matmul",
                    rank: t.rank(),
                    min: 2,
                });
            }
        }
        let (a_rows, a_cols) = last_two(&a.dims);
        let (b_rows, b_cols) = last_two(&b.dims);

        let (m, k_a) = if self.trans_a {
            (a_cols, a_rows)
        } else {
            (a_rows, a_cols)
        };
        let (k_b, n) = if self.trans_b {
            (b_cols, b_rows)
        } else {
            (b_rows, b_cols)
        };
        if k_a != k_b {
            return Err(OpError::InnerDimMismatch { a: k_a, b: k_b });
        }
        Ok(Mnk { m, n, k: k_a })
    }

    /// Output shape `[..broadcast(batch_a, batch_b), m, n]` and the shared
    /// element type.
    pub fn infer(&self, a: &TensorDesc, b: &TensorDesc) -> Result<(Shape, DataType), OpError> {
        let Mnk { m, n, .. } = self.mnk(a, b)?;
        if a.dtype != b.dtype {
            return Err(OpError::DataTypeMismatch {
                expected: a.dtype,
                got: b.dtype,
            });
        }

        let batch_a = &a.dims[..a.rank() - 2];
        let batch_b = &b.dims[..b.rank() - 2];
        let mut dims =
            broadcast(batch_a, batch_b).ok_or_else(|| OpError::IncompatibleBroadcast {
                a: Shape::from_slice(batch_a),
                b: Shape::from_slice(batch_b),
            })?;
        dims.push(m);
        dims.push(n);
        Ok((dims, a.dtype))
    }
}

fn last_two(dims: &[usize]) -> (usize, usize) {
    let r = dims.len();
    (dims[r - 2], dims[r - 1])
}
