//! Operator and planning error types.

use std::error::Error;
use std::fmt;

use stratum_arena::ArenaError;
use stratum_core::shape::format_dims;
use stratum_core::{DataType, OpId, Shape, TensorId};

/// Errors from shape inference and buffer planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpError {
    /// Wrong number of input or output tensors.
    Arity {
        /// Operator name.
        op: &'static str,
        /// What the tensors are (`"inputs"` or `"outputs"`).
        role: &'static str,
        /// Expected count.
        expected: usize,
        /// Supplied count.
        got: usize,
    },
    /// An input has fewer dimensions than the operator needs.
    RankTooLow {
        /// Operator name.
        op: &'static str,
        /// The input's rank.
        rank: usize,
        /// Minimum rank accepted.
        min: usize,
    },
    /// Batch dimensions cannot be broadcast together.
    IncompatibleBroadcast {
        /// Left-hand batch dims.
        a: Shape,
        /// Right-hand batch dims.
        b: Shape,
    },
    /// The contracted dimensions of a matrix multiply disagree.
    InnerDimMismatch {
        /// `k` taken from A.
        a: usize,
        /// `k` taken from B.
        b: usize,
    },
    /// An input has the wrong element type.
    DataTypeMismatch {
        /// The type the operator requires.
        expected: DataType,
        /// The type supplied.
        got: DataType,
    },
    /// A tensor's byte size overflows `usize`.
    SizeOverflow {
        /// The offending tensor.
        tensor: TensorId,
    },
    /// Two operators produce the same tensor.
    DuplicateProducer {
        /// The tensor produced twice.
        tensor: TensorId,
    },
    /// An operator reads a tensor produced by a later operator.
    UseBeforeDefinition {
        /// The tensor read too early.
        tensor: TensorId,
        /// The reading operator.
        op: OpId,
    },
    /// The arena rejected a reservation or release.
    Arena(ArenaError),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity {
                op,
                role,
                expected,
                got,
            } => write!(f, "{op} expects {expected} {role}, got {got}"),
            Self::RankTooLow { op, rank, min } => {
                write!(f, "{op} needs inputs of rank >= {min}, got rank {rank}")
            }
            Self::IncompatibleBroadcast { a, b } => write!(
                f,
                "cannot broadcast {} with {}",
                format_dims(a),
                format_dims(b)
            ),
            Self::InnerDimMismatch { a, b } => {
                write!(f, "inner dimensions disagree: A has k={a}, B has k={b}")
            }
            Self::DataTypeMismatch { expected, got } => {
                write!(f, "expected element type {expected}, got {got}")
            }
            Self::SizeOverflow { tensor } => write!(f, "tensor {tensor} size overflows"),
            Self::DuplicateProducer { tensor } => {
                write!(f, "tensor {tensor} is produced more than once")
            }
            Self::UseBeforeDefinition { tensor, op } => {
                write!(f, "op {op} reads tensor {tensor} before it is produced")
            }
            Self::Arena(e) => write!(f, "arena: {e}"),
        }
    }
}

impl Error for OpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for OpError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
