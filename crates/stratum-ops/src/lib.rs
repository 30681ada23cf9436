//! Tensor bookkeeping that feeds the arena planner.
//!
//! Operators infer the shape and data type of their outputs from their
//! inputs; [`BufferPlan`] then walks an operator sequence and asks a
//! [`Planner`](stratum_arena::Planner) for one buffer per tensor,
//! releasing each buffer after its last reader so later tensors can reuse
//! the space.
//!
//! Supported operators:
//!
//! - [`MatMul`]: batched matrix multiply with optional transposes and
//!   broadcast batch dimensions.
//! - [`Unary`] and [`Clip`]: elementwise, shape-preserving.
//! - [`Cast`]: shape-preserving data-type conversion.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cast;
pub mod error;
pub mod matmul;
pub mod op;
pub mod plan;
pub mod tensor;
pub mod unary;

pub use cast::{Cast, CastType};
pub use error::OpError;
pub use matmul::MatMul;
pub use op::{OpKind, Operator};
pub use plan::{BufferPlan, Placement};
pub use tensor::TensorDesc;
pub use unary::{Clip, Unary, UnaryKind};
