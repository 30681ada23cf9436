//! Stratum: virtual-address-space arena planning for tensor buffers.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Stratum sub-crates. For most users, adding `stratum` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stratum::prelude::*;
//!
//! // Plan a relu → relu chain over a [4, 8] f32 input.
//! let x = TensorDesc::new(0, &[4, 8], DataType::Float32);
//! let a = Operator::new(0, Unary::new(UnaryKind::Relu), &[x], &[TensorId(1)]).unwrap();
//! let b = Operator::new(1, Unary::new(UnaryKind::Relu), &[a.output().clone()], &[TensorId(2)])
//!     .unwrap();
//!
//! let mut planner = Planner::new(ArenaConfig::default()).unwrap();
//! let plan = BufferPlan::build(&[a, b], &mut planner).unwrap();
//! assert_eq!(plan.offset(TensorId(2)), Some(Offset(256)));
//!
//! // Bind the finished layout to one host buffer.
//! let runtime = HostRuntime::new();
//! let mut arena = Arena::from_planner(&runtime, planner);
//! let handle = *arena.materialize().unwrap();
//! assert_eq!(runtime.buffer_len(handle), Some(384));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stratum-core` | IDs, offsets, shapes, data types, the `Runtime` trait |
//! | [`arena`] | `stratum-arena` | `Planner`, `Arena`, free-block index, `HostRuntime` |
//! | [`ops`] | `stratum-ops` | Tensor descriptors, operators, buffer planning |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`stratum-core`).
///
/// Contains [`types::Offset`], [`types::DataType`], shape helpers, and the
/// [`types::Runtime`] trait an arena binds through.
pub use stratum_core as types;

/// The arena allocator (`stratum-arena`).
///
/// [`arena::Planner`] does the bookkeeping; [`arena::Arena`] adds the
/// one-time physical binding.
pub use stratum_arena as arena;

/// Operators and buffer planning (`stratum-ops`).
///
/// Build [`ops::Operator`]s from tensor descriptors, then lay their
/// tensors out with [`ops::BufferPlan`].
pub use stratum_ops as ops;

/// Common imports for typical Stratum usage.
///
/// ```rust
/// use stratum::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use stratum_core::{DataType, Offset, OpId, Runtime, RuntimeError, Shape, TensorId};

    // Arena
    pub use stratum_arena::{
        Arena, ArenaConfig, ArenaError, ArenaStats, HostHandle, HostRuntime, Planner,
    };

    // Operators
    pub use stratum_ops::{
        BufferPlan, Cast, CastType, Clip, MatMul, OpError, OpKind, Operator, Placement,
        TensorDesc, Unary, UnaryKind,
    };
}
