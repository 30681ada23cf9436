//! Core types and traits for the Stratum buffer planner.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the rest of the workspace: strongly-typed
//! IDs, tensor shapes, the data-type table, and the [`Runtime`] capability
//! through which an arena acquires its one physical buffer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dtype;
pub mod error;
pub mod id;
pub mod runtime;
pub mod shape;

pub use dtype::DataType;
pub use error::RuntimeError;
pub use id::{Offset, OpId, TensorId};
pub use runtime::Runtime;
pub use shape::Shape;
