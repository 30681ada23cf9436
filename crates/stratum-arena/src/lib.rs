//! Arena planning for tensor buffers.
//!
//! An arena hands out aligned logical offsets inside a buffer that does
//! not exist yet, reclaims them with eager coalescing, and finally binds
//! the whole layout to exactly one physical buffer obtained from a
//! [`Runtime`](stratum_core::Runtime).
//!
//! # Architecture
//!
//! ```text
//! Arena<R: Runtime> (lifecycle: Planning → Bound)
//! ├── Planner (pure bookkeeping, no runtime)
//! │   ├── FreeBlockIndex (BTreeMap start → len, first-fit + coalesce)
//! │   ├── LiveRegistry (offset → padded len, optional release checking)
//! │   └── used / peak / extent counters
//! └── Phase::Bound(R::Handle) (one physical buffer, sized to extent)
//! ```
//!
//! # Lifecycle
//!
//! 1. `reserve()` / `release()` while planning. Offsets come from the
//!    lowest-addressed free block that fits, or from bumping the extent.
//! 2. `materialize()` once the plan is final. The runtime is contacted
//!    once; later calls return the cached handle.
//! 3. Drop returns the buffer to the runtime.
//!
//! After step 2 the layout is frozen and `reserve()` / `release()` fail
//! with [`ArenaError::AlreadyBound`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod align;
pub mod arena;
pub mod config;
pub mod error;
pub mod free_list;
pub mod host;
mod live;
pub mod planner;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use free_list::FreeBlockIndex;
pub use host::{HostHandle, HostRuntime};
pub use planner::Planner;
pub use stats::ArenaStats;
