//! The physical-memory capability consumed by arenas.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::RuntimeError;

/// A device runtime that can hand out and reclaim physical buffers.
///
/// Arenas call [`alloc`](Runtime::alloc) at most once, sized to the
/// planned high-water mark, and [`dealloc`](Runtime::dealloc) exactly
/// once at teardown if a buffer was obtained. Implementations own all
/// knowledge of how memory is actually provided.
///
/// Both methods take `&self` so a single runtime can serve many arenas
/// through a shared reference, `Rc`, or `Arc`. Implementations needing
/// mutable state use interior mutability.
pub trait Runtime {
    /// Opaque token identifying a physical buffer.
    type Handle;

    /// Acquire a buffer of `bytes` bytes.
    fn alloc(&self, bytes: usize) -> Result<Self::Handle, RuntimeError>;

    /// Return a buffer previously obtained from [`alloc`](Runtime::alloc).
    fn dealloc(&self, handle: Self::Handle);
}

impl<R: Runtime + ?Sized> Runtime for &R {
    type Handle = R::Handle;

    fn alloc(&self, bytes: usize) -> Result<Self::Handle, RuntimeError> {
        (**self).alloc(bytes)
    }

    fn dealloc(&self, handle: Self::Handle) {
        (**self).dealloc(handle)
    }
}

impl<R: Runtime + ?Sized> Runtime for Rc<R> {
    type Handle = R::Handle;

    fn alloc(&self, bytes: usize) -> Result<Self::Handle, RuntimeError> {
        (**self).alloc(bytes)
    }

    fn dealloc(&self, handle: Self::Handle) {
        (**self).dealloc(handle)
    }
}

impl<R: Runtime + ?Sized> Runtime for Arc<R> {
    type Handle = R::Handle;

    fn alloc(&self, bytes: usize) -> Result<Self::Handle, RuntimeError> {
        (**self).alloc(bytes)
    }

    fn dealloc(&self, handle: Self::Handle) {
        (**self).dealloc(handle)
    }
}
