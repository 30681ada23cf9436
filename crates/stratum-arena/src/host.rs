//! Host-memory [`Runtime`] implementation.
//!
//! [`HostRuntime`] backs each physical buffer with a zero-initialised
//! `Vec<u8>`. It is the runtime to use when planning for the CPU, and a
//! convenient stand-in for a device runtime in examples.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use stratum_core::{Runtime, RuntimeError};

/// Handle to a buffer owned by a [`HostRuntime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostHandle(u64);

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host#{}", self.0)
    }
}

/// One allocated buffer. `data` is `None` while lent out to a
/// `with_buffer` closure.
struct Slot {
    len: usize,
    data: Option<Vec<u8>>,
}

struct HostState {
    next_id: u64,
    buffers: HashMap<HostHandle, Slot>,
    bytes_in_use: usize,
}

/// A buffer taken out of its slot for the duration of a closure. The lock
/// is not held meanwhile; dropping the loan puts the bytes back, unless
/// the handle was deallocated in between.
struct Loan<'a> {
    runtime: &'a HostRuntime,
    handle: HostHandle,
    data: Vec<u8>,
}

impl Drop for Loan<'_> {
    fn drop(&mut self) {
        let mut state = self.runtime.lock();
        if let Some(slot) = state.buffers.get_mut(&self.handle) {
            slot.data = Some(std::mem::take(&mut self.data));
        }
    }
}

/// Runtime that allocates buffers on the host heap.
///
/// An optional capacity bounds the total bytes held at once; requests
/// beyond it fail with [`RuntimeError::OutOfMemory`], mimicking a device
/// with a fixed memory pool.
pub struct HostRuntime {
    capacity: Option<usize>,
    state: Mutex<HostState>,
}

impl HostRuntime {
    /// Create an unbounded host runtime.
    pub fn new() -> Self {
        Self {
            capacity: None,
            state: Mutex::new(HostState {
                next_id: 1,
                buffers: HashMap::new(),
                bytes_in_use: 0,
            }),
        }
    }

    /// Create a host runtime that holds at most `bytes` bytes at once.
    pub fn with_capacity_limit(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::new()
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        // Buffer bookkeeping stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a buffer out of its slot without holding the lock past return.
    fn lend(&self, handle: HostHandle) -> Option<Loan<'_>> {
        let data = self.lock().buffers.get_mut(&handle)?.data.take()?;
        Some(Loan {
            runtime: self,
            handle,
            data,
        })
    }

    /// Run `f` over the bytes of a live buffer.
    ///
    /// The runtime is not locked while `f` runs, so `f` may call back into
    /// it (allocate, deallocate, query lengths). Returns `None` if `handle`
    /// does not name a live buffer, or if the same buffer is already being
    /// accessed by an enclosing call.
    pub fn with_buffer<T>(&self, handle: HostHandle, f: impl FnOnce(&[u8]) -> T) -> Option<T> {
        let loan = self.lend(handle)?;
        Some(f(&loan.data))
    }

    /// Run `f` over the bytes of a live buffer, mutably.
    ///
    /// Same re-entrancy rules as [`with_buffer`](Self::with_buffer).
    pub fn with_buffer_mut<T>(
        &self,
        handle: HostHandle,
        f: impl FnOnce(&mut [u8]) -> T,
    ) -> Option<T> {
        let mut loan = self.lend(handle)?;
        Some(f(&mut loan.data))
    }

    /// Length of a live buffer in bytes, including one currently lent out.
    pub fn buffer_len(&self, handle: HostHandle) -> Option<usize> {
        self.lock().buffers.get(&handle).map(|slot| slot.len)
    }

    /// Number of buffers currently held.
    pub fn live_buffers(&self) -> usize {
        self.lock().buffers.len()
    }

    /// Total bytes currently held.
    pub fn bytes_in_use(&self) -> usize {
        self.lock().bytes_in_use
    }

    /// The capacity limit, if any.
    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity
    }
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for HostRuntime {
    type Handle = HostHandle;

    fn alloc(&self, bytes: usize) -> Result<HostHandle, RuntimeError> {
        let mut state = self.lock();
        if let Some(cap) = self.capacity {
            let available = cap.saturating_sub(state.bytes_in_use);
            if bytes > available {
                return Err(RuntimeError::OutOfMemory {
                    requested: bytes,
                    available: Some(available),
                });
            }
        }
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| RuntimeError::OutOfMemory {
                requested: bytes,
                available: None,
            })?;
        data.resize(bytes, 0);

        let handle = HostHandle(state.next_id);
        state.next_id += 1;
        state.bytes_in_use += bytes;
        state.buffers.insert(
            handle,
            Slot {
                len: bytes,
                data: Some(data),
            },
        );
        Ok(handle)
    }

    fn dealloc(&self, handle: HostHandle) {
        let mut state = self.lock();
        if let Some(slot) = state.buffers.remove(&handle) {
            state.bytes_in_use -= slot.len;
        }
    }
}
