//! Test utilities and mock types for Stratum development.
//!
//! Provides [`MockRuntime`], a [`Runtime`] that records every call so tests
//! can assert how often (and with what sizes) an arena contacted it, and
//! [`FailingRuntime`], which rejects every allocation.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use stratum_core::{Runtime, RuntimeError};

/// Handle issued by [`MockRuntime`]: a sequence number plus the size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockHandle {
    pub id: usize,
    pub bytes: usize,
}

/// Call-counting runtime with an optional capacity.
///
/// Counters are atomics so the runtime can be shared by reference or
/// through `Arc` across arenas in the same test.
pub struct MockRuntime {
    capacity: Option<usize>,
    alloc_calls: AtomicUsize,
    dealloc_calls: AtomicUsize,
    sizes: Mutex<Vec<usize>>,
    outstanding: Mutex<Vec<MockHandle>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            capacity: None,
            alloc_calls: AtomicUsize::new(0),
            dealloc_calls: AtomicUsize::new(0),
            sizes: Mutex::new(Vec::new()),
            outstanding: Mutex::new(Vec::new()),
        }
    }

    /// A runtime that refuses any single allocation larger than `bytes`.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::new()
        }
    }

    /// Number of `alloc` calls, successful or not.
    pub fn alloc_calls(&self) -> usize {
        self.alloc_calls.load(Ordering::Relaxed)
    }

    /// Number of `dealloc` calls.
    pub fn dealloc_calls(&self) -> usize {
        self.dealloc_calls.load(Ordering::Relaxed)
    }

    /// Sizes passed to `alloc`, in call order.
    pub fn alloc_sizes(&self) -> Vec<usize> {
        self.sizes.lock().unwrap().clone()
    }

    /// Size passed to the most recent `alloc`.
    pub fn last_alloc_size(&self) -> Option<usize> {
        self.sizes.lock().unwrap().last().copied()
    }

    /// Handles issued and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().unwrap().len()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for MockRuntime {
    type Handle = MockHandle;

    fn alloc(&self, bytes: usize) -> Result<MockHandle, RuntimeError> {
        let id = self.alloc_calls.fetch_add(1, Ordering::Relaxed);
        self.sizes.lock().unwrap().push(bytes);
        if let Some(cap) = self.capacity {
            if bytes > cap {
                return Err(RuntimeError::OutOfMemory {
                    requested: bytes,
                    available: Some(cap),
                });
            }
        }
        let handle = MockHandle { id, bytes };
        self.outstanding.lock().unwrap().push(handle);
        Ok(handle)
    }

    fn dealloc(&self, handle: MockHandle) {
        self.dealloc_calls.fetch_add(1, Ordering::Relaxed);
        let mut outstanding = self.outstanding.lock().unwrap();
        let pos = outstanding
            .iter()
            .position(|h| *h == handle)
            .unwrap_or_else(|| panic!("dealloc of unknown or already freed handle {handle:?}"));
        outstanding.swap_remove(pos);
    }
}

/// Runtime whose every allocation fails with a device error.
pub struct FailingRuntime {
    pub reason: String,
}

impl FailingRuntime {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Runtime for FailingRuntime {
    type Handle = ();

    fn alloc(&self, _bytes: usize) -> Result<(), RuntimeError> {
        Err(RuntimeError::Device {
            reason: self.reason.clone(),
        })
    }

    fn dealloc(&self, _handle: ()) {
        panic!("FailingRuntime never issues handles");
    }
}
