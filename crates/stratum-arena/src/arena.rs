//! Bind-once arena: a planner plus one lazily acquired physical buffer.
//!
//! [`Arena`] has two phases:
//!
//! - **Planning:** `reserve()` / `release()` mutate the layout. No
//!   physical memory exists.
//! - **Bound:** `materialize()` has obtained a buffer of `extent` bytes
//!   from the runtime. The layout is frozen; offsets handed out during
//!   planning are now valid positions inside that buffer.
//!
//! The transition happens once. Dropping a bound arena returns the buffer
//! to the runtime.

use stratum_core::{Offset, Runtime};
use tracing::{debug, info};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::planner::Planner;
use crate::stats::ArenaStats;

/// Lifecycle state of an [`Arena`].
enum Phase<H> {
    /// Offsets only; the layout is mutable.
    Planning,
    /// One physical buffer; the layout is frozen.
    Bound(H),
}

/// Arena planner bound to a [`Runtime`].
///
/// Not internally synchronised: all mutation goes through `&mut self`.
/// Distinct arenas share no state, so concurrent planning uses one arena
/// per thread.
///
/// # Example
///
/// ```
/// use stratum_arena::{Arena, ArenaConfig, HostRuntime};
///
/// let runtime = HostRuntime::new();
/// let mut arena = Arena::new(&runtime, ArenaConfig::default()).unwrap();
/// let a = arena.reserve(10).unwrap();
/// let b = arena.reserve(20).unwrap();
/// arena.release(a, 10).unwrap();
/// assert_eq!(arena.reserve(10).unwrap(), a);
///
/// let handle = *arena.materialize().unwrap();
/// assert_eq!(runtime.buffer_len(handle), Some(40));
/// # let _ = b;
/// ```
#[must_use]
pub struct Arena<R: Runtime> {
    runtime: R,
    planner: Planner,
    phase: Phase<R::Handle>,
}

impl<R: Runtime> Arena<R> {
    /// Create an arena in the planning phase.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if the config fails
    /// validation. The runtime is not contacted.
    pub fn new(runtime: R, config: ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            runtime,
            planner: Planner::new(config)?,
            phase: Phase::Planning,
        })
    }

    /// Wrap an existing planner, e.g. one built up by a planning pass that
    /// had no runtime at hand.
    pub fn from_planner(runtime: R, planner: Planner) -> Self {
        Self {
            runtime,
            planner,
            phase: Phase::Planning,
        }
    }

    /// Reserve `size` bytes. See [`Planner::reserve`].
    ///
    /// Fails with [`ArenaError::AlreadyBound`] after materialization.
    pub fn reserve(&mut self, size: usize) -> Result<Offset, ArenaError> {
        self.planning_mut()?.reserve(size)
    }

    /// Release a reservation. See [`Planner::release`].
    ///
    /// Fails with [`ArenaError::AlreadyBound`] after materialization.
    pub fn release(&mut self, offset: Offset, size: usize) -> Result<(), ArenaError> {
        self.planning_mut()?.release(offset, size)
    }

    /// Bind the layout to a physical buffer and return its handle.
    ///
    /// The first call asks the runtime for `extent` bytes and caches the
    /// handle; later calls return the cached handle without contacting
    /// the runtime. If the runtime fails, the error is returned and the
    /// arena stays in the planning phase.
    pub fn materialize(&mut self) -> Result<&R::Handle, ArenaError> {
        if let Phase::Planning = self.phase {
            let bytes = self.planner.extent();
            let handle = self.runtime.alloc(bytes)?;
            debug!(
                bytes,
                peak = self.planner.peak(),
                used = self.planner.used(),
                "arena materialized"
            );
            self.phase = Phase::Bound(handle);
        }
        match &self.phase {
            Phase::Bound(handle) => Ok(handle),
            Phase::Planning => unreachable!("phase set to Bound above"),
        }
    }

    /// The physical handle, if materialized.
    pub fn handle(&self) -> Option<&R::Handle> {
        match &self.phase {
            Phase::Bound(handle) => Some(handle),
            Phase::Planning => None,
        }
    }

    /// Whether the layout has been bound to a physical buffer.
    pub fn is_bound(&self) -> bool {
        matches!(self.phase, Phase::Bound(_))
    }

    /// Current accounting counters. Available in both phases.
    pub fn stats(&self) -> ArenaStats {
        self.planner.stats()
    }

    /// Emit the current counters as an `info` event.
    pub fn log_stats(&self) {
        let stats = self.planner.stats();
        info!(
            used = stats.used,
            peak = stats.peak,
            extent = stats.extent,
            free_blocks = stats.free_blocks,
            bound = self.is_bound(),
            "{stats}"
        );
    }

    /// Read-only access to the planner.
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// The runtime this arena binds against.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    fn planning_mut(&mut self) -> Result<&mut Planner, ArenaError> {
        match self.phase {
            Phase::Planning => Ok(&mut self.planner),
            Phase::Bound(_) => Err(ArenaError::AlreadyBound),
        }
    }
}

impl<R: Runtime> Drop for Arena<R> {
    fn drop(&mut self) {
        if let Phase::Bound(handle) = std::mem::replace(&mut self.phase, Phase::Planning) {
            debug!(bytes = self.planner.extent(), "arena released");
            self.runtime.dealloc(handle);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Arena<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("bound", &self.is_bound())
            .field("stats", &self.planner.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostRuntime;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use stratum_core::RuntimeError;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use stratum_test_utils::{FailingRuntime, MockRuntime};

    fn arena(rt: &MockRuntime) -> Arena<&MockRuntime> {
        Arena::new(rt, ArenaConfig::default()).unwrap()
    }

    #[test]
    fn materialize_is_idempotent() {
        let rt = MockRuntime::new();
        let mut a = arena(&rt);
        a.reserve(10).unwrap();
        let h1 = *a.materialize().unwrap();
        let h2 = *a.materialize().unwrap();
        assert_eq!(h1, h2);
        assert_eq!(rt.alloc_calls(), 1);
        assert_eq!(rt.last_alloc_size(), Some(16));
    }

    #[test]
    fn runtime_not_contacted_before_materialize() {
        let rt = MockRuntime::new();
        let mut a = arena(&rt);
        let off = a.reserve(64).unwrap();
        a.release(off, 64).unwrap();
        assert_eq!(rt.alloc_calls(), 0);
        assert!(a.handle().is_none());
        assert!(!a.is_bound());
    }

    #[test]
    fn buffer_sized_to_high_water_mark_not_total() {
        let rt = MockRuntime::new();
        let mut a = arena(&rt);
        for _ in 0..10 {
            let off = a.reserve(64).unwrap();
            a.release(off, 64).unwrap();
        }
        a.materialize().unwrap();
        assert_eq!(rt.last_alloc_size(), Some(64));
    }

    #[test]
    fn layout_is_frozen_after_materialize() {
        let rt = MockRuntime::new();
        let mut a = arena(&rt);
        let off = a.reserve(8).unwrap();
        a.materialize().unwrap();
        assert_eq!(a.reserve(8), Err(ArenaError::AlreadyBound));
        assert_eq!(a.release(off, 8), Err(ArenaError::AlreadyBound));
        // Stats survive binding.
        assert_eq!(a.stats().used, 8);
    }

    #[test]
    fn runtime_failure_leaves_arena_planning() {
        let rt = MockRuntime::with_capacity(32);
        let mut a = arena(&rt);
        let off = a.reserve(64).unwrap();
        let err = a.materialize().unwrap_err();
        assert_eq!(
            err,
            ArenaError::Runtime(RuntimeError::OutOfMemory {
                requested: 64,
                available: Some(32),
            })
        );
        assert!(!a.is_bound());
        // Still plannable: shrink and retry.
        a.release(off, 64).unwrap();
        a.reserve(16).unwrap();
        assert_eq!(a.stats().extent, 64);
    }

    #[test]
    fn device_error_is_wrapped_and_source_preserved() {
        let mut a = Arena::new(FailingRuntime::new("no device"), ArenaConfig::default()).unwrap();
        a.reserve(8).unwrap();
        let err = a.materialize().unwrap_err();
        assert_eq!(err.to_string(), "runtime allocation failed: device error: no device");
        assert!(std::error::Error::source(&err).is_some());
        assert!(a.handle().is_none());
    }

    #[test]
    fn drop_deallocates_exactly_once_when_bound() {
        let rt = MockRuntime::new();
        {
            let mut a = arena(&rt);
            a.reserve(8).unwrap();
            a.materialize().unwrap();
            a.materialize().unwrap();
        }
        assert_eq!(rt.alloc_calls(), 1);
        assert_eq!(rt.dealloc_calls(), 1);
        assert_eq!(rt.outstanding(), 0);
    }

    #[test]
    fn drop_without_materialize_never_deallocates() {
        let rt = MockRuntime::new();
        {
            let mut a = arena(&rt);
            a.reserve(8).unwrap();
        }
        assert_eq!(rt.dealloc_calls(), 0);
    }

    #[test]
    fn from_planner_keeps_layout() {
        let mut planner = Planner::default();
        planner.reserve(24).unwrap();
        let rt = MockRuntime::new();
        let mut a = Arena::from_planner(&rt, planner);
        assert_eq!(a.reserve(8).unwrap(), Offset(24));
        a.materialize().unwrap();
        assert_eq!(rt.last_alloc_size(), Some(32));
    }

    #[test]
    fn invalid_config_is_rejected_without_runtime_calls() {
        let rt = MockRuntime::new();
        let result = Arena::new(&rt, ArenaConfig::new().with_alignment(0));
        assert!(matches!(result, Err(ArenaError::InvalidConfig { .. })));
        assert_eq!(rt.alloc_calls(), 0);
    }

    #[test]
    fn arena_is_send_with_a_shared_host_runtime() {
        fn assert_send<T: Send>() {}
        assert_send::<Arena<Arc<HostRuntime>>>();
        assert_send::<Arena<&'static HostRuntime>>();
        assert_send::<Arena<&'static MockRuntime>>();
    }

    #[test]
    fn arena_moves_across_threads() {
        let rt = Arc::new(HostRuntime::new());
        let mut a = Arena::new(Arc::clone(&rt), ArenaConfig::default()).unwrap();
        a.reserve(12).unwrap();
        let len = std::thread::spawn(move || {
            let h = *a.materialize().unwrap();
            a.runtime().buffer_len(h)
        })
        .join()
        .unwrap();
        assert_eq!(len, Some(16));
        // The arena was dropped on the worker thread.
        assert_eq!(rt.live_buffers(), 0);
    }

    // ── log_stats ───────────────────────────────────────────────────

    /// Records the fields of every `info` event.
    #[derive(Clone, Default)]
    struct InfoEvents(Arc<Mutex<Vec<BTreeMap<String, String>>>>);

    struct Fields<'a>(&'a mut BTreeMap<String, String>);

    impl Visit for Fields<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for InfoEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::INFO {
                return;
            }
            let mut fields = BTreeMap::new();
            event.record(&mut Fields(&mut fields));
            self.0.lock().unwrap().push(fields);
        }
    }

    fn capture_info(f: impl FnOnce()) -> Vec<BTreeMap<String, String>> {
        let events = InfoEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());
        tracing::subscriber::with_default(subscriber, f);
        let out = events.0.lock().unwrap().clone();
        out
    }

    #[test]
    fn log_stats_reports_counters_in_both_phases() {
        let rt = MockRuntime::new();
        let mut a = arena(&rt);
        let x = a.reserve(10).unwrap();
        a.reserve(20).unwrap();
        a.release(x, 10).unwrap();

        let planning = capture_info(|| a.log_stats());
        a.materialize().unwrap();
        let bound = capture_info(|| a.log_stats());

        assert_eq!(planning.len(), 1);
        let e = &planning[0];
        assert_eq!(e["used"], "24");
        assert_eq!(e["peak"], "40");
        assert_eq!(e["extent"], "40");
        assert_eq!(e["free_blocks"], "1");
        assert_eq!(e["bound"], "false");
        assert_eq!(
            e["message"],
            "used memory: 24, peak memory: 40, extent: 40, free blocks: 1 (16 bytes), live: 1"
        );

        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0]["bound"], "true");
        assert_eq!(bound[0]["used"], "24");
    }

    #[test]
    fn debug_output_reports_phase() {
        let rt = MockRuntime::new();
        let a = arena(&rt);
        let s = format!("{a:?}");
        assert!(s.contains("bound: false"));
    }
}
