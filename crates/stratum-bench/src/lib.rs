//! Seeded workloads for benchmarking the Stratum allocator.
//!
//! - [`churn`]: a random interleaving of reservations and releases
//! - [`replay`]: drive a [`Planner`] through a churn workload, reporting
//!   [`ReplayError`] on bad steps
//! - [`mlp_chain`]: a `matmul → relu` operator chain for buffer planning

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stratum_arena::{ArenaError, Planner};
use stratum_core::{DataType, Offset, TensorId};
use stratum_ops::{MatMul, OpError, Operator, TensorDesc, Unary, UnaryKind};

/// One step of a churn workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Reserve `size` bytes. Reservations are numbered in order, starting
    /// at slot 0.
    Reserve {
        /// Requested bytes.
        size: usize,
    },
    /// Release the reservation made in `slot`.
    Release {
        /// Which earlier reservation to release.
        slot: usize,
    },
}

/// Generate `steps` reserve/release steps with sizes in `1..=max_size`.
///
/// Roughly 60% of steps reserve. Every release names a slot that is live
/// at that point, so the workload can be replayed without errors.
pub fn churn(seed: u64, steps: usize, max_size: usize) -> Vec<Step> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live: Vec<usize> = Vec::new();
    let mut next_slot = 0;
    let mut out = Vec::with_capacity(steps);

    for _ in 0..steps {
        if live.is_empty() || rng.gen_bool(0.6) {
            out.push(Step::Reserve {
                size: rng.gen_range(1..=max_size),
            });
            live.push(next_slot);
            next_slot += 1;
        } else {
            let slot = live.swap_remove(rng.gen_range(0..live.len()));
            out.push(Step::Release { slot });
        }
    }
    out
}

/// Errors from [`replay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// A release names a slot no earlier step reserved.
    UnknownSlot {
        /// Index of the offending step.
        step: usize,
        /// The slot it named.
        slot: usize,
    },
    /// The planner rejected a step.
    Arena {
        /// Index of the offending step.
        step: usize,
        /// The planner's error.
        error: ArenaError,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSlot { step, slot } => {
                write!(f, "step {step}: slot {slot} was never reserved")
            }
            Self::Arena { step, error } => write!(f, "step {step}: {error}"),
        }
    }
}

impl Error for ReplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena { error, .. } => Some(error),
            Self::UnknownSlot { .. } => None,
        }
    }
}

/// Run a reserve/release workload against `planner`.
///
/// Steps usually come from [`churn`], but hand-built sequences are
/// checked: a release of a slot that was never reserved fails with
/// [`ReplayError::UnknownSlot`].
pub fn replay(planner: &mut Planner, steps: &[Step]) -> Result<(), ReplayError> {
    let mut slots: Vec<(Offset, usize)> = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let arena = |error| ReplayError::Arena { step: i, error };
        match *step {
            Step::Reserve { size } => slots.push((planner.reserve(size).map_err(arena)?, size)),
            Step::Release { slot } => {
                let &(offset, size) = slots
                    .get(slot)
                    .ok_or(ReplayError::UnknownSlot { step: i, slot })?;
                planner.release(offset, size).map_err(arena)?;
            }
        }
    }
    Ok(())
}

/// `layers` repetitions of `x = relu(x · Wᵢ)` over a `[batch, width]` f32
/// activation. Tensor 0 is the input; weights are fresh graph inputs.
pub fn mlp_chain(layers: u32, batch: usize, width: usize) -> Result<Vec<Operator>, OpError> {
    let mut ops = Vec::with_capacity(2 * layers as usize);
    let mut x = TensorDesc::new(0, &[batch, width], DataType::Float32);
    let mut next = 1u32;
    let mut op_id = 0u32;
    let mut fresh = || {
        let id = next;
        next += 1;
        id
    };

    for _ in 0..layers {
        let w = TensorDesc::new(fresh(), &[width, width], DataType::Float32);
        let mm = Operator::new(op_id, MatMul::default(), &[x, w], &[TensorId(fresh())])?;
        let relu = Operator::new(
            op_id + 1,
            Unary::new(UnaryKind::Relu),
            &[mm.output().clone()],
            &[TensorId(fresh())],
        )?;
        op_id += 2;
        x = relu.output().clone();
        ops.push(mm);
        ops.push(relu);
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_ops::BufferPlan;

    #[test]
    fn churn_is_deterministic() {
        assert_eq!(churn(42, 500, 256), churn(42, 500, 256));
        assert_ne!(churn(42, 500, 256), churn(43, 500, 256));
    }

    #[test]
    fn churn_replays_cleanly() {
        let steps = churn(7, 2_000, 1024);
        let mut planner = Planner::default();
        replay(&mut planner, &steps).unwrap();
        assert!(planner.free_list().invariants_hold());
        assert_eq!(planner.used() + planner.free_list().free_bytes(), planner.extent());
    }

    #[test]
    fn replay_reports_release_of_unreserved_slot() {
        let steps = [Step::Reserve { size: 8 }, Step::Release { slot: 3 }];
        let err = replay(&mut Planner::default(), &steps).unwrap_err();
        assert_eq!(err, ReplayError::UnknownSlot { step: 1, slot: 3 });
        assert_eq!(err.to_string(), "step 1: slot 3 was never reserved");
    }

    #[test]
    fn replay_reports_planner_rejection() {
        let steps = [
            Step::Reserve { size: 8 },
            Step::Release { slot: 0 },
            Step::Release { slot: 0 },
        ];
        let err = replay(&mut Planner::default(), &steps).unwrap_err();
        assert_eq!(
            err,
            ReplayError::Arena {
                step: 2,
                error: ArenaError::UnknownOffset { offset: Offset(0) },
            }
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn mlp_chain_plans_with_bounded_activation_memory() {
        let ops = mlp_chain(8, 4, 16).unwrap();
        assert_eq!(ops.len(), 16);

        let mut planner = Planner::default();
        let plan = BufferPlan::build(&ops, &mut planner).unwrap();
        // 8 weights (1 KiB each) and the input stay pinned; activations
        // (256 B each) are recycled, so two are live at any time.
        let act = 4 * 16 * 4;
        let pinned = act + 8 * 16 * 16 * 4;
        assert_eq!(plan.stats().peak, pinned + 2 * act);
        assert_eq!(plan.stats().extent, pinned + 2 * act);
    }
}
