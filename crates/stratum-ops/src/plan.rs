//! Buffer planning over an operator sequence.
//!
//! [`BufferPlan::build`] walks operators in execution order and reserves
//! one arena range per tensor:
//!
//! - Graph inputs (tensors read but never produced) are reserved before the
//!   first operator and stay live for the whole plan.
//! - Each operator's outputs are reserved before any of its inputs are
//!   released, so an output never aliases an input of the same operator.
//! - A produced tensor is released right after the operator that reads it
//!   last. Tensors nobody reads are graph outputs and are never released.
//!
//! Zero-byte tensors get a placement at offset zero without touching the
//! planner.

use indexmap::{IndexMap, IndexSet};
use stratum_arena::{ArenaStats, Planner};
use stratum_core::{Offset, TensorId};
use tracing::debug;

use crate::error::OpError;
use crate::op::Operator;
use crate::tensor::TensorDesc;

/// Where a tensor lives in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Logical offset of the tensor's first byte.
    pub offset: Offset,
    /// Unpadded size in bytes.
    pub bytes: usize,
}

impl Placement {
    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.offset.get() + self.bytes
    }

    /// Whether two placements share any byte.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.bytes > 0
            && other.bytes > 0
            && self.offset.get() < other.end()
            && other.offset.get() < self.end()
    }
}

/// Offsets for every tensor of an operator sequence.
#[derive(Clone, Debug)]
pub struct BufferPlan {
    placements: IndexMap<TensorId, Placement>,
    graph_inputs: usize,
    stats: ArenaStats,
}

impl BufferPlan {
    /// Plan buffers for `ops`, reserving through `planner`.
    ///
    /// On error the planner may hold reservations made before the failure;
    /// callers typically discard it.
    pub fn build(ops: &[Operator], planner: &mut Planner) -> Result<Self, OpError> {
        let producers = producers(ops)?;

        // Index of the last operator that reads each tensor, plus the graph
        // inputs in first-read order.
        let mut last_use: IndexMap<TensorId, usize> = IndexMap::new();
        let mut graph_inputs: IndexMap<TensorId, &TensorDesc> = IndexMap::new();
        for (i, op) in ops.iter().enumerate() {
            for input in op.inputs() {
                match producers.get(&input.id) {
                    Some(&p) if p >= i => {
                        return Err(OpError::UseBeforeDefinition {
                            tensor: input.id,
                            op: op.id(),
                        })
                    }
                    Some(_) => {}
                    None => {
                        graph_inputs.entry(input.id).or_insert(input);
                    }
                }
                last_use.insert(input.id, i);
            }
        }

        let mut placements = IndexMap::with_capacity(graph_inputs.len() + producers.len());
        for desc in graph_inputs.values() {
            placements.insert(desc.id, place(desc, planner)?);
        }

        let mut live: IndexSet<TensorId> = IndexSet::new();
        for (i, op) in ops.iter().enumerate() {
            for out in op.outputs() {
                placements.insert(out.id, place(out, planner)?);
                live.insert(out.id);
            }
            for input in op.inputs() {
                if last_use.get(&input.id) != Some(&i) || !live.swap_remove(&input.id) {
                    continue;
                }
                let p = placements[&input.id];
                if p.bytes > 0 {
                    planner.release(p.offset, p.bytes)?;
                }
            }
        }

        let stats = planner.stats();
        debug!(
            ops = ops.len(),
            tensors = placements.len(),
            graph_inputs = graph_inputs.len(),
            peak = stats.peak,
            extent = stats.extent,
            "buffer plan built"
        );
        Ok(Self {
            placements,
            graph_inputs: graph_inputs.len(),
            stats,
        })
    }

    /// Offset of a tensor, if it was planned.
    pub fn offset(&self, tensor: TensorId) -> Option<Offset> {
        self.placement(tensor).map(|p| p.offset)
    }

    /// Placement of a tensor, if it was planned.
    pub fn placement(&self, tensor: TensorId) -> Option<Placement> {
        self.placements.get(&tensor).copied()
    }

    /// All placements: graph inputs first, then outputs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (TensorId, Placement)> + '_ {
        self.placements.iter().map(|(&id, &p)| (id, p))
    }

    /// Number of planned tensors.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether no tensors were planned.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of graph inputs.
    pub fn graph_inputs(&self) -> usize {
        self.graph_inputs
    }

    /// Planner statistics once the walk finished.
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }
}

/// Map each produced tensor to the index of its producing operator.
fn producers(ops: &[Operator]) -> Result<IndexMap<TensorId, usize>, OpError> {
    let mut producers = IndexMap::new();
    for (i, op) in ops.iter().enumerate() {
        for out in op.outputs() {
            if producers.insert(out.id, i).is_some() {
                return Err(OpError::DuplicateProducer { tensor: out.id });
            }
        }
    }
    Ok(producers)
}

fn place(desc: &TensorDesc, planner: &mut Planner) -> Result<Placement, OpError> {
    let bytes = desc.bytes()?;
    let offset = if bytes == 0 {
        Offset::ZERO
    } else {
        planner.reserve(bytes)?
    };
    Ok(Placement { offset, bytes })
}
