//! Operators: a kind plus the tensors it reads and writes.

use std::fmt;

use smallvec::SmallVec;
use stratum_core::shape::format_dims;
use stratum_core::{OpId, TensorId};

use crate::cast::Cast;
use crate::error::OpError;
use crate::matmul::MatMul;
use crate::tensor::TensorDesc;
use crate::unary::{Clip, Unary};

/// What an [`Operator`] computes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OpKind {
    /// Batched matrix multiply; two inputs.
    MatMul(MatMul),
    /// Elementwise function; one input.
    Unary(Unary),
    /// Elementwise clamp; one input.
    Clip(Clip),
    /// Element-type conversion; one input.
    Cast(Cast),
}

impl OpKind {
    /// Operator name as it appears in formatted output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatMul(_) => "Matmul",
            Self::Unary(u) => u.kind.name(),
            Self::Clip(_) => "Clip",
            Self::Cast(_) => "Cast",
        }
    }

    /// Number of input tensors the operator reads.
    pub fn input_count(&self) -> usize {
        match self {
            Self::MatMul(_) => 2,
            Self::Unary(_) | Self::Clip(_) | Self::Cast(_) => 1,
        }
    }
}

impl From<MatMul> for OpKind {
    fn from(m: MatMul) -> Self {
        Self::MatMul(m)
    }
}

impl From<Unary> for OpKind {
    fn from(u: Unary) -> Self {
        Self::Unary(u)
    }
}

impl From<Clip> for OpKind {
    fn from(c: Clip) -> Self {
        Self::Clip(c)
    }
}

impl From<Cast> for OpKind {
    fn from(c: Cast) -> Self {
        Self::Cast(c)
    }
}

/// An operator with fully inferred output descriptors.
///
/// Construction runs shape inference, so an `Operator` that exists is
/// well-formed: its outputs have the shape and type its kind produces
/// from its inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Operator {
    id: OpId,
    kind: OpKind,
    inputs: SmallVec<[TensorDesc; 2]>,
    outputs: SmallVec<[TensorDesc; 1]>,
}

impl Operator {
    /// Build an operator, inferring the descriptor of each output.
    ///
    /// Every operator kind produces exactly one output, so `outputs` must
    /// name one tensor.
    pub fn new(
        id: u32,
        kind: impl Into<OpKind>,
        inputs: &[TensorDesc],
        outputs: &[TensorId],
    ) -> Result<Self, OpError> {
        let kind = kind.into();
        let expected = kind.input_count();
        if inputs.len() != expected {
            return Err(OpError::Arity {
                op: kind.name(),
                role: "inputs",
                expected,
                got: inputs.len(),
            });
        }
        let &[output] = outputs else {
            return Err(OpError::Arity {
                op: kind.name(),
                role: "outputs",
                expected: 1,
                got: outputs.len(),
            });
        };

        let (dims, dtype) = match &kind {
            OpKind::MatMul(m) => m.infer(&inputs[0], &inputs[1])?,
            OpKind::Unary(u) => u.infer(&inputs[0]),
            OpKind::Clip(c) => c.infer(&inputs[0]),
            OpKind::Cast(c) => c.infer(&inputs[0])?,
        };
        let out = TensorDesc {
            id: output,
            dims,
            dtype,
        };
        // Reject tensors whose storage size cannot be represented.
        out.bytes()?;

        Ok(Self {
            id: OpId(id),
            kind,
            inputs: SmallVec::from(inputs),
            outputs: smallvec::smallvec![out],
        })
    }

    /// Operator identity.
    pub fn id(&self) -> OpId {
        self.id
    }

    /// What the operator computes.
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Tensors read, in argument order.
    pub fn inputs(&self) -> &[TensorDesc] {
        &self.inputs
    }

    /// Tensors written.
    pub fn outputs(&self) -> &[TensorDesc] {
        &self.outputs
    }

    /// The single output tensor.
    pub fn output(&self) -> &TensorDesc {
        &self.outputs[0]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self.output().id;
        match &self.kind {
            OpKind::MatMul(m) => {
                let (a, b) = (&self.inputs[0], &self.inputs[1]);
                let mnk = m.mnk(a, b).map_err(|_| fmt::Error)?;
                write!(
                    f,
                    "Matmul([{},{}],A={},B={},C={},mnk=[{},{},{}])",
                    if m.trans_a { "A^T" } else { "A" },
                    if m.trans_b { "B^T" } else { "B" },
                    a.id,
                    b.id,
                    out,
                    mnk.m,
                    mnk.n,
                    mnk.k,
                )
            }
            OpKind::Unary(_) | OpKind::Clip(_) => {
                let input = &self.inputs[0];
                write!(
                    f,
                    "{}[{}]({},input={},output={})",
                    self.kind.name(),
                    self.id,
                    format_dims(&input.dims),
                    input.id,
                    out,
                )
            }
            OpKind::Cast(c) => write!(f, "Cast[{}]({},output={})", self.id, c.cast, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::CastType;
    use crate::unary::UnaryKind;
    use stratum_core::DataType;

    fn f32(id: u32, dims: &[usize]) -> TensorDesc {
        TensorDesc::new(id, dims, DataType::Float32)
    }

    #[test]
    fn matmul_infers_output_descriptor() {
        let op = Operator::new(
            0,
            MatMul::default(),
            &[f32(1, &[8, 3, 4]), f32(2, &[4, 5])],
            &[TensorId(3)],
        )
        .unwrap();
        assert_eq!(op.output(), &f32(3, &[8, 3, 5]));
        assert_eq!(op.inputs().len(), 2);
    }

    #[test]
    fn wrong_input_count_is_rejected() {
        let err = Operator::new(0, MatMul::default(), &[f32(1, &[2, 2])], &[TensorId(2)])
            .unwrap_err();
        assert_eq!(
            err,
            OpError::Arity {
                op: "Matmul",
                role: "inputs",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn wrong_output_count_is_rejected() {
        let err = Operator::new(
            0,
            Unary::new(UnaryKind::Relu),
            &[f32(1, &[4])],
            &[TensorId(2), TensorId(3)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OpError::Arity {
                role: "outputs",
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn inference_errors_propagate() {
        let err = Operator::new(
            0,
            Cast::new(CastType::F16ToF32),
            &[f32(1, &[4])],
            &[TensorId(2)],
        )
        .unwrap_err();
        assert!(matches!(err, OpError::DataTypeMismatch { .. }));
    }

    #[test]
    fn matmul_display() {
        let op = Operator::new(
            4,
            MatMul::new(true, false),
            &[f32(1, &[4, 3]), f32(2, &[4, 5])],
            &[TensorId(3)],
        )
        .unwrap();
        assert_eq!(op.to_string(), "Matmul([A^T,B],A=1,B=2,C=3,mnk=[3,5,4])");
    }

    #[test]
    fn unary_and_clip_display() {
        let relu = Operator::new(
            7,
            Unary::new(UnaryKind::Relu),
            &[f32(1, &[1, 224])],
            &[TensorId(2)],
        )
        .unwrap();
        assert_eq!(relu.to_string(), "Relu[7]([1,224],input=1,output=2)");

        let clip = Operator::new(
            8,
            Clip::new(Some(0.0), Some(6.0)),
            &[f32(2, &[3])],
            &[TensorId(5)],
        )
        .unwrap();
        assert_eq!(clip.to_string(), "Clip[8]([3],input=2,output=5)");
    }

    #[test]
    fn cast_display() {
        let op = Operator::new(
            2,
            Cast::new(CastType::F32ToBF16),
            &[f32(0, &[2])],
            &[TensorId(1)],
        )
        .unwrap();
        assert_eq!(op.to_string(), "Cast[2](f32->bf16,output=1)");
        assert_eq!(op.output().dtype, DataType::BFloat16);
    }
}
