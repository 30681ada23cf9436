//! Elementwise shape-preserving operators.

use std::fmt;

use stratum_core::{DataType, Shape};

use crate::tensor::TensorDesc;

/// Which elementwise function a [`Unary`] applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryKind {
    /// `max(x, 0)`
    Relu,
    /// `1 / (1 + e^-x)`
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Absolute value.
    Abs,
    /// Square root.
    Sqrt,
    /// Negation.
    Neg,
    /// Gaussian error linear unit.
    Gelu,
}

impl UnaryKind {
    /// Operator name as it appears in formatted output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Relu => "Relu",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
            Self::Abs => "Abs",
            Self::Sqrt => "Sqrt",
            Self::Neg => "Neg",
            Self::Gelu => "Gelu",
        }
    }
}

impl fmt::Display for UnaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An elementwise function of one tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unary {
    /// The function applied.
    pub kind: UnaryKind,
}

impl Unary {
    /// Create a unary operator.
    pub fn new(kind: UnaryKind) -> Self {
        Self { kind }
    }

    /// Output shape and type equal the input's.
    pub fn infer(&self, input: &TensorDesc) -> (Shape, DataType) {
        (input.dims.clone(), input.dtype)
    }
}

/// Clamp every element to `[min, max]`; either bound may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Clip {
    /// Lower bound, if any.
    pub min: Option<f32>,
    /// Upper bound, if any.
    pub max: Option<f32>,
}

impl Clip {
    /// Create a clip operator.
    pub fn new(min: Option<f32>, max: Option<f32>) -> Self {
        Self { min, max }
    }

    /// Clipping changes values, never shape or type.
    pub fn infer(&self, input: &TensorDesc) -> (Shape, DataType) {
        (input.dims.clone(), input.dtype)
    }
}
