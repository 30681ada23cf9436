//! Element-type conversion.

use std::fmt;

use stratum_core::DataType;

use crate::error::OpError;
use crate::tensor::TensorDesc;

/// A supported source → target conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastType {
    /// f32 → f16
    F32ToF16,
    /// f32 → i64
    F32ToI64,
    /// f32 → i32
    F32ToI32,
    /// f32 → i16
    F32ToI16,
    /// f32 → i8
    F32ToI8,
    /// i32 → f32
    I32ToF32,
    /// i32 → i8
    I32ToI8,
    /// i32 → i16
    I32ToI16,
    /// i16 → f32
    I16ToF32,
    /// i16 → i32
    I16ToI32,
    /// i8 → f32
    I8ToF32,
    /// i8 → i16
    I8ToI16,
    /// i8 → i32
    I8ToI32,
    /// u8 → f32
    U8ToF32,
    /// u8 → i32
    U8ToI32,
    /// u8 → i64
    U8ToI64,
    /// i32 → i64
    I32ToI64,
    /// i64 → i32
    I64ToI32,
    /// i64 → u32
    I64ToU32,
    /// i64 → f32
    I64ToF32,
    /// u32 → i64
    U32ToI64,
    /// f16 → f32
    F16ToF32,
    /// bf16 → f32
    BF16ToF32,
    /// f32 → bf16
    F32ToBF16,
    /// f32 → f32
    F32ToF32,
}

impl CastType {
    /// `(source, target)` element types.
    pub fn types(self) -> (DataType, DataType) {
        use DataType::*;
        match self {
            Self::F32ToF16 => (Float32, Float16),
            Self::F32ToI64 => (Float32, Int64),
            Self::F32ToI32 => (Float32, Int32),
            Self::F32ToI16 => (Float32, Int16),
            Self::F32ToI8 => (Float32, Int8),
            Self::I32ToF32 => (Int32, Float32),
            Self::I32ToI8 => (Int32, Int8),
            Self::I32ToI16 => (Int32, Int16),
            Self::I16ToF32 => (Int16, Float32),
            Self::I16ToI32 => (Int16, Int32),
            Self::I8ToF32 => (Int8, Float32),
            Self::I8ToI16 => (Int8, Int16),
            Self::I8ToI32 => (Int8, Int32),
            Self::U8ToF32 => (UInt8, Float32),
            Self::U8ToI32 => (UInt8, Int32),
            Self::U8ToI64 => (UInt8, Int64),
            Self::I32ToI64 => (Int32, Int64),
            Self::I64ToI32 => (Int64, Int32),
            Self::I64ToU32 => (Int64, UInt32),
            Self::I64ToF32 => (Int64, Float32),
            Self::U32ToI64 => (UInt32, Int64),
            Self::F16ToF32 => (Float16, Float32),
            Self::BF16ToF32 => (BFloat16, Float32),
            Self::F32ToBF16 => (Float32, BFloat16),
            Self::F32ToF32 => (Float32, Float32),
        }
    }

    /// Element type the input must have.
    pub fn source(self) -> DataType {
        self.types().0
    }

    /// Element type of the output.
    pub fn target(self) -> DataType {
        self.types().1
    }

    /// Look up the cast between two types, if supported.
    pub fn between(from: DataType, to: DataType) -> Option<CastType> {
        Self::ALL.iter().copied().find(|c| c.types() == (from, to))
    }

    /// Every supported cast.
    pub const ALL: [CastType; 25] = [
        Self::F32ToF16,
        Self::F32ToI64,
        Self::F32ToI32,
        Self::F32ToI16,
        Self::F32ToI8,
        Self::I32ToF32,
        Self::I32ToI8,
        Self::I32ToI16,
        Self::I16ToF32,
        Self::I16ToI32,
        Self::I8ToF32,
        Self::I8ToI16,
        Self::I8ToI32,
        Self::U8ToF32,
        Self::U8ToI32,
        Self::U8ToI64,
        Self::I32ToI64,
        Self::I64ToI32,
        Self::I64ToU32,
        Self::I64ToF32,
        Self::U32ToI64,
        Self::F16ToF32,
        Self::BF16ToF32,
        Self::F32ToBF16,
        Self::F32ToF32,
    ];
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = self.types();
        write!(f, "{from}->{to}")
    }
}

/// Shape-preserving element-type conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cast {
    /// The conversion performed.
    pub cast: CastType,
}

impl Cast {
    /// Create a cast operator.
    pub fn new(cast: CastType) -> Self {
        Self { cast }
    }

    /// Output element type.
    pub fn output_dtype(&self) -> DataType {
        self.cast.target()
    }

    /// The output has the input's shape and the cast's target type.
    pub fn infer(&self, input: &TensorDesc) -> Result<(stratum_core::Shape, DataType), OpError> {
        let expected = self.cast.source();
        if input.dtype != expected {
            return Err(OpError::DataTypeMismatch {
                expected,
                got: input.dtype,
            });
        }
        Ok((input.dims.clone(), self.output_dtype()))
    }
}
