//! Tensor descriptors.

use std::fmt;

use stratum_core::shape::{element_count, format_dims};
use stratum_core::{DataType, Shape, TensorId};

use crate::error::OpError;

/// Shape and element type of a tensor, without any storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    /// Tensor identity.
    pub id: TensorId,
    /// Dimensions, outermost first.
    pub dims: Shape,
    /// Element type.
    pub dtype: DataType,
}

impl TensorDesc {
    /// Create a descriptor.
    pub fn new(id: u32, dims: &[usize], dtype: DataType) -> Self {
        Self {
            id: TensorId(id),
            dims: Shape::from_slice(dims),
            dtype,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements.
    pub fn elements(&self) -> Result<usize, OpError> {
        element_count(&self.dims).ok_or(OpError::SizeOverflow { tensor: self.id })
    }

    /// Storage size in bytes.
    pub fn bytes(&self) -> Result<usize, OpError> {
        self.elements()?
            .checked_mul(self.dtype.size())
            .ok_or(OpError::SizeOverflow { tensor: self.id })
    }
}

impl fmt::Display for TensorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}{}:{}", self.id, format_dims(&self.dims), self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_multiply_elements_by_dtype_size() {
        let t = TensorDesc::new(0, &[2, 3, 4], DataType::Float32);
        assert_eq!(t.elements().unwrap(), 24);
        assert_eq!(t.bytes().unwrap(), 96);
        let t = TensorDesc::new(1, &[10], DataType::Float16);
        assert_eq!(t.bytes().unwrap(), 20);
    }

    #[test]
    fn scalar_tensor_has_one_element() {
        let t = TensorDesc::new(0, &[], DataType::Int64);
        assert_eq!(t.rank(), 0);
        assert_eq!(t.bytes().unwrap(), 8);
    }

    #[test]
    fn overflow_is_reported() {
        let t = TensorDesc::new(7, &[usize::MAX / 2, 4], DataType::Float32);
        assert_eq!(
            t.bytes(),
            Err(OpError::SizeOverflow {
                tensor: TensorId(7)
            })
        );
    }

    #[test]
    fn display_shows_id_dims_and_type() {
        let t = TensorDesc::new(3, &[1, 8], DataType::BFloat16);
        assert_eq!(t.to_string(), "T3[1,8]:bf16");
    }
}
