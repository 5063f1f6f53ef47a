//! Core Tensor implementation.
//!
//! A **Tensor** here is a flat, row-major buffer plus its shape. Everything in the
//! encoder (embedding tables, positional tables, projections, attention scores) is a
//! rank-2 tensor, so most of the API lives on [`Matrix`], the `Tensor<T, 2>` alias.
//!
//! ```rust
//! use encoder_rs::tensor::Tensor;
//!
//! let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let tensor = Tensor::<f32, 2>::new(data, [2, 3]).unwrap();
//!
//! assert_eq!(tensor.shape(), &[2, 3]);
//! assert_eq!(tensor.strides(), &[3, 1]);
//! ```
//!
//! Element `(i, j)` of a `[rows, cols]` matrix sits at offset `i * cols + j`.
//! Shapes are carried at runtime and checked at every operation boundary, so a
//! mismatch surfaces as [`TensorError::ShapeMismatch`] rather than an out-of-bounds
//! read.

use encoder_rs_kernels::{KernelElem, KernelError};
use std::fmt::Debug;
use thiserror::Error;

pub mod ops;

/// Error type for Tensor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// Operand dimensions are incompatible.
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// An index is out of bounds for the given shape.
    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },
    /// The allocator refused a buffer of this many elements.
    #[error("Allocation of {elements} elements failed")]
    AllocationFailure { elements: usize },
    /// Configuration values are unusable (zero dimensions, unreadable file, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<KernelError> for TensorError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::ShapeMismatch { expected, got } => {
                TensorError::ShapeMismatch { expected, got }
            }
            KernelError::AllocationFailure { elements } => {
                TensorError::AllocationFailure { elements }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;

/// Trait bound for elements that can be stored in a Tensor.
///
/// Same bounds as the kernels crate (`Num + NumAssign + Copy + Send + Sync + ...`),
/// so any tensor element can be handed straight to a kernel.
pub trait TensorElem: KernelElem {}

impl<T: KernelElem> TensorElem for T {}

/// N-dimensional tensor stored contiguously in row-major order.
#[derive(Clone, PartialEq)]
pub struct Tensor<T, const RANK: usize>
where
    T: TensorElem,
{
    shape: [usize; RANK],
    strides: [usize; RANK],
    data: Vec<T>,
}

/// A rank-2 tensor: `[rows, cols]`.
pub type Matrix<T = f32> = Tensor<T, 2>;

impl<T, const RANK: usize> Tensor<T, RANK>
where
    T: TensorElem,
{
    /// Creates a new Tensor from a vector of data and a shape.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the length of `data` does not match the product of `shape`.
    pub fn new(data: Vec<T>, shape: [usize; RANK]) -> Result<Self> {
        let size: usize = shape.iter().product();
        if data.len() != size {
            return Err(TensorError::ShapeMismatch {
                expected: vec![size],
                got: vec![data.len()],
            });
        }

        Ok(Self {
            shape,
            strides: compute_strides(&shape),
            data,
        })
    }

    /// Creates a new Tensor filled with zeros.
    pub fn zeros(shape: [usize; RANK]) -> Self {
        let size: usize = shape.iter().product();
        Self {
            shape,
            strides: compute_strides(&shape),
            data: vec![T::zero(); size],
        }
    }

    /// Like [`Tensor::zeros`] but reports allocator failure as
    /// `TensorError::AllocationFailure` instead of aborting.
    pub fn try_zeros(shape: [usize; RANK]) -> Result<Self> {
        let size = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(TensorError::AllocationFailure {
                elements: usize::MAX,
            })?;
        let data = encoder_rs_kernels::alloc_zeroed(size)?;
        Ok(Self {
            shape,
            strides: compute_strides(&shape),
            data,
        })
    }

    /// Reshapes the tensor to a new shape with the same number of elements.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the element counts differ.
    pub fn reshape<const NEW_RANK: usize>(
        self,
        new_shape: [usize; NEW_RANK],
    ) -> Result<Tensor<T, NEW_RANK>> {
        let current_size: usize = self.shape.iter().product();
        let new_size: usize = new_shape.iter().product();

        if current_size != new_size {
            return Err(TensorError::ShapeMismatch {
                expected: vec![current_size],
                got: vec![new_size],
            });
        }

        Ok(Tensor {
            shape: new_shape,
            strides: compute_strides(&new_shape),
            data: self.data,
        })
    }

    /// Returns the shape of the tensor.
    pub const fn shape(&self) -> &[usize; RANK] {
        &self.shape
    }

    /// Returns the strides of the tensor.
    pub const fn strides(&self) -> &[usize; RANK] {
        &self.strides
    }

    /// Returns a reference to the underlying data as a slice.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns a mutable reference to the underlying data as a slice.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns the total number of elements in the tensor.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when the tensor holds no elements (some dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the element at a multi-dimensional index.
    pub fn get(&self, index: [usize; RANK]) -> Result<T> {
        let mut offset = 0;
        for (i, (&idx, &dim)) in index.iter().zip(self.shape.iter()).enumerate() {
            if idx >= dim {
                return Err(TensorError::IndexOutOfBounds {
                    index: index.to_vec(),
                    shape: self.shape.to_vec(),
                });
            }
            offset += idx * self.strides[i];
        }
        Ok(self.data[offset])
    }
}

/// Computes row-major strides for a shape: the last dimension has stride 1.
const fn compute_strides<const RANK: usize>(shape: &[usize; RANK]) -> [usize; RANK] {
    let mut strides = [0; RANK];
    let mut stride = 1;
    let mut i = RANK;
    while i > 0 {
        i -= 1;
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

impl<T, const RANK: usize> Debug for Tensor<T, RANK>
where
    T: TensorElem,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_creation() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let tensor = Tensor::<f32, 2>::new(data.clone(), [2, 2]).unwrap();
        assert_eq!(tensor.shape(), &[2, 2]);
        assert_eq!(tensor.data(), &data[..]);

        // Size mismatch
        let err = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0], [2, 2]);
        assert!(matches!(err, Err(TensorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_zeros() {
        let zeros = Tensor::<f32, 2>::zeros([2, 3]);
        assert_eq!(zeros.data(), &[0.0; 6]);
    }

    #[test]
    fn test_try_zeros() {
        let t = Tensor::<f32, 2>::try_zeros([3, 4]).unwrap();
        assert_eq!(t.size(), 12);

        let err = Tensor::<f32, 2>::try_zeros([usize::MAX, 2]);
        assert!(matches!(err, Err(TensorError::AllocationFailure { .. })));
    }

    #[test]
    fn test_reshape() {
        let tensor = Tensor::<f32, 2>::zeros([2, 3]);

        let reshaped = tensor.reshape([3, 2]).unwrap();
        assert_eq!(reshaped.shape(), &[3, 2]);

        let err = reshaped.clone().reshape([4, 2]);
        assert!(matches!(err, Err(TensorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_get() {
        let t = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap();
        assert_eq!(t.get([1, 2]).unwrap(), 6.0);
        assert_eq!(t.get([0, 1]).unwrap(), 2.0);
        assert!(matches!(
            t.get([2, 0]),
            Err(TensorError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_compute_strides() {
        let strides = compute_strides(&[2, 3, 4]);
        assert_eq!(strides, [12, 4, 1]);
    }

    #[test]
    fn test_tensor_error_display() {
        let err = TensorError::ShapeMismatch {
            expected: vec![2, 2],
            got: vec![4],
        };
        assert_eq!(
            format!("{}", err),
            "Shape mismatch: expected [2, 2], got [4]"
        );

        let err = TensorError::IndexOutOfBounds {
            index: vec![3],
            shape: vec![2],
        };
        assert_eq!(
            format!("{}", err),
            "Index out of bounds: index [3] for shape [2]"
        );

        let err = TensorError::AllocationFailure { elements: 10 };
        assert_eq!(format!("{}", err), "Allocation of 10 elements failed");
    }

    #[test]
    fn test_kernel_error_conversion() {
        let err: TensorError = KernelError::AllocationFailure { elements: 7 }.into();
        assert_eq!(err, TensorError::AllocationFailure { elements: 7 });
    }

    #[test]
    fn test_tensor_debug() {
        let t = Tensor::<f32, 1>::new(vec![1.0], [1]).unwrap();
        let debug_str = format!("{:?}", t);
        assert!(debug_str.contains("Tensor"));
        assert!(debug_str.contains("shape"));
    }
}
