//! Slice-level CPU kernels for `encoder-rs`.
//!
//! Kernels operate on flat row-major buffers plus explicit `[rows, cols]` shapes.
//! They know nothing about the `Tensor` type; shape validation happens here as well so
//! a bad buffer never reaches an indexing loop.

use num_traits::{Float, FromPrimitive, Num, NumAssign, ToPrimitive};
use std::fmt::Debug;
use thiserror::Error;

pub mod cpu_matmul;
pub mod cpu_softmax;
pub mod cpu_transpose;

pub use cpu_matmul::cpu_matmul;
pub use cpu_softmax::cpu_softmax_rows;
pub use cpu_transpose::cpu_transpose;

/// Output size (in elements) above which kernels split work across the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KernelError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("Allocation of {elements} elements failed")]
    AllocationFailure { elements: usize },
}

pub type Result<T> = std::result::Result<T, KernelError>;

/// Trait bound for elements that can be processed by kernels.
/// This mirrors `TensorElem` in the core crate to avoid circular dependencies.
pub trait KernelElem:
    Num + NumAssign + Copy + Clone + Debug + Send + Sync + FromPrimitive + ToPrimitive + PartialOrd
{
}

impl<T> KernelElem for T where
    T: Num
        + NumAssign
        + Copy
        + Clone
        + Debug
        + Send
        + Sync
        + FromPrimitive
        + ToPrimitive
        + PartialOrd
{
}

/// Floating point elements, required by kernels that exponentiate.
pub trait KernelFloat: KernelElem + Float {}

impl<T> KernelFloat for T where T: KernelElem + Float {}

/// Allocates a zero-filled buffer, reporting allocator failure instead of aborting.
pub fn alloc_zeroed<T: KernelElem>(elements: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(elements)
        .map_err(|_| KernelError::AllocationFailure { elements })?;
    buf.resize(elements, T::zero());
    Ok(buf)
}

/// Checks that a flat buffer holds exactly `rows * cols` elements.
pub(crate) fn check_len<T>(data: &[T], shape: &[usize; 2]) -> Result<()> {
    let expected = shape[0].saturating_mul(shape[1]);
    if data.len() != expected {
        return Err(KernelError::ShapeMismatch {
            expected: vec![expected],
            got: vec![data.len()],
        });
    }
    Ok(())
}
