//! Tensor operations.
//!
//! This module is the numeric engine of the encoder:
//! - **Element-wise arithmetic**: `+` on equally shaped tensors, plus `scale`, `map` and
//!   in-place `add_assign`.
//! - **Matrix ops**: `matmul`, out-of-place `transpose`, column slicing and
//!   concatenation.
//! - **Softmax**: one numerically stable primitive shared by the vector form
//!   ([`Tensor::softmax`]) and the row-wise matrix form ([`Tensor::softmax_rows`]).
//!
//! Shapes must match exactly for element-wise operations; there is no broadcasting.
//!
//! ```rust
//! use encoder_rs::tensor::Tensor;
//!
//! let a = Tensor::<f32, 1>::new(vec![1.0, 2.0], [2]).unwrap();
//! let b = Tensor::<f32, 1>::new(vec![3.0, 4.0], [2]).unwrap();
//! let c = (&a + &b).unwrap();
//! assert_eq!(c.data(), &[4.0, 6.0]);
//! ```

use super::{Result, Tensor, TensorElem, TensorError};
use encoder_rs_kernels::{cpu_matmul, cpu_softmax_rows, cpu_transpose, PARALLEL_THRESHOLD};
use num_traits::Float;
use rayon::prelude::*;
use std::ops::Add;

/// Element-wise sum of two equally shaped tensors into a fresh tensor.
impl<T, const RANK: usize> Add for &Tensor<T, RANK>
where
    T: TensorElem,
{
    type Output = Result<Tensor<T, RANK>>;

    fn add(self, rhs: Self) -> Self::Output {
        if self.shape != rhs.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.to_vec(),
                got: rhs.shape.to_vec(),
            });
        }

        let mut out = Tensor::try_zeros(self.shape)?;
        let op = |((o, &a), &b): ((&mut T, &T), &T)| *o = a + b;
        if out.data.len() >= PARALLEL_THRESHOLD {
            out.data
                .par_iter_mut()
                .zip(self.data.par_iter())
                .zip(rhs.data.par_iter())
                .for_each(op);
        } else {
            out.data
                .iter_mut()
                .zip(self.data.iter())
                .zip(rhs.data.iter())
                .for_each(op);
        }

        Ok(out)
    }
}

impl<T, const RANK: usize> Tensor<T, RANK>
where
    T: TensorElem,
{
    /// Applies a function element-wise, returning a new tensor of the same shape.
    ///
    /// ```rust
    /// use encoder_rs::tensor::Tensor;
    /// let t = Tensor::<f32, 1>::new(vec![1.0, 2.0, 3.0], [3]).unwrap();
    /// let squared = t.map(|x| x * x);
    /// assert_eq!(squared.data(), &[1.0, 4.0, 9.0]);
    /// ```
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(T) -> T + Sync + Send,
    {
        let mut out = self.clone();
        if out.data.len() >= PARALLEL_THRESHOLD {
            out.data.par_iter_mut().for_each(|v| *v = f(*v));
        } else {
            out.data.iter_mut().for_each(|v| *v = f(*v));
        }
        out
    }

    /// Multiplies every element by `factor` in place.
    pub fn scale(&mut self, factor: T) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Adds `rhs` element-wise into `self`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the shapes differ.
    pub fn add_assign(&mut self, rhs: &Self) -> Result<()> {
        if self.shape != rhs.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.to_vec(),
                got: rhs.shape.to_vec(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
        Ok(())
    }
}

impl<T> Tensor<T, 2>
where
    T: TensorElem,
{
    /// Builds an `n x n` identity matrix.
    pub fn eye(n: usize) -> Self {
        let mut out = Tensor::zeros([n, n]);
        for i in 0..n {
            out.data[i * n + i] = T::one();
        }
        out
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Borrows row `i` as a slice.
    pub fn row(&self, i: usize) -> Result<&[T]> {
        if i >= self.rows() {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![i],
                shape: self.shape.to_vec(),
            });
        }
        let cols = self.cols();
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Matrix multiplication: `[N, D] x [D, M] -> [N, M]`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the inner dimensions differ, `AllocationFailure` when the
    /// result buffer cannot be allocated.
    pub fn matmul(&self, rhs: &Self) -> Result<Self> {
        let data = cpu_matmul(&self.data, &rhs.data, &self.shape, &rhs.shape)?;
        Tensor::new(data, [self.rows(), rhs.cols()])
    }

    /// Out-of-place transpose: `[N, M] -> [M, N]`.
    ///
    /// The receiver is borrowed immutably, so the source layout stays valid for
    /// every other holder of it.
    pub fn transpose(&self) -> Result<Self> {
        let data = cpu_transpose(&self.data, &self.shape)?;
        Tensor::new(data, [self.cols(), self.rows()])
    }

    /// Copies `width` columns starting at `start` into a new `[rows, width]` matrix.
    pub fn slice_cols(&self, start: usize, width: usize) -> Result<Self> {
        let [rows, cols] = self.shape;
        let end = start.checked_add(width).filter(|&end| end <= cols);
        let Some(end) = end else {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![start.saturating_add(width)],
                shape: self.shape.to_vec(),
            });
        };
        let mut out = Tensor::try_zeros([rows, width])?;
        if width == 0 {
            return Ok(out);
        }
        for (dst, src) in out.data.chunks_mut(width).zip(self.data.chunks(cols)) {
            dst.copy_from_slice(&src[start..end]);
        }
        Ok(out)
    }

    /// Concatenates matrices with equal row counts along the column (feature) axis.
    pub fn concat_cols(parts: &[Self]) -> Result<Self> {
        let rows = parts.first().map_or(0, |p| p.rows());
        if let Some(bad) = parts.iter().find(|p| p.rows() != rows) {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows],
                got: vec![bad.rows()],
            });
        }

        let total_cols: usize = parts.iter().map(|p| p.cols()).sum();
        let mut out = Tensor::try_zeros([rows, total_cols])?;
        let mut start = 0;
        for part in parts {
            let width = part.cols();
            if width == 0 {
                continue;
            }
            for (r, src) in part.data.chunks(width).enumerate() {
                let dst = r * total_cols + start;
                out.data[dst..dst + width].copy_from_slice(src);
            }
            start += width;
        }
        Ok(out)
    }
}

impl<T> Tensor<T, 2>
where
    T: TensorElem + Float,
{
    /// Row-wise softmax. Every row of the result sums to 1 (fully `-inf` rows become 0).
    pub fn softmax_rows(&self) -> Result<Self> {
        let data = cpu_softmax_rows(&self.data, &self.shape)?;
        Tensor::new(data, self.shape)
    }
}

impl<T> Tensor<T, 1>
where
    T: TensorElem + Float,
{
    /// Vector softmax, computed with the same max-subtracting kernel as
    /// [`Tensor::softmax_rows`] so both forms are equally stable.
    pub fn softmax(&self) -> Result<Self> {
        let len = self.shape[0];
        let data = cpu_softmax_rows(&self.data, &[1, len])?;
        Tensor::new(data, [len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let a = Tensor::<f32, 1>::new(vec![1.0, 2.0], [2]).unwrap();
        let b = Tensor::<f32, 1>::new(vec![3.0, 4.0], [2]).unwrap();

        assert_eq!((&a + &b).unwrap().data(), &[4.0, 6.0]);

        let f = Tensor::<f32, 1>::new(vec![1.0, 2.0, 3.0], [3]).unwrap();
        assert!(matches!(&a + &f, Err(TensorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_add_assign_and_scale() {
        let mut a = Tensor::<f32, 2>::new(vec![1.0; 4], [2, 2]).unwrap();
        let b = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        a.add_assign(&b).unwrap();
        assert_eq!(a.data(), &[2.0, 3.0, 4.0, 5.0]);

        a.scale(0.5);
        assert_eq!(a.data(), &[1.0, 1.5, 2.0, 2.5]);

        let c = Tensor::<f32, 2>::zeros([1, 4]);
        assert!(matches!(
            a.add_assign(&c),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_matmul_2d() {
        // A: [2, 3], B: [3, 2] -> C: [2, 2]
        let a = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap();
        let b = Tensor::<f32, 2>::new(vec![7.0, 8.0, 9.0, 1.0, 2.0, 3.0], [3, 2]).unwrap();

        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        // Row 0: 1*7 + 2*9 + 3*2 = 31, 1*8 + 2*1 + 3*3 = 19
        // Row 1: 4*7 + 5*9 + 6*2 = 85, 4*8 + 5*1 + 6*3 = 55
        assert_eq!(c.data(), &[31.0, 19.0, 85.0, 55.0]);
    }

    #[test]
    fn test_matmul_shape_error() {
        let a = Tensor::<f32, 2>::zeros([2, 3]);
        let b = Tensor::<f32, 2>::zeros([4, 2]); // inner 3 vs 4

        assert!(matches!(
            a.matmul(&b),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_matmul_identity() {
        let a = Tensor::<f32, 2>::new(vec![1.0, -2.0, 3.5, 0.25, 5.0, 6.0], [2, 3]).unwrap();
        let c = a.matmul(&Tensor::eye(3)).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_transpose() {
        let t = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]).unwrap();
        // [ 1 2 3 ]
        // [ 4 5 6 ]
        let t_t = t.transpose().unwrap();
        assert_eq!(t_t.shape(), &[3, 2]);
        assert_eq!(t_t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        // The source is untouched and the round trip is exact.
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(t_t.transpose().unwrap(), t);
    }

    #[test]
    fn test_slice_and_concat_cols() {
        let t = Tensor::<f32, 2>::new((0..8).map(|v| v as f32).collect(), [2, 4]).unwrap();
        let left = t.slice_cols(0, 2).unwrap();
        let right = t.slice_cols(2, 2).unwrap();
        assert_eq!(left.data(), &[0.0, 1.0, 4.0, 5.0]);
        assert_eq!(right.data(), &[2.0, 3.0, 6.0, 7.0]);

        let joined = Tensor::concat_cols(&[left, right]).unwrap();
        assert_eq!(joined, t);

        assert!(matches!(
            t.slice_cols(3, 2),
            Err(TensorError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            t.slice_cols(usize::MAX, 2),
            Err(TensorError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_concat_cols_row_mismatch() {
        let a = Tensor::<f32, 2>::zeros([2, 1]);
        let b = Tensor::<f32, 2>::zeros([3, 1]);
        assert!(matches!(
            Tensor::concat_cols(&[a, b]),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_row() {
        let t = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        assert_eq!(t.row(1).unwrap(), &[3.0, 4.0]);
        assert!(t.row(2).is_err());
    }

    #[test]
    fn test_softmax_vector_matches_rows() {
        let v = Tensor::<f32, 1>::new(vec![0.1, 2.0, -1.0, 3.0], [4]).unwrap();
        let as_row = v.clone().reshape([1, 4]).unwrap();

        let a = v.softmax().unwrap();
        let b = as_row.softmax_rows().unwrap();
        assert_eq!(a.data(), b.data());

        let sum: f32 = a.data().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_vector_is_stable() {
        let v = Tensor::<f32, 1>::new(vec![1000.0, 1000.0], [2]).unwrap();
        let s = v.softmax().unwrap();
        assert_eq!(s.data(), &[0.5, 0.5]);
    }

    #[test]
    fn test_map() {
        let a = Tensor::<f32, 2>::new(vec![1.0, 2.0, 3.0, 4.0], [2, 2]).unwrap();
        let b = a.map(|x| x + 0.5);
        assert_eq!(b.shape(), a.shape());
        assert_eq!(b.data(), &[1.5, 2.5, 3.5, 4.5]);
    }
}
