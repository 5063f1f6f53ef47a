//! Sinusoidal Positional Encoding.
//!
//! Attention is permutation-invariant: without position information, "the cat sat" and
//! "sat the cat" produce the same set of outputs. The encoder fixes this by adding a
//! deterministic signal to each embedding row before attention.
//!
//! For position $p$ and even dimension $i$:
//!
//! $$ PE(p, i) = \sin(p / 10000^{i/d}), \quad PE(p, i+1) = \cos(p / 10000^{i/d}) $$
//!
//! Each pair of columns oscillates at its own frequency, from one cycle per $2\pi$
//! positions down to one per $2\pi \cdot 10000$.

use crate::tensor::{Matrix, Result, Tensor, TensorElem, TensorError};
use num_traits::Float;

/// Precomputed `[max_len, d_model]` table. Immutable once built.
#[derive(Debug, Clone)]
pub struct PositionalEncoding<T: TensorElem = f32> {
    table: Matrix<T>,
}

impl<T: TensorElem + Float> PositionalEncoding<T> {
    /// Builds the table for positions `0..max_len`.
    ///
    /// The buffer starts zeroed and only in-range columns are written, so an odd
    /// `d_model` leaves no column undefined: the last (even) column gets the sine term.
    pub fn new(max_len: usize, d_model: usize) -> Result<Self> {
        let mut table = Tensor::try_zeros([max_len, d_model])?;
        if d_model > 0 {
            let base = T::from_f32(10_000.0).unwrap_or_else(T::one);
            let d = T::from_usize(d_model).unwrap_or_else(T::one);

            for (p, row) in table.data_mut().chunks_mut(d_model).enumerate() {
                let pos = T::from_usize(p).unwrap_or_else(T::zero);
                for i in (0..d_model).step_by(2) {
                    let exponent = T::from_usize(i).unwrap_or_else(T::zero) / d;
                    let angle = pos / base.powf(exponent);
                    row[i] = angle.sin();
                    if i + 1 < d_model {
                        row[i + 1] = angle.cos();
                    }
                }
            }
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &Matrix<T> {
        &self.table
    }

    pub fn max_len(&self) -> usize {
        self.table.rows()
    }

    pub fn d_model(&self) -> usize {
        self.table.cols()
    }

    /// Encoding vector for position `p`.
    pub fn row(&self, p: usize) -> Result<&[T]> {
        self.table.row(p)
    }

    /// Adds rows `0..seq_len` of the table onto `embeddings` in place.
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` if the sequence is longer than the table, `ShapeMismatch` if the
    /// widths differ.
    pub fn add_to(&self, embeddings: &mut Matrix<T>) -> Result<()> {
        let [seq_len, width] = *embeddings.shape();
        if width != self.d_model() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![seq_len, self.d_model()],
                got: vec![seq_len, width],
            });
        }
        if seq_len > self.max_len() {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![seq_len],
                shape: self.table.shape().to_vec(),
            });
        }

        let prefix = &self.table.data()[..seq_len * width];
        for (e, &pe) in embeddings.data_mut().iter_mut().zip(prefix.iter()) {
            *e += pe;
        }
        Ok(())
    }
}
