//! Scaled Dot-Product and Multi-Head Attention.
//!
//! $$ \text{Attention}(Q, K, V) = \text{softmax}\left(\frac{Q K^T}{\sqrt{d_k}}\right) V $$
//!
//! Every query row is compared against every key row; the softmax turns those scores into
//! mixing weights over the value rows. With a **causal** mask, position $i$ only sees keys
//! $j \le i$: the upper triangle of the score matrix is set to $-\infty$ before the
//! softmax, which maps it to exactly 0.
//!
//! Multi-head attention runs several independent heads on the same input, each with its
//! own `[d_model, d_k]` projections, and concatenates their outputs along the feature axis.

use crate::init::{uniform, INIT_SCALE};
use crate::nn::Linear;
use crate::tensor::{Matrix, Result, Tensor, TensorElem, TensorError};
use encoder_rs_kernels::PARALLEL_THRESHOLD;
use num_traits::Float;
use rand::Rng;
use rayon::prelude::*;

/// Sets `scores[i, j] = -inf` for every `j > i`.
pub fn apply_causal_mask<T: TensorElem + Float>(scores: &mut Matrix<T>) {
    let cols = scores.cols();
    if cols == 0 {
        return;
    }
    for (i, row) in scores.data_mut().chunks_mut(cols).enumerate() {
        for v in row.iter_mut().skip(i + 1) {
            *v = T::neg_infinity();
        }
    }
}

/// Post-softmax attention weights `softmax(Q·Kᵀ / sqrt(d_k))`, shape `[S_q, S_k]`.
///
/// # Errors
///
/// `ShapeMismatch` when `Q` and `K` have different widths.
pub fn attention_weights<T: TensorElem + Float>(
    q: &Matrix<T>,
    k: &Matrix<T>,
    causal: bool,
) -> Result<Matrix<T>> {
    let d_k = q.cols();
    if k.cols() != d_k {
        return Err(TensorError::ShapeMismatch {
            expected: vec![k.rows(), d_k],
            got: k.shape().to_vec(),
        });
    }

    let k_t = k.transpose()?;
    let mut scores = q.matmul(&k_t)?;
    if d_k > 0 {
        let d = T::from_usize(d_k).unwrap_or_else(T::one);
        scores.scale(T::one() / d.sqrt());
    }
    if causal {
        apply_causal_mask(&mut scores);
    }
    scores.softmax_rows()
}

/// `softmax(Q·Kᵀ / sqrt(d_k)) · V` for one head.
///
/// An empty sequence (`S = 0`) yields an empty `[0, d_v]` result.
///
/// # Errors
///
/// `ShapeMismatch` when `Q`/`K` widths differ or `K` and `V` have different row counts.
pub fn scaled_dot_product<T: TensorElem + Float>(
    q: &Matrix<T>,
    k: &Matrix<T>,
    v: &Matrix<T>,
    causal: bool,
) -> Result<Matrix<T>> {
    if k.rows() != v.rows() {
        return Err(TensorError::ShapeMismatch {
            expected: vec![k.rows(), v.cols()],
            got: v.shape().to_vec(),
        });
    }
    let weights = attention_weights(q, k, causal)?;
    weights.matmul(v)
}

/// Projections `[d_model, d_k]` for one head.
#[derive(Debug, Clone)]
pub struct AttentionHead<T: TensorElem = f32> {
    pub w_q: Matrix<T>,
    pub w_k: Matrix<T>,
    pub w_v: Matrix<T>,
}

impl<T: TensorElem + Float> AttentionHead<T> {
    pub fn new(w_q: Matrix<T>, w_k: Matrix<T>, w_v: Matrix<T>) -> Result<Self> {
        if w_k.shape() != w_q.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: w_q.shape().to_vec(),
                got: w_k.shape().to_vec(),
            });
        }
        if w_v.shape() != w_k.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: w_k.shape().to_vec(),
                got: w_v.shape().to_vec(),
            });
        }
        Ok(Self { w_q, w_k, w_v })
    }

    pub fn random<R: Rng + ?Sized>(d_model: usize, d_k: usize, rng: &mut R) -> Result<Self> {
        Self::new(
            uniform([d_model, d_k], INIT_SCALE, rng)?,
            uniform([d_model, d_k], INIT_SCALE, rng)?,
            uniform([d_model, d_k], INIT_SCALE, rng)?,
        )
    }

    pub fn d_model(&self) -> usize {
        self.w_q.rows()
    }

    pub fn d_k(&self) -> usize {
        self.w_q.cols()
    }

    pub fn d_v(&self) -> usize {
        self.w_v.cols()
    }

    /// `x · W_Q`, `x · W_K`, `x · W_V`.
    pub fn project(&self, x: &Matrix<T>) -> Result<(Matrix<T>, Matrix<T>, Matrix<T>)> {
        Ok((
            x.matmul(&self.w_q)?,
            x.matmul(&self.w_k)?,
            x.matmul(&self.w_v)?,
        ))
    }

    /// `[S, d_model] -> [S, d_v]`.
    pub fn forward(&self, x: &Matrix<T>, causal: bool) -> Result<Matrix<T>> {
        let (q, k, v) = self.project(x)?;
        scaled_dot_product(&q, &k, &v, causal)
    }
}

/// Independent heads over a shared input plus an optional output projection `W_O`.
#[derive(Debug, Clone)]
pub struct MultiHeadAttention<T: TensorElem = f32> {
    heads: Vec<AttentionHead<T>>,
    w_o: Option<Linear<T>>,
}

impl<T: TensorElem + Float> MultiHeadAttention<T> {
    /// Every head must be `[d_model, d_model / num_heads]`, so the concatenation is
    /// `d_model` wide again, and `W_O` (if any) must be `[d_model, d_model]`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when heads disagree on `d_model` or `d_k`, when
    /// `num_heads * d_k != d_model`, or when `W_O` is not `[d_model, d_model]`.
    pub fn new(heads: Vec<AttentionHead<T>>, w_o: Option<Linear<T>>) -> Result<Self> {
        let Some(first) = heads.first() else {
            return Ok(Self { heads, w_o });
        };
        let (d_model, d_k) = (first.d_model(), first.d_k());

        if let Some(bad) = heads
            .iter()
            .find(|h| h.d_model() != d_model || h.d_k() != d_k)
        {
            return Err(TensorError::ShapeMismatch {
                expected: vec![d_model, d_k],
                got: vec![bad.d_model(), bad.d_k()],
            });
        }
        let concat_width = heads.len().saturating_mul(d_k);
        if concat_width != d_model {
            return Err(TensorError::ShapeMismatch {
                expected: vec![d_model],
                got: vec![concat_width],
            });
        }
        if let Some(proj) = &w_o {
            if proj.in_features() != d_model || proj.out_features() != d_model {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![d_model, d_model],
                    got: vec![proj.in_features(), proj.out_features()],
                });
            }
        }
        Ok(Self { heads, w_o })
    }

    /// Splits stacked `[num_heads * d_model, d_k]` buffers into per-head projections.
    /// Head `h` owns rows `h * d_model .. (h + 1) * d_model`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the buffers differ in shape, when their row count is not a
    /// multiple of `num_heads`, or when `d_k * num_heads != d_model`.
    pub fn from_stacked(
        w_q: &Matrix<T>,
        w_k: &Matrix<T>,
        w_v: &Matrix<T>,
        num_heads: usize,
        w_o: Option<Linear<T>>,
    ) -> Result<Self> {
        for w in [w_k, w_v] {
            if w.shape() != w_q.shape() {
                return Err(TensorError::ShapeMismatch {
                    expected: w_q.shape().to_vec(),
                    got: w.shape().to_vec(),
                });
            }
        }
        let [rows, d_k] = *w_q.shape();
        let expected_rows = d_k.saturating_mul(num_heads).saturating_mul(num_heads);
        if num_heads == 0 || rows != expected_rows {
            return Err(TensorError::ShapeMismatch {
                expected: vec![expected_rows, d_k],
                got: vec![rows, d_k],
            });
        }
        let d_model = rows / num_heads;

        let slice = |w: &Matrix<T>, h: usize| -> Result<Matrix<T>> {
            let start = h * d_model * d_k;
            Tensor::new(w.data()[start..start + d_model * d_k].to_vec(), [d_model, d_k])
        };
        let heads = (0..num_heads)
            .map(|h| AttentionHead::new(slice(w_q, h)?, slice(w_k, h)?, slice(w_v, h)?))
            .collect::<Result<Vec<_>>>()?;

        Self::new(heads, w_o)
    }

    /// Random heads of width `d_model / num_heads`, with a `[d_model, d_model]` `W_O` when
    /// `with_output` is set.
    pub fn random<R: Rng + ?Sized>(
        d_model: usize,
        num_heads: usize,
        with_output: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if num_heads == 0 || d_model % num_heads != 0 {
            return Err(TensorError::ShapeMismatch {
                expected: vec![num_heads],
                got: vec![d_model],
            });
        }
        let d_k = d_model / num_heads;
        let heads = (0..num_heads)
            .map(|_| AttentionHead::random(d_model, d_k, &mut *rng))
            .collect::<Result<Vec<_>>>()?;
        let w_o = if with_output {
            Some(Linear::random(d_model, d_model, rng)?)
        } else {
            None
        };
        Self::new(heads, w_o)
    }

    pub fn num_heads(&self) -> usize {
        self.heads.len()
    }

    pub fn head(&self, index: usize) -> Result<&AttentionHead<T>> {
        self.heads.get(index).ok_or(TensorError::IndexOutOfBounds {
            index: vec![index],
            shape: vec![self.heads.len()],
        })
    }

    pub fn heads(&self) -> &[AttentionHead<T>] {
        &self.heads
    }

    pub fn w_o(&self) -> Option<&Linear<T>> {
        self.w_o.as_ref()
    }

    /// Runs every head and concatenates: `[S, d_model] -> [S, num_heads * d_k]`.
    pub fn forward(&self, x: &Matrix<T>, causal: bool) -> Result<Matrix<T>> {
        let [s, d_model] = *x.shape();
        let d_k = self.heads.first().map_or(0, |h| h.d_k());
        let work = [s, d_model, d_k]
            .iter()
            .fold(self.num_heads(), |acc, &d| acc.saturating_mul(d));
        self.run_heads(x, causal, work >= PARALLEL_THRESHOLD)
    }

    /// [`forward`](Self::forward) followed by `W_O` when present.
    pub fn forward_projected(&self, x: &Matrix<T>, causal: bool) -> Result<Matrix<T>> {
        let concat = self.forward(x, causal)?;
        match &self.w_o {
            Some(proj) => proj.forward(&concat),
            None => Ok(concat),
        }
    }

    fn run_heads(&self, x: &Matrix<T>, causal: bool, parallel: bool) -> Result<Matrix<T>> {
        log::debug!(
            "attention: {} heads over {:?}, causal={}, parallel={}",
            self.num_heads(),
            x.shape(),
            causal,
            parallel
        );
        let outputs = if parallel {
            self.heads
                .par_iter()
                .map(|h| h.forward(x, causal))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.heads
                .iter()
                .map(|h| h.forward(x, causal))
                .collect::<Result<Vec<_>>>()?
        };

        if outputs.is_empty() {
            return Tensor::try_zeros([x.rows(), 0]);
        }
        Tensor::concat_cols(&outputs)
    }
}
