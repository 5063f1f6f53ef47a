use crate::init::{uniform, INIT_SCALE};
use crate::tensor::{Matrix, Result, Tensor, TensorElem};
use rand::Rng;

/// Token-id to dense-vector lookup table, `[vocab_size, d_model]`.
///
/// Ids outside the vocabulary fall back to row 0 instead of failing; the encoder treats
/// id 0 as its unknown token.
#[derive(Debug, Clone)]
pub struct Embedding<T: TensorElem = f32> {
    pub weight: Matrix<T>,
}

impl<T: TensorElem> Embedding<T> {
    pub fn new(weight: Matrix<T>) -> Self {
        Self { weight }
    }

    /// Stand-in table of `U[0, 1) * 0.1` values drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(
        vocab_size: usize,
        d_model: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Ok(Self::new(uniform([vocab_size, d_model], INIT_SCALE, rng)?))
    }

    pub fn vocab_size(&self) -> usize {
        self.weight.rows()
    }

    pub fn d_model(&self) -> usize {
        self.weight.cols()
    }

    /// Maps an id into `[0, vocab_size)`: out-of-range ids become 0.
    pub fn clamp_token(&self, token_id: usize) -> usize {
        if token_id < self.vocab_size() {
            token_id
        } else {
            log::debug!(
                "token id {} outside vocabulary of {}, using id 0",
                token_id,
                self.vocab_size()
            );
            0
        }
    }

    /// Gathers one table row per token: `[len] -> [len, d_model]`.
    pub fn lookup(&self, token_ids: &[usize]) -> Result<Matrix<T>> {
        let hidden_dim = self.d_model();
        let mut out = Tensor::try_zeros([token_ids.len(), hidden_dim])?;
        if hidden_dim == 0 || self.vocab_size() == 0 {
            return Ok(out);
        }

        let weight_data = self.weight.data();
        for (dst, &token_id) in out.data_mut().chunks_mut(hidden_dim).zip(token_ids) {
            let src_start = self.clamp_token(token_id) * hidden_dim;
            dst.copy_from_slice(&weight_data[src_start..src_start + hidden_dim]);
        }

        Ok(out)
    }
}
