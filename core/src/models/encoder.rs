use crate::config::EncoderConfig;
use crate::nn::{Embedding, FeedForward, MultiHeadAttention, PositionalEncoding};
use crate::tensor::{Matrix, Result, TensorElem};
use num_traits::Float;
use rand::Rng;

/// A single encoder block.
///
/// ```text
/// tokens -> Embedding -> + PositionalEncoding -> MultiHeadAttention -> [W_O] -> [FeedForward]
/// ```
#[derive(Debug, Clone)]
pub struct Encoder<T: TensorElem = f32> {
    pub config: EncoderConfig,
    pub embedding: Embedding<T>,
    pub positional: PositionalEncoding<T>,
    pub attention: MultiHeadAttention<T>,
    pub feed_forward: FeedForward<T>,
}

impl<T: TensorElem + Float> Encoder<T> {
    /// Builds a block with `U[0, 1) * 0.1` weights everywhere, drawn from `rng` in a fixed
    /// order (embedding, heads, `W_O`, feed-forward).
    pub fn random<R: Rng + ?Sized>(config: EncoderConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        log::info!(
            "building encoder: d_model={} heads={} vocab={} max_seq_len={}",
            config.d_model,
            config.num_heads,
            config.vocab_size,
            config.max_seq_len
        );

        let positional = PositionalEncoding::new(config.max_seq_len, config.d_model)?;
        let embedding = Embedding::random(config.vocab_size, config.d_model, rng)?;
        let attention = MultiHeadAttention::random(config.d_model, config.num_heads, true, rng)?;
        let feed_forward =
            FeedForward::random(config.d_model, config.nn_size, config.activation, rng)?;

        Ok(Self {
            config,
            embedding,
            positional,
            attention,
            feed_forward,
        })
    }

    /// Token embeddings with the positional signal added: `[len, d_model]`.
    pub fn embed(&self, token_ids: &[usize]) -> Result<Matrix<T>> {
        let mut x = self.embedding.lookup(token_ids)?;
        self.positional.add_to(&mut x)?;
        Ok(x)
    }

    /// Concatenated head outputs `[len, num_heads * d_k]`, without `W_O` or the feed-forward.
    pub fn attend(&self, token_ids: &[usize], causal: bool) -> Result<Matrix<T>> {
        let x = self.embed(token_ids)?;
        self.attention.forward(&x, causal)
    }

    /// Full block output `[len, d_model]`.
    pub fn forward(&self, token_ids: &[usize], causal: bool) -> Result<Matrix<T>> {
        let x = self.embed(token_ids)?;
        let attended = self.attention.forward_projected(&x, causal)?;
        let out = self.feed_forward.forward(&attended)?;
        log::debug!("encoder output {:?}", out.shape());
        Ok(out)
    }
}
