//! Encoder building blocks.
//!
//! - [`Embedding`]: token id lookup with out-of-vocabulary fallback.
//! - [`PositionalEncoding`]: fixed sinusoidal position signal.
//! - [`AttentionHead`] / [`MultiHeadAttention`]: scaled dot-product attention.
//! - [`FeedForward`]: two [`Linear`] layers around an [`Activation`].

pub mod activation;
pub mod attention;
pub mod embedding;
pub mod feed_forward;
pub mod linear;
pub mod positional;

pub use activation::Activation;
pub use attention::{attention_weights, scaled_dot_product, AttentionHead, MultiHeadAttention};
pub use embedding::Embedding;
pub use feed_forward::FeedForward;
pub use linear::Linear;
pub use positional::PositionalEncoding;
