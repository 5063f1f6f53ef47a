//! # encoder-rs
//!
//! `encoder-rs` computes the forward pass of a minimal transformer encoder block on the
//! CPU: token embedding lookup, sinusoidal positional encoding, multi-head scaled
//! dot-product attention (optionally causal) and a feed-forward projection.
//!
//! It is an inference kernel only. There is no training, weight persistence or
//! tokenizer; weights are either supplied by the caller or drawn from a seeded RNG.
//!
//! ## Modules
//!
//! - [`mod@tensor`]: row-major tensors, matmul, transpose and stable softmax.
//! - [`nn`]: embedding, positional encoding, attention, feed-forward.
//! - [`models`]: the assembled [`Encoder`](models::Encoder).
//! - [`config`]: runtime dimensions and JSON loading.
//! - [`init`]: seedable weight initialisation.
//!
//! ## Example
//!
//! ```rust
//! use encoder_rs::nn::scaled_dot_product;
//! use encoder_rs::tensor::Tensor;
//!
//! let q = Tensor::<f32, 2>::new(vec![1.0, 0.0, 0.0, 1.0], [2, 2]).unwrap();
//! let out = scaled_dot_product(&q, &q, &q, true).unwrap();
//!
//! // The first position can only attend to itself.
//! assert_eq!(out.row(0).unwrap(), &[1.0, 0.0]);
//! ```

pub mod config;
pub mod init;
pub mod models;
pub mod nn;
pub mod tensor;

pub use config::EncoderConfig;
pub use models::Encoder;
pub use tensor::{Matrix, Result, Tensor, TensorElem, TensorError};
