//! Assembled models.
//!
//! # Example
//!
//! ```rust
//! use encoder_rs::config::EncoderConfig;
//! use encoder_rs::init::seeded_rng;
//! use encoder_rs::models::Encoder;
//! use encoder_rs::nn::Activation;
//!
//! let config = EncoderConfig {
//!     d_model: 16,
//!     num_heads: 4,
//!     vocab_size: 100,
//!     seq_len: 6,
//!     max_seq_len: 64,
//!     nn_size: 64,
//!     activation: Activation::Gelu,
//! };
//! let encoder = Encoder::<f32>::random(config, &mut seeded_rng(0)).unwrap();
//!
//! let out = encoder.forward(&[4, 8, 15, 16, 23, 42], true).unwrap();
//! assert_eq!(out.shape(), &[6, 16]);
//! ```

pub mod encoder;

pub use encoder::Encoder;
