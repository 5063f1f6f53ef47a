//! Encoder dimensions.
//!
//! The block is sized entirely at runtime from an [`EncoderConfig`]. Configs can be built
//! in code, taken from the [`EncoderConfig::reference`] preset, or read from JSON:
//!
//! ```rust
//! use encoder_rs::config::EncoderConfig;
//!
//! let cfg = EncoderConfig::from_json_str(
//!     r#"{ "d_model": 8, "num_heads": 2, "vocab_size": 16, "seq_len": 4 }"#,
//! ).unwrap();
//! assert_eq!(cfg.d_k(), 4);
//! assert_eq!(cfg.nn_size, 32);
//! ```

use crate::nn::Activation;
use crate::tensor::{Result, TensorError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest sequence the positional table covers unless configured otherwise.
pub const DEFAULT_MAX_SEQ_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub d_model: usize,
    pub num_heads: usize,
    pub vocab_size: usize,
    pub seq_len: usize,
    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,
    /// Hidden width of the feed-forward block. `0` in JSON (or absent) means `4 * d_model`.
    #[serde(default)]
    pub nn_size: usize,
    /// Non-linearity between the two feed-forward layers (`"identity"`, `"relu"`, `"gelu"`).
    #[serde(default)]
    pub activation: Activation,
}

fn default_max_seq_len() -> usize {
    DEFAULT_MAX_SEQ_LEN
}

impl EncoderConfig {
    /// 256-wide, 4-head block over a 500-token vocabulary and 10-token sequences.
    pub fn reference() -> Self {
        Self {
            d_model: 256,
            num_heads: 4,
            vocab_size: 500,
            seq_len: 10,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            nn_size: 1024,
            activation: Activation::Identity,
        }
    }

    /// Per-head key/value width.
    pub fn d_k(&self) -> usize {
        self.d_model / self.num_heads.max(1)
    }

    /// Checks the dimensional invariants the encoder relies on.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for zero sizes or `seq_len > max_seq_len`, `ShapeMismatch` when
    /// `num_heads` does not divide `d_model`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("d_model", self.d_model),
            ("num_heads", self.num_heads),
            ("vocab_size", self.vocab_size),
            ("max_seq_len", self.max_seq_len),
            ("nn_size", self.nn_size),
        ] {
            if value == 0 {
                return Err(TensorError::InvalidConfig(format!("{name} must be non-zero")));
            }
        }
        if self.d_model % self.num_heads != 0 {
            return Err(TensorError::ShapeMismatch {
                expected: vec![self.num_heads * self.d_k()],
                got: vec![self.d_model],
            });
        }
        if self.seq_len > self.max_seq_len {
            return Err(TensorError::InvalidConfig(format!(
                "seq_len {} exceeds max_seq_len {}",
                self.seq_len, self.max_seq_len
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut cfg: Self = serde_json::from_str(json)
            .map_err(|e| TensorError::InvalidConfig(format!("malformed config: {e}")))?;
        if cfg.nn_size == 0 {
            cfg.nn_size = 4 * cfg.d_model;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TensorError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::reference()
    }
}
