use crate::nn::{Activation, Linear};
use crate::tensor::{Matrix, Result, TensorElem, TensorError};
use num_traits::Float;
use rand::Rng;

/// Position-wise feed-forward block: `w2(activation(w1(x)))`, `d_model -> hidden -> d_model`.
#[derive(Debug, Clone)]
pub struct FeedForward<T: TensorElem = f32> {
    pub w1: Linear<T>,
    pub w2: Linear<T>,
    pub activation: Activation,
}

impl<T: TensorElem + Float> FeedForward<T> {
    /// # Errors
    ///
    /// `ShapeMismatch` unless `w1: [d, h]` and `w2: [h, d]`.
    pub fn new(w1: Linear<T>, w2: Linear<T>, activation: Activation) -> Result<Self> {
        if w1.out_features() != w2.in_features() || w2.out_features() != w1.in_features() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![w1.out_features(), w1.in_features()],
                got: vec![w2.in_features(), w2.out_features()],
            });
        }
        Ok(Self { w1, w2, activation })
    }

    pub fn random<R: Rng + ?Sized>(
        d_model: usize,
        hidden: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        let w1 = Linear::random(d_model, hidden, rng)?;
        let w2 = Linear::random(hidden, d_model, rng)?;
        Self::new(w1, w2, activation)
    }

    pub fn hidden(&self) -> usize {
        self.w1.out_features()
    }

    pub fn forward(&self, x: &Matrix<T>) -> Result<Matrix<T>> {
        let h = self.w1.forward(x)?;
        let h = self.activation.apply(&h);
        self.w2.forward(&h)
    }
}
