//! Activation Functions.
//!
//! Activations introduce **non-linearity** between the two dense layers of the
//! feed-forward block. Without one, the block collapses to a single linear map, which is
//! exactly the reference wiring, so [`Activation::Identity`] is the default.
//!
//! - **ReLU**: $f(x) = \max(0, x)$.
//! - **GELU**: Gaussian Error Linear Unit, tanh approximation. Used in **GPT-2**, **BERT**.

use crate::tensor::{Tensor, TensorElem};
use num_traits::Float;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Identity,
    Relu,
    Gelu,
}

impl Activation {
    /// Applies the activation element-wise.
    pub fn apply<const RANK: usize, T: TensorElem + Float>(
        &self,
        x: &Tensor<T, RANK>,
    ) -> Tensor<T, RANK> {
        match self {
            Activation::Identity => x.clone(),
            Activation::Relu => x.map(relu),
            Activation::Gelu => x.map(gelu),
        }
    }
}

pub fn relu<T: TensorElem + Float>(x: T) -> T {
    x.max(T::zero())
}

/// Computes the GELU (Gaussian Error Linear Unit) activation function.
///
/// $$ \text{GELU}(x) \approx 0.5 x (1 + \tanh[\sqrt{2/\pi} (x + 0.044715 x^3)]) $$
pub fn gelu<T: TensorElem + Float>(x: T) -> T {
    let half = T::from_f32(0.5).unwrap_or_else(T::zero);
    let c = T::from_f32(0.044715).unwrap_or_else(T::zero);
    let sqrt_2_over_pi =
        T::from_f32((2.0f32 / std::f32::consts::PI).sqrt()).unwrap_or_else(T::zero);

    let inner = sqrt_2_over_pi * (x + c * x * x * x);
    half * x * (T::one() + inner.tanh())
}
