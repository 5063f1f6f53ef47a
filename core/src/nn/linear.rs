use crate::init::{uniform, INIT_SCALE};
use crate::tensor::{Matrix, Result, TensorElem, TensorError};
use rand::Rng;

/// Dense layer `y = x · W + b`.
///
/// `weight` is stored `[in_features, out_features]` so the forward pass is a single
/// matmul with no transpose. `bias`, when present, is `[1, out_features]` and added to
/// every row.
#[derive(Debug, Clone)]
pub struct Linear<T: TensorElem = f32> {
    pub weight: Matrix<T>,
    pub bias: Option<Matrix<T>>,
}

impl<T: TensorElem> Linear<T> {
    pub fn new(weight: Matrix<T>, bias: Option<Matrix<T>>) -> Result<Self> {
        if let Some(b) = &bias {
            if b.shape() != &[1, weight.cols()] {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![1, weight.cols()],
                    got: b.shape().to_vec(),
                });
            }
        }
        Ok(Self { weight, bias })
    }

    /// Bias-free layer with `U[0, 1) * 0.1` weights.
    pub fn random<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Self::new(uniform([in_features, out_features], INIT_SCALE, rng)?, None)
    }

    pub fn in_features(&self) -> usize {
        self.weight.rows()
    }

    pub fn out_features(&self) -> usize {
        self.weight.cols()
    }

    /// `[rows, in] -> [rows, out]`.
    pub fn forward(&self, x: &Matrix<T>) -> Result<Matrix<T>> {
        let mut y = x.matmul(&self.weight)?;
        if let Some(bias) = &self.bias {
            let out = self.out_features();
            if out > 0 {
                let b = bias.data();
                for row in y.data_mut().chunks_mut(out) {
                    for (v, &bv) in row.iter_mut().zip(b.iter()) {
                        *v += bv;
                    }
                }
            }
        }
        Ok(y)
    }
}

impl<T: TensorElem> From<Matrix<T>> for Linear<T> {
    fn from(weight: Matrix<T>) -> Self {
        Self { weight, bias: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    #[test]
    fn test_forward_with_bias() {
        // x: [1, 2], W: [2, 3]
        let w = Tensor::new(vec![1.0, 0.0, 2.0, 0.0, 1.0, 3.0], [2, 3]).unwrap();
        let b = Tensor::new(vec![0.5, 0.5, 0.5], [1, 3]).unwrap();
        let layer = Linear::new(w, Some(b)).unwrap();

        let x = Tensor::new(vec![1.0f32, 2.0], [1, 2]).unwrap();
        let y = layer.forward(&x).unwrap();
        assert_eq!(y.data(), &[1.5, 2.5, 8.5]);
    }

    #[test]
    fn test_bad_bias_shape() {
        let w = Tensor::<f32, 2>::zeros([2, 3]);
        let b = Tensor::<f32, 2>::zeros([1, 2]);
        assert!(matches!(
            Linear::new(w, Some(b)),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_input_width_checked() {
        let layer = Linear::from(Tensor::<f32, 2>::zeros([4, 2]));
        let x = Tensor::<f32, 2>::zeros([3, 5]);
        assert!(layer.forward(&x).is_err());
    }
}
