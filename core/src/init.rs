//! Weight initialisation.
//!
//! Every random table in the crate is drawn from an RNG the caller passes in, so a fixed
//! seed reproduces the same weights on every run.

use crate::tensor::{Result, Tensor, TensorElem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale applied to `U[0, 1)` samples for stand-in weights.
pub const INIT_SCALE: f32 = 0.1;

/// Deterministic RNG for a given seed.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fills a tensor with `U[0, 1) * scale` samples.
pub fn uniform<T, const RANK: usize, R>(
    shape: [usize; RANK],
    scale: f32,
    rng: &mut R,
) -> Result<Tensor<T, RANK>>
where
    T: TensorElem,
    R: Rng + ?Sized,
{
    let mut out = Tensor::try_zeros(shape)?;
    for v in out.data_mut() {
        let sample = rng.random::<f32>() * scale;
        *v = T::from_f32(sample).unwrap_or_else(T::zero);
    }
    Ok(out)
}
