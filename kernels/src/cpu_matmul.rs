use crate::{alloc_zeroed, check_len, KernelElem, KernelError, Result, PARALLEL_THRESHOLD};
use rayon::prelude::*;

/// CPU matrix multiplication: `[m, k] x [k, n] -> [m, n]`, all row-major.
///
/// The right-hand side is transposed into a scratch buffer first so the inner
/// dot product walks both operands sequentially. The scratch buffer is dropped
/// before returning.
///
/// # Errors
///
/// `ShapeMismatch` when the inner dimensions differ or a buffer length does not
/// match its shape, `AllocationFailure` when the output cannot be allocated.
pub fn cpu_matmul<T>(
    lhs_data: &[T],
    rhs_data: &[T],
    lhs_shape: &[usize; 2],
    rhs_shape: &[usize; 2],
) -> Result<Vec<T>>
where
    T: KernelElem,
{
    let [m, k] = *lhs_shape;
    let [k2, n] = *rhs_shape;

    if k != k2 {
        return Err(KernelError::ShapeMismatch {
            expected: vec![k, n],
            got: vec![k2, n],
        });
    }
    check_len(lhs_data, lhs_shape)?;
    check_len(rhs_data, rhs_shape)?;

    let mut out_data = alloc_zeroed(m * n)?;
    if m == 0 || n == 0 || k == 0 {
        return Ok(out_data);
    }

    // rhs is [K, N], rhs_t is [N, K]
    let rhs_t_data = crate::cpu_transpose(rhs_data, rhs_shape)?;

    let row_fn = |(i, out_row): (usize, &mut [T])| {
        let a_slice = &lhs_data[i * k..(i + 1) * k];
        for (j, out_elem) in out_row.iter_mut().enumerate() {
            let b_t_slice = &rhs_t_data[j * k..(j + 1) * k];
            let mut sum = T::zero();
            for (&val_a, &val_b) in a_slice.iter().zip(b_t_slice.iter()) {
                sum += val_a * val_b;
            }
            *out_elem = sum;
        }
    };

    if m * n * k >= PARALLEL_THRESHOLD {
        out_data.par_chunks_mut(n).enumerate().for_each(row_fn);
    } else {
        out_data.chunks_mut(n).enumerate().for_each(row_fn);
    }

    Ok(out_data)
}
