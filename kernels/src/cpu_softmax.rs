use crate::{alloc_zeroed, check_len, KernelFloat, Result, PARALLEL_THRESHOLD};
use rayon::prelude::*;

/// Numerically stable softmax applied independently to every row of a `[rows, cols]` matrix.
///
/// Each row has its maximum subtracted before exponentiation, so large finite inputs
/// never overflow. A row made only of `-inf` (fully masked) yields zeros instead of NaN.
/// A plain vector is the `[1, len]` case.
pub fn cpu_softmax_rows<T>(data: &[T], shape: &[usize; 2]) -> Result<Vec<T>>
where
    T: KernelFloat,
{
    check_len(data, shape)?;
    let [rows, cols] = *shape;
    let mut out_data = alloc_zeroed(rows * cols)?;
    if rows == 0 || cols == 0 {
        return Ok(out_data);
    }

    let row_fn = |(r, out_row): (usize, &mut [T])| {
        softmax_row(&data[r * cols..(r + 1) * cols], out_row);
    };

    if rows * cols >= PARALLEL_THRESHOLD {
        out_data.par_chunks_mut(cols).enumerate().for_each(row_fn);
    } else {
        out_data.chunks_mut(cols).enumerate().for_each(row_fn);
    }

    Ok(out_data)
}

fn softmax_row<T: KernelFloat>(input: &[T], output: &mut [T]) {
    let max_val = input
        .iter()
        .fold(T::neg_infinity(), |m, &v| if v > m { v } else { m });

    if max_val == T::neg_infinity() {
        output.iter_mut().for_each(|o| *o = T::zero());
        return;
    }

    let mut sum_exp = T::zero();
    for (o, &v) in output.iter_mut().zip(input.iter()) {
        let e = (v - max_val).exp();
        *o = e;
        sum_exp += e;
    }

    let inv_sum = T::one() / sum_exp;
    for o in output.iter_mut() {
        *o *= inv_sum;
    }
}
