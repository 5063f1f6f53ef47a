use crate::{alloc_zeroed, check_len, KernelElem, Result, PARALLEL_THRESHOLD};
use rayon::prelude::*;

/// CPU transpose of a row-major `[m, n]` matrix into a freshly allocated `[n, m]` buffer.
///
/// The source slice is only read. Callers that still need the original layout keep
/// using it untouched while the transposed copy is consumed.
pub fn cpu_transpose<T>(data: &[T], shape: &[usize; 2]) -> Result<Vec<T>>
where
    T: KernelElem,
{
    check_len(data, shape)?;
    let [m, n] = *shape;
    let mut out_data = alloc_zeroed(m * n)?;
    if m == 0 || n == 0 {
        return Ok(out_data);
    }

    // Output row `c` is input column `c`.
    let fill_row = |(c, out_row): (usize, &mut [T])| {
        for (r, out_elem) in out_row.iter_mut().enumerate() {
            *out_elem = data[r * n + c];
        }
    };

    if m * n >= PARALLEL_THRESHOLD {
        out_data.par_chunks_mut(m).enumerate().for_each(fill_row);
    } else {
        out_data.chunks_mut(m).enumerate().for_each(fill_row);
    }

    Ok(out_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelError;

    #[test]
    fn test_transpose_simple() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3

        let result = cpu_transpose(&data, &[2, 3]).unwrap();
        // [1, 4]
        // [2, 5]
        // [3, 6]
        assert_eq!(result, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        // Source is left as it was.
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_transpose_large_matches_naive() {
        let (m, n) = (96, 80);
        let data: Vec<f32> = (0..m * n).map(|i| i as f32).collect();
        let result = cpu_transpose(&data, &[m, n]).unwrap();
        for r in 0..m {
            for c in 0..n {
                assert_eq!(result[c * m + r], data[r * n + c]);
            }
        }
    }

    #[test]
    fn test_transpose_empty() {
        let data: Vec<f32> = vec![];
        assert!(cpu_transpose(&data, &[0, 4]).unwrap().is_empty());
    }

    #[test]
    fn test_transpose_bad_len() {
        let err = cpu_transpose(&[1.0f32; 5], &[2, 3]);
        assert!(matches!(err, Err(KernelError::ShapeMismatch { .. })));
    }
}
