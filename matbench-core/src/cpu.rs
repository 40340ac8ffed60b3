use matbench_types::{coords, index};
use rayon::prelude::*;

/// Scalar baseline: C(i,j) = sum_k A(i,k) * B(k,j). The inner loop walks k
/// for fixed (i, j), so A is read row-contiguous and B column-strided.
/// Acceptable for a ground-truth baseline, not tuned for cache.
pub fn sequential(n: usize, a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut c = vec![0.0f32; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut acc = 0.0f32;
            for k in 0..n {
                acc += a[index(i, k, n)] * b[index(k, j, n)];
            }
            c[index(i, j, n)] = acc;
        }
    }
    c
}

/// Same contract, with the two outer loops collapsed into one flat range and
/// split across the rayon pool so load balances evenly. Each cell's inner
/// reduction stays sequential within one task, so results match the scalar
/// baseline bit-for-bit; the driver still gates with the tolerant check.
pub fn threaded(n: usize, a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut c = vec![0.0f32; n * n];
    c.par_iter_mut().enumerate().for_each(|(cell, out)| {
        let (i, j) = coords(cell, n);
        let mut acc = 0.0f32;
        for k in 0..n {
            acc += a[index(i, k, n)] * b[index(k, j, n)];
        }
        *out = acc;
    });
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;

    #[test]
    fn sequential_2x2_by_hand() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        assert_eq!(sequential(2, &a, &b), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn identity_is_a_fixed_point() {
        let n = 5;
        let (a, _) = generate(n);
        let mut eye = vec![0.0f32; n * n];
        for i in 0..n {
            eye[index(i, i, n)] = 1.0;
        }
        assert_eq!(sequential(n, &a, &eye), a);
    }

    #[test]
    fn threaded_matches_sequential_exactly() {
        let n = 48;
        let (a, b) = generate(n);
        assert_eq!(threaded(n, &a, &b), sequential(n, &a, &b));
    }
}
