/// Fill two n x n matrices from the fixed linear-index formulas
/// `A[i] = i % 11 - 5` and `B[i] = (i - 5) % 11 - 5`, evaluated in signed
/// 64-bit arithmetic so B's leading entries take the truncated-remainder
/// values down to -10. No RNG: every strategy sees bit-identical inputs,
/// which is what makes cross-strategy comparison meaningful.
pub fn generate(n: usize) -> (Vec<f32>, Vec<f32>) {
    let len = n * n;
    let mut a = Vec::with_capacity(len);
    let mut b = Vec::with_capacity(len);
    for i in 0..len as i64 {
        a.push((i % 11 - 5) as f32);
        b.push(((i - 5) % 11 - 5) as f32);
    }
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_deterministic() {
        let (a1, b1) = generate(64);
        let (a2, b2) = generate(64);
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn known_leading_values() {
        let (a, b) = generate(8);
        assert_eq!(a[0], -5.0);
        assert_eq!(a[5], 0.0);
        assert_eq!(a[10], 5.0);
        assert_eq!(a[11], -5.0);
        // (0 - 5) % 11 is -5 under truncated remainder
        assert_eq!(b[0], -10.0);
        assert_eq!(b[5], -5.0);
        assert_eq!(b[15], 5.0);
    }

    #[test]
    fn both_signs_present() {
        let (a, b) = generate(16);
        assert!(a.iter().any(|&v| v > 0.0) && a.iter().any(|&v| v < 0.0));
        assert!(b.iter().any(|&v| v > 0.0) && b.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn values_stay_bounded() {
        let (a, b) = generate(32);
        assert!(a.iter().chain(b.iter()).all(|v| (-10.0..=5.0).contains(v)));
    }
}
