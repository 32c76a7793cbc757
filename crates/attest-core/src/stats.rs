//! Score statistics.
//!
//! Pure computation — no storage, no IO. All integer-only math over the
//! bounded score sequence of one assessment record (at most
//! [`MAX_ASSESSORS`](crate::constants::MAX_ASSESSORS) entries).

/// Integer mean of a score sequence, floor division.
///
/// Returns `0` for an empty slice.
///
/// # Examples
///
/// ```
/// use attest_core::stats::mean;
///
/// assert_eq!(mean(&[]), 0);
/// assert_eq!(mean(&[80, 75, 90]), 81);
/// assert_eq!(mean(&[10, 20, 30]), 20);
/// ```
pub fn mean(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u64 = scores.iter().map(|&s| s as u64).sum();
    (sum / scores.len() as u64) as u32
}

/// Sample-style spread of a score sequence around `mean`.
///
/// Squared deviations are averaged over `count - 1` when `count > 1`
/// (else the spread is `0`), then reduced with a floor integer square
/// root. Scores cap at 100, so `u64` intermediates cannot overflow.
///
/// # Examples
///
/// ```
/// use attest_core::stats::{dispersion, mean};
///
/// let scores = [80, 75, 90];
/// let m = mean(&scores); // 81
/// // deviations 1, 36, 81 -> sum 118, / 2 = 59, isqrt = 7
/// assert_eq!(dispersion(&scores, m), 7);
///
/// assert_eq!(dispersion(&[50], 50), 0);
/// assert_eq!(dispersion(&[], 0), 0);
/// ```
pub fn dispersion(scores: &[u32], mean: u32) -> u32 {
    if scores.len() < 2 {
        return 0;
    }
    let sum_sq: u64 = scores
        .iter()
        .map(|&s| {
            let d = s as i64 - mean as i64;
            (d * d) as u64
        })
        .sum();
    let variance = sum_sq / (scores.len() as u64 - 1);
    isqrt(variance) as u32
}

/// Absolute deviation of one score from the mean.
///
/// # Examples
///
/// ```
/// use attest_core::stats::deviation;
///
/// assert_eq!(deviation(90, 81), 9);
/// assert_eq!(deviation(75, 81), 6);
/// ```
pub fn deviation(score: u32, mean: u32) -> u32 {
    score.abs_diff(mean)
}

/// Compute `floor(sqrt(n))` using Newton's method.
///
/// The initial guess is set high enough that the iteration converges from
/// above; it terminates when the estimate stops decreasing. The result
/// satisfies `r * r <= n < (r + 1) * (r + 1)`.
///
/// Returns `0` for `n == 0`.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Overestimate: 2^ceil(bits/2) >= sqrt(n).
    let bits = 64 - n.leading_zeros();
    let mut x = 1u64 << bits.div_ceil(2);

    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // --- mean ---

    #[test]
    fn mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0);
    }

    #[test]
    fn mean_single_is_identity() {
        assert_eq!(mean(&[73]), 73);
    }

    #[test]
    fn mean_floors() {
        // (80 + 75 + 90) / 3 = 245 / 3 = 81.67 -> 81
        assert_eq!(mean(&[80, 75, 90]), 81);
        // (1 + 2) / 2 = 1.5 -> 1
        assert_eq!(mean(&[1, 2]), 1);
    }

    #[test]
    fn mean_uniform_is_value() {
        assert_eq!(mean(&[55; 20]), 55);
    }

    // --- dispersion ---

    #[test]
    fn dispersion_empty_and_single_are_zero() {
        assert_eq!(dispersion(&[], 0), 0);
        assert_eq!(dispersion(&[40], 40), 0);
    }

    #[test]
    fn dispersion_uniform_is_zero() {
        let scores = [70; 10];
        assert_eq!(dispersion(&scores, mean(&scores)), 0);
    }

    #[test]
    fn dispersion_known_values() {
        // scores 80, 75, 90; mean 81; deviations 1, 36, 81 -> 118/2 = 59 -> 7
        assert_eq!(dispersion(&[80, 75, 90], 81), 7);
        // scores 10, 20, 30; mean 20; deviations 100, 0, 100 -> 200/2 = 100 -> 10
        assert_eq!(dispersion(&[10, 20, 30], 20), 10);
    }

    #[test]
    fn dispersion_two_samples() {
        // scores 0, 100; mean 50; 2500 + 2500 = 5000 / 1 = 5000 -> 70
        assert_eq!(dispersion(&[0, 100], 50), 70);
    }

    // --- deviation ---

    #[test]
    fn deviation_is_symmetric() {
        assert_eq!(deviation(90, 81), deviation(81, 90));
        assert_eq!(deviation(20, 20), 0);
    }

    // --- isqrt ---

    #[test]
    fn isqrt_known_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(9), 3);
        assert_eq!(isqrt(59), 7);
        assert_eq!(isqrt(10_000), 100);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn isqrt_floor_property() {
        for n in [2u64, 3, 5, 8, 15, 24, 99, 118, 1000, 999_983] {
            let r = isqrt(n);
            assert!(r * r <= n, "isqrt({n}) = {r}: r^2 > n");
            assert!((r + 1) * (r + 1) > n, "isqrt({n}) = {r}: (r+1)^2 <= n");
        }
    }

    proptest! {
        #[test]
        fn isqrt_floor_property_holds(n in 0u64..=u32::MAX as u64 * u32::MAX as u64) {
            let r = isqrt(n);
            prop_assert!(r * r <= n);
            prop_assert!((r + 1).checked_mul(r + 1).map(|sq| sq > n).unwrap_or(true));
        }

        #[test]
        fn isqrt_monotonic(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(isqrt(lo) <= isqrt(hi));
        }

        #[test]
        fn mean_bounded_by_extremes(scores in prop::collection::vec(0u32..=100, 1..=20)) {
            let m = mean(&scores);
            let min = *scores.iter().min().unwrap();
            let max = *scores.iter().max().unwrap();
            prop_assert!(m >= min && m <= max);
        }

        #[test]
        fn dispersion_bounded_by_score_range(scores in prop::collection::vec(0u32..=100, 0..=20)) {
            let m = mean(&scores);
            // Deviations cap at 100, so the spread does too.
            prop_assert!(dispersion(&scores, m) <= 100);
        }
    }
}
