// Shared numeric helpers for the scoring layer.

/// Clamp a real signal to [0, 1]. Non-finite inputs collapse to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Logarithmic compression of a count: ln(1 + count).
pub fn log_compress(count: u32) -> f64 {
    (count as f64 + 1.0).ln()
}

/// Compute exponential decay for time-based scoring.
pub fn exponential_decay(age_hours: f64, half_life_hours: f64) -> f64 {
    (-age_hours / half_life_hours * 0.693).exp()
}

/// Saturating boost in [0, 1]: approaches 1 as the count grows, and
/// reaches it once the decay term underflows for very large counts.
pub fn saturating_boost(count: u32, scale: f64) -> f64 {
    1.0 - (-(count as f64) / scale).exp()
}

/// Hyperbolic repeat penalty: 1 / (1 + rate * count), floored.
pub fn hyperbolic_penalty(count: u32, rate: f64, floor: f64) -> f64 {
    (1.0 / (1.0 + rate * count as f64)).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_log_compress() {
        assert!((log_compress(0) - 0.0).abs() < 1e-9);
        // Diminishing returns: 10x the count is far from 10x the value.
        assert!(log_compress(1000) < log_compress(100) * 2.0);
    }

    #[test]
    fn test_exponential_decay() {
        // Should be about 0.5 after one half-life.
        let score = exponential_decay(24.0, 24.0);
        assert!((score - 0.5).abs() < 0.01);

        let score_fresh = exponential_decay(0.0, 24.0);
        assert!((score_fresh - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_saturating_boost() {
        assert_eq!(saturating_boost(0, 5.0), 0.0);
        assert!(saturating_boost(5, 5.0) < saturating_boost(50, 5.0));
        // The decay term underflows for huge counts, so the boost tops out
        // at exactly 1.0 instead of approaching it from below.
        assert!(saturating_boost(1_000_000, 5.0) <= 1.0);
        assert!(saturating_boost(u32::MAX, 5.0) <= 1.0);
        assert!(saturating_boost(1_000_000, 5.0) >= saturating_boost(1_000, 5.0));
    }

    #[test]
    fn test_hyperbolic_penalty() {
        assert_eq!(hyperbolic_penalty(0, 0.45, 0.38), 1.0);
        assert!(hyperbolic_penalty(1, 0.45, 0.38) < 1.0);
        // Floor holds for arbitrarily many repeats.
        assert_eq!(hyperbolic_penalty(10_000, 0.45, 0.38), 0.38);
    }
}
