use rand::Rng;

use crate::types::Percent;

/// Bernoulli gate: draw uniformly from 1..=100 and pass iff the draw is at most `pct`.
///
/// 0% never passes, 100% always passes.
pub fn bernoulli<R: Rng>(rng: &mut R, pct: Percent) -> bool {
    rng.gen_range(1..=100u8) <= pct.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pass_rate(pct: i64, draws: usize, seed: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let pct = Percent::new(pct).unwrap();
        let passed = (0..draws).filter(|_| bernoulli(&mut rng, pct)).count();
        passed as f64 / draws as f64
    }

    #[test]
    fn test_extremes_are_deterministic() {
        assert_eq!(pass_rate(0, 5_000, 1), 0.0);
        assert_eq!(pass_rate(100, 5_000, 2), 1.0);
    }

    #[test]
    fn test_rate_tracks_percentage() {
        let rate = pass_rate(30, 20_000, 42);
        assert!((rate - 0.30).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn test_monotone_in_pct() {
        let low = pass_rate(20, 10_000, 9);
        let high = pass_rate(80, 10_000, 9);
        assert!(high > low);
    }
}
