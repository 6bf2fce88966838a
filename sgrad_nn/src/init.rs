//! Weight initialization schemes.

use rand::Rng;

/// How initial weights are drawn. Biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Init {
    /// Glorot/Xavier uniform: U(-l, l) with l = sqrt(6 / (fan_in + fan_out)).
    #[default]
    Xavier,
    /// Uniform in [-limit, limit].
    Uniform { limit: f64 },
}

impl Init {
    /// Half-width of the sampling interval for a neuron with the given fan.
    pub fn limit(self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            Init::Xavier => (6.0 / (fan_in + fan_out).max(1) as f64).sqrt(),
            Init::Uniform { limit } => limit.abs(),
        }
    }

    /// Draw `n` weights for a neuron with the given fan.
    pub fn sample<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        fan_in: usize,
        fan_out: usize,
        n: usize,
    ) -> Vec<f64> {
        let limit = self.limit(fan_in, fan_out);
        if limit == 0.0 || !limit.is_finite() {
            return vec![0.0; n];
        }
        (0..n).map(|_| rng.gen_range(-limit..=limit)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_xavier_limit() {
        assert_abs_diff_eq!(Init::Xavier.limit(2, 4), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(Init::Xavier.limit(1, 1), 3.0_f64.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let limit = Init::Xavier.limit(8, 8);
        let w = Init::Xavier.sample(&mut rng, 8, 8, 500);
        assert_eq!(w.len(), 500);
        assert!(w.iter().all(|v| v.abs() <= limit));
        // Symmetric distribution: both signs show up.
        assert!(w.iter().any(|&v| v > 0.0));
        assert!(w.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn test_uniform_zero_limit() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = Init::Uniform { limit: 0.0 }.sample(&mut rng, 3, 1, 3);
        assert_eq!(w, vec![0.0; 3]);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = Init::Uniform { limit: 0.5 }.sample(&mut StdRng::seed_from_u64(9), 4, 2, 4);
        let b = Init::Uniform { limit: 0.5 }.sample(&mut StdRng::seed_from_u64(9), 4, 2, 4);
        assert_eq!(a, b);
    }
}
