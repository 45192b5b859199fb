//! Worker recycling with jitter.
//!
//! A worker restarts after serving `max_requests` plus a random extra in
//! `[0, max_requests_jitter]`, so workers forked together do not all
//! restart on the same request.

use rand::Rng;

use crate::config::schema::RecyclingConfig;

/// Recycling policy resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecyclePolicy {
    max_requests: u64,
    jitter: u64,
}

impl RecyclePolicy {
    pub fn new(config: &RecyclingConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            jitter: config.max_requests_jitter,
        }
    }

    /// Whether workers are recycled at all.
    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    /// Draw the threshold for a newly spawned worker.
    ///
    /// Returns `None` when recycling is disabled.
    pub fn threshold(&self) -> Option<u64> {
        self.threshold_with(&mut rand::thread_rng())
    }

    /// Draw a threshold from the given random source.
    pub fn threshold_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u64> {
        if !self.is_enabled() {
            return None;
        }
        let extra = if self.jitter > 0 {
            rng.gen_range(0..=self.jitter)
        } else {
            0
        };
        Some(self.max_requests.saturating_add(extra))
    }

    /// Whether a worker that has served `served` requests must be recycled.
    pub fn should_recycle(&self, served: u64, threshold: Option<u64>) -> bool {
        threshold.is_some_and(|limit| served >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_threshold_within_jitter_range() {
        let policy = RecyclePolicy::new(&RecyclingConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let t = policy.threshold_with(&mut rng).unwrap();
            assert!((5000..=5250).contains(&t), "threshold {t} out of range");
        }
    }

    #[test]
    fn test_disabled_recycling() {
        let policy = RecyclePolicy::new(&RecyclingConfig {
            max_requests: 0,
            max_requests_jitter: 250,
        });
        assert!(!policy.is_enabled());
        assert_eq!(policy.threshold(), None);
        assert!(!policy.should_recycle(u64::MAX, None));
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let policy = RecyclePolicy::new(&RecyclingConfig {
            max_requests: 10,
            max_requests_jitter: 0,
        });
        assert_eq!(policy.threshold(), Some(10));
    }

    #[test]
    fn test_should_recycle() {
        let policy = RecyclePolicy::new(&RecyclingConfig::default());
        assert!(!policy.should_recycle(5099, Some(5100)));
        assert!(policy.should_recycle(5100, Some(5100)));
    }
}
