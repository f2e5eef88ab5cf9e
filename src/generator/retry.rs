//! 指数バックオフ
//!
//! 失敗した試行 n（0始まり）の後の待ち時間 = base × 2^n + jitter（0〜max_jitter の一様乱数）

use crate::config::Config;
use rand::Rng;
use std::time::Duration;

/// 2^n の上限（待ち時間の桁あふれ防止）
const MAX_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }

    /// 待ち時間なし（テスト用）
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// jitterを含まない待ち時間
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.min(MAX_EXPONENT))
    }

    pub fn delay_for<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rng.random_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_large_attempt_saturates_exponent() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(40), policy.backoff(MAX_EXPONENT));
    }

    #[test]
    fn test_delay_within_jitter_bounds() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for attempt in 0..4 {
            for _ in 0..50 {
                let delay = policy.delay_for(attempt, &mut rng);
                let base = policy.backoff(attempt);
                assert!(delay >= base);
                assert!(delay <= base + Duration::from_secs(1));
            }
        }
    }

    #[test]
    fn test_immediate_has_no_delay() {
        let policy = RetryPolicy::immediate(5);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.delay_for(3, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_from_config_clamps_attempts() {
        let config = Config {
            max_attempts: 0,
            base_delay_ms: 250,
            max_jitter_ms: 0,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    }
}
