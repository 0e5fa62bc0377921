//! Bounded retry with backoff

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::domain::conversion::ConversionError;

/// Bounded retry schedule: at most `max_attempts` checks, sleeping between
/// them with a delay that grows by `backoff_factor` up to `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(20, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    /// Same delay between every attempt
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff_factor: 1.0,
            max_delay: delay,
        }
    }

    pub fn with_backoff(mut self, factor: f64, max_delay: Duration) -> Self {
        self.backoff_factor = factor.max(1.0);
        self.max_delay = max_delay.max(self.initial_delay);
        self
    }

    /// Delay slept after attempt `attempt` (zero-based) fails
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt.min(64) as i32);
        let nanos = (self.initial_delay.as_nanos() as f64 * factor).min(self.max_delay.as_nanos() as f64);
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Longest total time spent sleeping before giving up
    pub fn max_wait(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_after(attempt))
            .sum()
    }
}

/// Poll until `path` exists, or fail with a timeout once the policy is spent
pub async fn wait_for_file(path: &Path, policy: &RetryPolicy) -> Result<(), ConversionError> {
    let mut waited = Duration::ZERO;

    for attempt in 0..policy.max_attempts {
        if tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), attempt, "File is ready");
            return Ok(());
        }

        if attempt + 1 < policy.max_attempts {
            let delay = policy.delay_after(attempt);
            tokio::time::sleep(delay).await;
            waited += delay;
        }
    }

    Err(ConversionError::Timeout {
        path: path.to_path_buf(),
        waited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delays() {
        let policy = RetryPolicy::fixed(4, Duration::from_millis(100));

        assert_eq!(policy.delay_after(0), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(100));
        assert_eq!(policy.max_wait(), Duration::from_millis(300));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::fixed(5, Duration::from_millis(100))
            .with_backoff(2.0, Duration::from_millis(300));

        assert_eq!(policy.delay_after(0), Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(300));
        assert_eq!(policy.delay_after(10), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_wait_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ready.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        wait_for_file(&path, &RetryPolicy::fixed(1, Duration::from_millis(1)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_file_appearing_later() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.pdf");

        let writer_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tokio::fs::write(writer_path, b"%PDF").await.unwrap();
        });

        wait_for_file(&path, &RetryPolicy::fixed(100, Duration::from_millis(10)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_missing_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.pdf");

        let err = wait_for_file(&path, &RetryPolicy::fixed(3, Duration::from_millis(5)))
            .await
            .unwrap_err();

        match err {
            ConversionError::Timeout { path: p, waited } => {
                assert_eq!(p, path);
                assert_eq!(waited, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
