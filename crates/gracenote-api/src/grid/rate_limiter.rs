//! Grid API request pacing.

use std::time::{Duration, Instant};

/// Default pause between consecutive grid requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Keeps a minimum gap between consecutive grid requests.
///
/// The grid endpoint backs a public website; windows are fetched one at a
/// time and this only spaces them out.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct GridRateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Last request timestamp.
    last_request: Option<Instant>,
}

impl GridRateLimiter {
    /// Creates a new rate limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Creates a new rate limiter with [`DEFAULT_MIN_INTERVAL`].
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Waits until the next request is allowed.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }

        self.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_does_not_wait() {
        // Arrange
        let mut limiter = GridRateLimiter::new(Duration::from_secs(1));

        // Act
        let start = Instant::now();
        limiter.wait().await;

        // Assert
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_enforces_min_interval() {
        // Arrange
        let mut limiter = GridRateLimiter::new(Duration::from_millis(50));

        // Act
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;

        // Assert
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_default_interval() {
        // Arrange & Act
        let limiter = GridRateLimiter::default_interval();

        // Assert
        assert_eq!(limiter.min_interval, DEFAULT_MIN_INTERVAL);
        assert!(limiter.last_request.is_none());
    }
}
