use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

/// Token bucket that paces requests; it delays callers, it never rejects them.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_rate: f64, // tokens per second
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        let capacity = burst.max(1) as f64;
        let refill_rate = requests_per_minute.max(1) as f64 / 60.0;

        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate,
        }
    }

    /// Waits until one request may be sent.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_rate)
            };

            debug!("Pacing Reddit requests, waiting {:?}", wait);
            sleep(wait).await;
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        state.tokens = (state.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        state.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn available(limiter: &RateLimiter) -> f64 {
        limiter.state.lock().await.tokens
    }

    #[tokio::test]
    async fn test_starts_with_full_burst() {
        let limiter = RateLimiter::new(100, 10);
        assert_eq!(limiter.capacity, 10.0);
        assert_eq!(available(&limiter).await, 10.0);
    }

    #[tokio::test]
    async fn test_acquire_consumes_tokens() {
        let limiter = RateLimiter::new(60, 3);
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(available(&limiter).await < 2.0);
    }

    #[tokio::test]
    async fn test_acquire_waits_when_empty() {
        // 6000/min refills one token every 10ms
        let limiter = RateLimiter::new(6000, 1);
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
