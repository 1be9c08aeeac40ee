// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Creation budget enforced by the host factory.

use std::time::Duration;

use tokio::time::Instant;

/// Token bucket limiting how many objects may be created per second.
///
/// The bucket starts full. Each creation takes one token; tokens refill
/// continuously at `per_second` up to `burst`.
#[derive(Debug, Clone)]
pub struct CreationThrottle {
    burst: f64,
    per_second: f64,
    tokens: f64,
    last_refill: Instant,
}

impl CreationThrottle {
    /// Allows bursts of `burst` creations and `per_second` sustained.
    pub fn new(burst: u32, per_second: f64) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            burst,
            per_second: per_second.max(0.0),
            tokens: burst,
            last_refill: Instant::now(),
        }
    }

    /// Takes a token if one is available.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            log::trace!("Creation throttle exhausted.");
            false
        }
    }

    /// Whole tokens currently available.
    pub fn available(&mut self) -> u32 {
        self.refill();
        self.tokens.floor() as u32
    }

    /// Time until the next token is available.
    pub fn next_token_in(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 || self.per_second == 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64((1.0 - self.tokens) / self.per_second)
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.per_second).min(self.burst);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_rate_limited() {
        let mut throttle = CreationThrottle::new(2, 1.0);
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
        assert_eq!(throttle.next_token_in(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_refill_over_time() {
        let mut throttle = CreationThrottle::new(3, 2.0);
        for _ in 0..3 {
            assert!(throttle.try_acquire());
        }
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(throttle.available(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(throttle.available(), 3);
    }
}
