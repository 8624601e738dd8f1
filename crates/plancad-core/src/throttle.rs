//! 基于时间戳的节流
//!
//! 两次更新之间至少间隔 `interval`；不会延迟执行，只会跳过。

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 距离上次放行已超过间隔时放行并记录时间
    pub fn ready_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_interval() {
        let mut throttle = Throttle::from_millis(16);
        let t0 = Instant::now();

        assert!(throttle.ready_at(t0));
        assert!(!throttle.ready_at(t0 + Duration::from_millis(10)));
        assert!(throttle.ready_at(t0 + Duration::from_millis(16)));

        throttle.reset();
        assert!(throttle.ready_at(t0 + Duration::from_millis(17)));
    }
}
