//! Survival countdown

/// Result of advancing the countdown one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownTick {
    /// New whole-second value, only when it changed
    pub seconds_changed: Option<u32>,
    /// Set exactly once when the countdown first reaches zero
    pub expired: bool,
}

/// Millisecond countdown that reports whole-second changes
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    remaining_ms: f32,
    max_ms: f32,
    last_seconds: u32,
    running: bool,
    expired_fired: bool,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        let max_ms = seconds.max(0.0) * 1000.0;
        Self {
            remaining_ms: max_ms,
            max_ms,
            last_seconds: Self::whole_seconds(max_ms),
            running: false,
            expired_fired: false,
        }
    }

    fn whole_seconds(ms: f32) -> u32 {
        (ms / 1000.0).ceil().max(0.0) as u32
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    /// Remaining time rounded up to whole seconds
    pub fn seconds(&self) -> u32 {
        Self::whole_seconds(self.remaining_ms)
    }

    pub fn max_seconds(&self) -> f32 {
        self.max_ms / 1000.0
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms <= 0.0
    }

    /// Set the remaining time directly, clamped to `[0, max]`
    pub fn set_remaining_ms(&mut self, ms: f32) {
        self.remaining_ms = ms.clamp(0.0, self.max_ms);
        if self.remaining_ms > 0.0 {
            self.expired_fired = false;
        }
    }

    /// Decrement by elapsed time; does nothing until started
    pub fn update(&mut self, dt_ms: f32) -> CountdownTick {
        let mut tick = CountdownTick::default();
        if !self.running {
            return tick;
        }
        self.remaining_ms = (self.remaining_ms - dt_ms.max(0.0)).max(0.0);

        let seconds = self.seconds();
        if seconds != self.last_seconds {
            self.last_seconds = seconds;
            tick.seconds_changed = Some(seconds);
        }
        if self.remaining_ms <= 0.0 && !self.expired_fired {
            self.expired_fired = true;
            tick.expired = true;
        }
        tick
    }

    /// Add time, capped at the initial maximum
    ///
    /// Returns the new whole-second value when it changed.
    pub fn add_seconds(&mut self, seconds: f32) -> Option<u32> {
        if seconds <= 0.0 {
            return None;
        }
        self.set_remaining_ms(self.remaining_ms + seconds * 1000.0);
        let whole = self.seconds();
        if whole != self.last_seconds {
            self.last_seconds = whole;
            Some(whole)
        } else {
            None
        }
    }

    /// Back to full time, stopped
    pub fn reset(&mut self) {
        *self = Self::new(self.max_seconds());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_until_started() {
        let mut countdown = Countdown::new(10.0);
        assert_eq!(countdown.update(5000.0), CountdownTick::default());
        assert_eq!(countdown.seconds(), 10);
    }

    #[test]
    fn test_publishes_only_on_whole_second_change() {
        let mut countdown = Countdown::new(2.0);
        countdown.start();
        assert_eq!(countdown.update(400.0).seconds_changed, None);
        assert_eq!(countdown.update(400.0).seconds_changed, None);
        // 2000 - 1200 = 800ms -> ceil to 1s
        assert_eq!(countdown.update(400.0).seconds_changed, Some(1));
        assert_eq!(countdown.update(100.0).seconds_changed, None);
    }

    #[test]
    fn test_expires_once_and_clamps() {
        let mut countdown = Countdown::new(1.0);
        countdown.start();
        countdown.set_remaining_ms(50.0);

        let tick = countdown.update(100.0);
        assert!(tick.expired);
        assert_eq!(countdown.remaining_ms(), 0.0);

        let tick = countdown.update(100.0);
        assert!(!tick.expired);
        assert_eq!(countdown.remaining_ms(), 0.0);
    }

    #[test]
    fn test_add_seconds_capped_at_max() {
        let mut countdown = Countdown::new(30.0);
        countdown.start();
        countdown.update(10_000.0);
        assert_eq!(countdown.seconds(), 20);

        assert_eq!(countdown.add_seconds(5.0), Some(25));
        assert_eq!(countdown.add_seconds(50.0), Some(30));
        assert_eq!(countdown.add_seconds(5.0), None);
        assert_eq!(countdown.remaining_ms(), 30_000.0);
    }

    #[test]
    fn test_reset_restores_full_time() {
        let mut countdown = Countdown::new(5.0);
        countdown.start();
        countdown.update(6000.0);
        assert!(countdown.is_expired());

        countdown.reset();
        assert!(!countdown.is_running());
        assert_eq!(countdown.seconds(), 5);
        countdown.start();
        countdown.update(5000.0);
        assert!(countdown.is_expired());
    }
}
