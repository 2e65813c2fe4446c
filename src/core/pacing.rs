use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Throttle between verification calls
///
/// Called once after every key with the running checked count. Implementations
/// block the calling thread; nothing else runs during a pause.
pub trait Pacer {
    fn pace(&mut self, checked: usize);
}

/// Never pauses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pace(&mut self, _checked: usize) {}
}

/// Pause for a uniformly random duration after every `every`-th check
///
/// Keeps outbound verification traffic below the rate that would get the
/// caller throttled or blocked by mail servers.
pub struct RandomPause {
    every: usize,
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl RandomPause {
    pub const DEFAULT_EVERY: usize = 10;
    pub const DEFAULT_MIN: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX: Duration = Duration::from_secs(3);

    /// Create a new pacer
    ///
    /// # Arguments
    /// * `every` - Pause after every this many checks (0 disables pausing)
    /// * `min` / `max` - Bounds of the pause; swapped if given in reverse
    pub fn new(every: usize, min: Duration, max: Duration) -> Self {
        Self::with_rng(every, min, max, StdRng::from_entropy())
    }

    /// Same as [`RandomPause::new`] with a fixed seed, for reproducible runs
    pub fn seeded(every: usize, min: Duration, max: Duration, seed: u64) -> Self {
        Self::with_rng(every, min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(every: usize, min: Duration, max: Duration, rng: StdRng) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { every, min, max, rng }
    }

    /// Pause owed after `checked` keys, if any
    pub fn next_pause(&mut self, checked: usize) -> Option<Duration> {
        if self.every == 0 || checked == 0 || checked % self.every != 0 {
            return None;
        }
        if self.min == self.max {
            return Some(self.min);
        }
        let secs = self.rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Some(Duration::from_secs_f64(secs))
    }
}

impl Default for RandomPause {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EVERY, Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }
}

impl Pacer for RandomPause {
    fn pace(&mut self, checked: usize) {
        if let Some(pause) = self.next_pause(checked) {
            debug!(checked, pause_ms = pause.as_millis() as u64, "pacing pause");
            thread::sleep(pause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauses_only_on_multiples() {
        let mut pacer = RandomPause::seeded(10, Duration::from_secs(1), Duration::from_secs(3), 7);

        for checked in 1..=35 {
            let pause = pacer.next_pause(checked);
            assert_eq!(pause.is_some(), checked % 10 == 0, "checked = {checked}");
        }
    }

    #[test]
    fn test_pause_within_bounds() {
        let min = Duration::from_secs(1);
        let max = Duration::from_secs(3);
        let mut pacer = RandomPause::seeded(1, min, max, 42);

        for checked in 1..=200 {
            let pause = pacer.next_pause(checked).unwrap();
            assert!(pause >= min && pause <= max, "{pause:?} out of range");
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomPause::seeded(10, Duration::from_secs(1), Duration::from_secs(3), 99);
        let mut b = RandomPause::seeded(10, Duration::from_secs(1), Duration::from_secs(3), 99);
        assert_eq!(a.next_pause(10), b.next_pause(10));
        assert_eq!(a.next_pause(20), b.next_pause(20));
    }

    #[test]
    fn test_zero_interval_never_pauses() {
        let mut pacer = RandomPause::seeded(0, Duration::from_secs(1), Duration::from_secs(3), 1);
        assert!((0..50).all(|checked| pacer.next_pause(checked).is_none()));
    }

    #[test]
    fn test_reversed_bounds_and_fixed_pause() {
        let mut reversed = RandomPause::seeded(1, Duration::from_secs(3), Duration::from_secs(1), 3);
        let pause = reversed.next_pause(1).unwrap();
        assert!(pause >= Duration::from_secs(1) && pause <= Duration::from_secs(3));

        let mut fixed = RandomPause::seeded(2, Duration::ZERO, Duration::ZERO, 3);
        assert_eq!(fixed.next_pause(2), Some(Duration::ZERO));
        fixed.pace(2);
    }
}
