//! Stage countdown timer
//!
//! Counts down while active; the finish signal fires exactly once per start
//! cycle. Whole-second changes are reported for presentation.

/// Signal raised by a timer update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Reached zero this update
    Finished,
    /// Remaining whole seconds changed
    SecondsChanged(u32),
}

#[derive(Debug, Clone, Default)]
pub struct GameTimer {
    max_time: f32,
    current: f32,
    active: bool,
}

impl GameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_time(&mut self, max_time: f32) {
        self.max_time = max_time;
    }

    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    pub fn remaining(&self) -> f32 {
        self.current
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.current.max(0.0) as u32
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.active = true;
        self.current = self.max_time;
    }

    pub fn pause(&mut self) {
        self.active = false;
    }

    pub fn resume(&mut self) {
        self.active = true;
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.current = self.max_time;
    }

    /// Advance the countdown; inactive timers do nothing
    pub fn update(&mut self, dt: f32) -> Option<TimerSignal> {
        if !self.active {
            return None;
        }

        let prev_seconds = self.remaining_seconds();
        self.current -= dt;

        if self.current <= 0.0 {
            self.active = false;
            self.current = 0.0;
            return Some(TimerSignal::Finished);
        }

        // Entering the final second stays quiet; the finish signal follows
        let seconds = self.remaining_seconds();
        if seconds != prev_seconds && seconds > 0 {
            return Some(TimerSignal::SecondsChanged(seconds));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_fires_once_per_start() {
        let mut timer = GameTimer::new();
        timer.set_max_time(1.0);
        timer.start();

        assert_eq!(timer.update(0.6), None);
        assert_eq!(timer.update(0.6), Some(TimerSignal::Finished));
        assert!(!timer.is_active());
        // Further updates stay quiet until the next start
        assert_eq!(timer.update(1.0), None);

        timer.start();
        assert_eq!(timer.update(2.0), Some(TimerSignal::Finished));
    }

    #[test]
    fn test_pause_suspends_accumulation() {
        let mut timer = GameTimer::new();
        timer.set_max_time(10.0);
        timer.start();
        timer.update(1.0);
        timer.pause();

        let frozen = timer.remaining();
        assert_eq!(timer.update(5.0), None);
        assert_eq!(timer.remaining(), frozen);

        timer.resume();
        timer.update(1.0);
        assert!(timer.remaining() < frozen);
    }

    #[test]
    fn test_reset_restores_max_without_starting() {
        let mut timer = GameTimer::new();
        timer.set_max_time(10.0);
        timer.start();
        timer.update(3.0);
        timer.reset();

        assert!(!timer.is_active());
        assert_eq!(timer.remaining(), 10.0);
    }

    #[test]
    fn test_seconds_change_reported() {
        let mut timer = GameTimer::new();
        timer.set_max_time(5.0);
        timer.start();

        // 5.0 -> 4.7 crosses the five-second boundary
        assert_eq!(timer.update(0.3), Some(TimerSignal::SecondsChanged(4)));
        // 4.7 -> 4.2 stays within the same second
        assert_eq!(timer.update(0.5), None);
        assert_eq!(timer.update(0.3), Some(TimerSignal::SecondsChanged(3)));
    }

    #[test]
    fn test_final_second_change_is_silent() {
        let mut timer = GameTimer::new();
        timer.set_max_time(1.2);
        timer.start();

        // 1.2 -> 0.7 crosses into the final second without a change signal
        assert_eq!(timer.update(0.5), None);
        assert_eq!(timer.update(0.8), Some(TimerSignal::Finished));
    }
}
