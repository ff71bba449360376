use std::time::Duration;

use super::{TimeFunction, normalized_timeline_progress};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeTransition {
    pub duration: Duration,
    pub delay: Duration,
    pub timing: TimeFunction,
}

impl FadeTransition {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            timing: TimeFunction::EaseInOut,
        }
    }

    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub const fn timing(mut self, timing: TimeFunction) -> Self {
        self.timing = timing;
        self
    }
}

/// A single running opacity animation, sampled against the frame clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTrack {
    from: f32,
    to: f32,
    started_at: Duration,
    transition: FadeTransition,
}

impl FadeTrack {
    pub fn start(from: f32, to: f32, now: Duration, transition: FadeTransition) -> Self {
        Self {
            from,
            to,
            started_at: now,
            transition,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn sample(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started_at);
        match normalized_timeline_progress(elapsed, self.transition.delay, self.transition.duration)
        {
            None => self.from,
            Some(progress) => {
                let eased = self.transition.timing.sample(progress);
                self.from + (self.to - self.from) * eased
            }
        }
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.transition.delay + self.transition.duration
    }
}

#[cfg(test)]
mod tests {
    use super::{FadeTrack, FadeTransition};
    use crate::transition::TimeFunction;
    use std::time::Duration;

    #[test]
    fn fade_runs_from_start_to_target() {
        let ms = Duration::from_millis;
        let transition = FadeTransition::new(ms(100)).timing(TimeFunction::Linear);
        let track = FadeTrack::start(1.0, 0.0, ms(1000), transition);
        assert_eq!(track.sample(ms(1000)), 1.0);
        assert!((track.sample(ms(1050)) - 0.5).abs() < 1e-6);
        assert_eq!(track.sample(ms(1200)), 0.0);
        assert!(!track.is_finished(ms(1099)));
        assert!(track.is_finished(ms(1100)));
    }
}
