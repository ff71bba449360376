use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFunction {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl TimeFunction {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
        }
    }
}

/// `None` while still inside the delay window.
pub fn normalized_timeline_progress(
    elapsed: Duration,
    delay: Duration,
    duration: Duration,
) -> Option<f32> {
    if elapsed < delay {
        return None;
    }
    if duration.is_zero() {
        return Some(1.0);
    }
    Some(((elapsed - delay).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0))
}
