//! Stat bar animation
//!
//! Surface-agnostic timing for the signboard's percentage bars. A bar starts
//! empty, waits [`STAT_FILL_DELAY`] after it is mounted, then eases toward
//! its target over [`STAT_FILL_DURATION`]. Surfaces sample
//! [`StatAnimation::value_at`] with the time since mount on every frame.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between mounting a bar and starting its fill
pub const STAT_FILL_DELAY: Duration = Duration::from_millis(300);

/// Length of the fill transition
pub const STAT_FILL_DURATION: Duration = Duration::from_millis(1000);

/// Easing functions for smooth animation
///
/// Only curves that stay inside `[0, 1]` are offered, so an eased value never
/// overshoots its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    Linear,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Quadratic ease out
    EaseOutQuad,

    /// Cubic ease out
    #[default]
    EaseOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Fill animation of one percentage bar
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatAnimation {
    target: u8,
    delay: Duration,
    duration: Duration,
    easing: EasingFunction,
}

impl StatAnimation {
    /// Animation toward `target` percent with the standard timing
    #[must_use]
    pub fn new(target: u8) -> Self {
        Self {
            target: target.min(100),
            delay: STAT_FILL_DELAY,
            duration: STAT_FILL_DURATION,
            easing: EasingFunction::default(),
        }
    }

    /// Override the easing curve
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Target percentage
    #[must_use]
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Displayed percentage `elapsed` after mount
    #[must_use]
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return 0.0;
        };
        if running >= self.duration || self.duration.is_zero() {
            return f32::from(self.target);
        }
        let t = running.as_secs_f32() / self.duration.as_secs_f32();
        f32::from(self.target) * self.easing.apply(t)
    }

    /// Whether the fill has reached its target
    #[must_use]
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.delay + self.duration
    }
}
