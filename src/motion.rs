use std::time::{Duration, Instant};

use futures_timer::Delay;

pub const DEFAULT_HEIGHT_ANIMATION_MS: u64 = 350;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MotionLevel {
    Full,
    Reduced,
    None,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub fn apply(self, delta: f32) -> f32 {
        let delta = delta.clamp(0.0, 1.0);
        match self {
            Easing::Linear => gpui::linear(delta),
            Easing::EaseIn => gpui::quadratic(delta),
            Easing::EaseOut => gpui::ease_out_quint()(delta),
            Easing::EaseInOut => gpui::ease_in_out(delta),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeightAnimation {
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for HeightAnimation {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(DEFAULT_HEIGHT_ANIMATION_MS),
            easing: Easing::EaseOut,
        }
    }
}

impl HeightAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration = Duration::from_millis(duration_ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotionConfig {
    pub level: MotionLevel,
    pub height: HeightAnimation,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            level: MotionLevel::Full,
            height: HeightAnimation::default(),
        }
    }
}

impl MotionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: MotionLevel) -> Self {
        self.level = level;
        self
    }

    pub fn height(mut self, height: HeightAnimation) -> Self {
        self.height = height;
        self
    }

    pub fn allows_animation(&self) -> bool {
        self.level == MotionLevel::Full && !self.height.duration.is_zero()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightTween {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
}

impl HeightTween {
    pub fn new(from: f32, to: f32, animation: HeightAnimation, now: Instant) -> Self {
        Self {
            from,
            to,
            started_at: now,
            duration: animation.duration,
            easing: animation.easing,
        }
    }

    pub fn retarget(&self, to: f32, animation: HeightAnimation, now: Instant) -> Self {
        Self::new(self.value_at(now), to, animation, now)
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        (self.started_at + self.duration).saturating_duration_since(now)
    }

    pub async fn settled(self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            Delay::new(remaining).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(duration_ms: u64) -> HeightAnimation {
        HeightAnimation::new()
            .duration_ms(duration_ms)
            .easing(Easing::Linear)
    }

    #[test]
    fn defaults_match_the_documented_duration() {
        let config = MotionConfig::default();
        assert_eq!(config.height.duration, Duration::from_millis(350));
        assert!(config.allows_animation());
        assert!(!config.level(MotionLevel::Reduced).allows_animation());
        assert!(
            !MotionConfig::new()
                .height(HeightAnimation::new().duration_ms(0))
                .allows_animation()
        );
    }

    #[test]
    fn easing_curves_start_at_zero_and_end_at_one() {
        let curves = [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ];
        for easing in curves {
            assert!(easing.apply(0.0).abs() < 1e-4, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing:?}");
        }

        let quarter = curves.map(|easing| easing.apply(0.25));
        for (index, value) in quarter.iter().enumerate() {
            for other in &quarter[index + 1..] {
                assert!((value - other).abs() > 1e-3, "{quarter:?}");
            }
        }
    }

    #[test]
    fn tween_interpolates_and_lands_on_target() {
        let start = Instant::now();
        let tween = HeightTween::new(40.0, 60.0, linear(100), start);
        assert_eq!(tween.value_at(start), 40.0);
        assert!((tween.value_at(start + Duration::from_millis(50)) - 50.0).abs() < 0.01);
        assert_eq!(tween.value_at(start + Duration::from_millis(150)), 60.0);
        assert!(tween.is_finished(start + Duration::from_millis(100)));
    }

    #[test]
    fn retarget_begins_from_the_current_value() {
        let start = Instant::now();
        let tween = HeightTween::new(40.0, 60.0, linear(100), start);
        let midway = start + Duration::from_millis(50);
        let next = tween.retarget(80.0, linear(100), midway);
        assert!((next.value_at(midway) - 50.0).abs() < 0.01);
        assert_eq!(next.target(), 80.0);
        assert_eq!(next.remaining(midway), Duration::from_millis(100));
    }

    #[test]
    fn zero_duration_tween_is_immediately_settled() {
        let start = Instant::now();
        let tween = HeightTween::new(40.0, 60.0, linear(0), start);
        assert_eq!(tween.value_at(start), 60.0);
        futures::executor::block_on(tween.settled());
    }

    #[test]
    fn settled_waits_for_the_tween_to_finish() {
        let tween = HeightTween::new(10.0, 20.0, linear(20), Instant::now());
        futures::executor::block_on(tween.settled());
        assert!(tween.is_finished(Instant::now()));
    }
}
