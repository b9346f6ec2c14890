use bevy_math::Vec3;

// Adjust times at or below this snap straight to the goal.
const SNAP_ADJUST_TIME: f32 = 1e-5;
// Updates shorter than this are dropped outright.
const MIN_ELAPSED: f32 = 1e-6;

/// Scalar that chases a goal with a critically damped ease-in-ease-out
/// profile.
///
/// `adjust_time` is the time to cover roughly 85% of a step input;
/// `adjust_range` bounds the peak change rate at `adjust_range /
/// adjust_time`. The update never overshoots the goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothFloat {
    value: f32,
    goal: f32,
    adjust_time: f32,
    adjust_range: f32,
    change_speed: f32,
}

impl Default for SmoothFloat {
    fn default() -> Self {
        Self {
            value: 0.0,
            goal: 0.0,
            adjust_time: 1.0,
            adjust_range: 1.0,
            change_speed: 0.0,
        }
    }
}

impl SmoothFloat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    pub fn goal(&self) -> f32 {
        self.goal
    }

    pub fn set_goal(&mut self, goal: f32) {
        self.goal = goal;
    }

    pub fn adjust_time(&self) -> f32 {
        self.adjust_time
    }

    pub fn set_adjust_time(&mut self, time: f32) {
        self.adjust_time = time.max(0.0);
    }

    pub fn adjust_range(&self) -> f32 {
        self.adjust_range
    }

    pub fn set_adjust_range(&mut self, range: f32) {
        self.adjust_range = range.max(0.0);
    }

    pub fn change_speed(&self) -> f32 {
        self.change_speed
    }

    pub fn set_change_speed(&mut self, speed: f32) {
        self.change_speed = speed;
    }

    /// Zero value, goal and change speed; adjust parameters stay.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.goal = 0.0;
        self.change_speed = 0.0;
    }

    /// Snap the value onto the goal, clearing motion history.
    pub fn snap_to_goal(&mut self) {
        self.value = self.goal;
        self.change_speed = 0.0;
    }

    /// Advance the value toward the goal by `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32) {
        if elapsed < MIN_ELAPSED {
            return;
        }
        if self.adjust_time <= SNAP_ADJUST_TIME {
            self.value = self.goal;
            self.change_speed = 0.0;
            return;
        }

        // Two lerp passes toward the goal. One pass alone trails badly when
        // the goal moves every frame; two settle at ~86% of a step after one
        // adjust time.
        let factor = (elapsed / self.adjust_time).min(1.0);
        let mut next = self.value + (self.goal - self.value) * factor;
        next += (self.goal - next) * factor;

        let max_speed = self.adjust_range / self.adjust_time;
        let speed = ((next - self.value) / elapsed).clamp(-max_speed, max_speed);
        self.value += speed * elapsed;
        self.change_speed = speed;
    }
}

/// Vector companion of [`SmoothFloat`]: the same profile applied to a world
/// space 3-vector, with the change speed tracked as a magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothVec {
    value: Vec3,
    goal: Vec3,
    adjust_time: f32,
    adjust_range: f32,
    change_speed: f32,
}

impl Default for SmoothVec {
    fn default() -> Self {
        Self {
            value: Vec3::ZERO,
            goal: Vec3::ZERO,
            adjust_time: 1.0,
            adjust_range: 1.0,
            change_speed: 0.0,
        }
    }
}

impl SmoothVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Vec3 {
        self.value
    }

    pub fn set_value(&mut self, value: Vec3) {
        self.value = value;
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Vec3) {
        self.goal = goal;
    }

    pub fn adjust_time(&self) -> f32 {
        self.adjust_time
    }

    pub fn set_adjust_time(&mut self, time: f32) {
        self.adjust_time = time.max(0.0);
    }

    pub fn adjust_range(&self) -> f32 {
        self.adjust_range
    }

    pub fn set_adjust_range(&mut self, range: f32) {
        self.adjust_range = range.max(0.0);
    }

    pub fn change_speed(&self) -> f32 {
        self.change_speed
    }

    pub fn set_change_speed(&mut self, speed: f32) {
        self.change_speed = speed;
    }

    pub fn reset(&mut self) {
        self.value = Vec3::ZERO;
        self.goal = Vec3::ZERO;
        self.change_speed = 0.0;
    }

    pub fn snap_to_goal(&mut self) {
        self.value = self.goal;
        self.change_speed = 0.0;
    }

    pub fn update(&mut self, elapsed: f32) {
        if elapsed < MIN_ELAPSED {
            return;
        }
        if self.adjust_time <= SNAP_ADJUST_TIME {
            self.value = self.goal;
            self.change_speed = 0.0;
            return;
        }

        let factor = (elapsed / self.adjust_time).min(1.0);
        let mut next = self.value + (self.goal - self.value) * factor;
        next += (self.goal - next) * factor;

        let max_speed = self.adjust_range / self.adjust_time;
        let displacement = next - self.value;
        let speed = displacement.length() / elapsed;
        if speed > max_speed {
            self.value += displacement * (max_speed / speed);
            self.change_speed = max_speed;
        } else {
            self.value = next;
            self.change_speed = speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(adjust_time: f32, adjust_range: f32) -> SmoothFloat {
        let mut s = SmoothFloat::new();
        s.set_adjust_time(adjust_time);
        s.set_adjust_range(adjust_range);
        s
    }

    #[test]
    fn step_response_after_one_tick() {
        let mut s = scalar(0.5, 90.0);
        s.set_goal(45.0);
        s.update(0.1);
        // f = 0.2 applied twice: 45 * (1 - 0.8^2)
        assert!((s.value() - 16.2).abs() < 1e-3, "value: {}", s.value());
        assert!((s.change_speed() - 162.0).abs() < 1e-2);
    }

    #[test]
    fn step_response_settles_near_goal_after_adjust_time() {
        let mut s = scalar(0.5, 1000.0);
        s.set_goal(1.0);
        for _ in 0..50 {
            s.update(0.01);
        }
        assert!(s.value() > 0.85 && s.value() < 1.0, "value: {}", s.value());
    }

    #[test]
    fn never_overshoots() {
        let mut s = scalar(0.2, 1000.0);
        s.set_goal(10.0);
        let mut previous = s.value();
        for _ in 0..100 {
            s.update(0.05);
            assert!(s.value() <= 10.0 + 1e-6);
            assert!(s.value() >= previous - 1e-6);
            previous = s.value();
        }
        assert!((s.value() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn adjust_range_caps_the_rate() {
        let mut s = scalar(0.2, 4.0);
        s.set_goal(100.0);
        s.update(0.1);
        // Peak rate 4 / 0.2 = 20 units/s over 0.1 s.
        assert!((s.value() - 2.0).abs() < 1e-4, "value: {}", s.value());
        assert!((s.change_speed() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn zero_adjust_time_snaps() {
        let mut s = scalar(0.0, 1.0);
        s.set_value(5.0);
        s.set_goal(-3.0);
        s.update(0.016);
        assert_eq!(s.value(), -3.0);
        assert_eq!(s.change_speed(), 0.0);
    }

    #[test]
    fn zero_elapsed_changes_nothing() {
        let mut s = scalar(0.5, 90.0);
        s.set_value(1.0);
        s.set_goal(2.0);
        s.set_change_speed(7.0);
        s.update(0.0);
        assert_eq!(s.value(), 1.0);
        assert_eq!(s.change_speed(), 7.0);
    }

    #[test]
    fn reset_keeps_adjust_parameters() {
        let mut s = scalar(0.3, 12.0);
        s.set_value(4.0);
        s.set_goal(8.0);
        s.set_change_speed(2.0);
        s.reset();
        assert_eq!(s.value(), 0.0);
        assert_eq!(s.goal(), 0.0);
        assert_eq!(s.change_speed(), 0.0);
        assert_eq!(s.adjust_time(), 0.3);
        assert_eq!(s.adjust_range(), 12.0);
    }

    #[test]
    fn negative_parameters_clamp_to_zero() {
        let mut s = SmoothFloat::new();
        s.set_adjust_time(-1.0);
        s.set_adjust_range(-5.0);
        assert_eq!(s.adjust_time(), 0.0);
        assert_eq!(s.adjust_range(), 0.0);
    }

    #[test]
    fn vector_tracks_goal_and_caps_magnitude() {
        let mut v = SmoothVec::new();
        v.set_adjust_time(0.2);
        v.set_adjust_range(4.0);
        v.set_goal(Vec3::new(0.0, 0.0, 3.0));
        v.update(0.1);
        // Unclamped displacement would be 2.25; the 20 units/s cap allows 2.
        assert!((v.value().z - 2.0).abs() < 1e-4, "z: {}", v.value().z);
        assert!((v.change_speed() - 20.0).abs() < 1e-4);
        assert_eq!(v.value().x, 0.0);
        assert_eq!(v.value().y, 0.0);
    }

    #[test]
    fn vector_snap_and_reset() {
        let mut v = SmoothVec::new();
        v.set_adjust_time(0.0);
        v.set_goal(Vec3::new(1.0, 2.0, 3.0));
        v.update(0.016);
        assert_eq!(v.value(), Vec3::new(1.0, 2.0, 3.0));
        v.reset();
        assert_eq!(v.value(), Vec3::ZERO);
        assert_eq!(v.goal(), Vec3::ZERO);
    }
}
