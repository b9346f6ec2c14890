use std::cell::RefCell;
use std::rc::Rc;

use bevy_math::Vec3;

/// Shared handle to an animator instance.
///
/// Locomotion state and game code hold strong references; controller
/// mappings hold weak ones so a dropped animator never dangles.
pub type AnimatorInstanceRef = Rc<RefCell<AnimatorInstance>>;

/// A single animation controller: a named scalar (plus auxiliary vector)
/// the animator samples when evaluating its rules.
#[derive(Debug, Clone)]
pub struct Controller {
    name: String,
    lower: f32,
    upper: f32,
    current: f32,
    vector: Vec3,
    frozen: bool,
    clamp: bool,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            current: 0.0,
            vector: Vec3::ZERO,
            frozen: false,
            clamp: true,
        }
    }

    /// Controller with an explicit value range, clamping disabled.
    ///
    /// Useful for time-like controllers that wrap around their range.
    pub fn looping(name: impl Into<String>, lower: f32, upper: f32) -> Self {
        let mut controller = Self::new(name);
        controller.set_value_range(lower, upper);
        controller.clamp = false;
        controller
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minimum_value(&self) -> f32 {
        self.lower
    }

    pub fn maximum_value(&self) -> f32 {
        self.upper
    }

    /// Set the value range. The upper bound never drops below the lower one;
    /// the current value is re-sanitized against the new range.
    pub fn set_value_range(&mut self, lower: f32, upper: f32) {
        self.lower = lower;
        self.upper = upper.max(lower);
        self.current = self.sanitize(self.current);
    }

    pub fn current_value(&self) -> f32 {
        self.current
    }

    /// Set the current value. Ignored while frozen; otherwise clamped into
    /// the range if clamping is enabled, wrapped into it if not.
    pub fn set_current_value(&mut self, value: f32) {
        if self.frozen {
            return;
        }
        self.current = self.sanitize(value);
    }

    pub fn increment_current_value(&mut self, amount: f32) {
        self.set_current_value(self.current + amount);
    }

    pub fn vector_value(&self) -> Vec3 {
        self.vector
    }

    pub fn set_vector_value(&mut self, vector: Vec3) {
        if self.frozen {
            return;
        }
        self.vector = vector;
    }

    pub fn frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
        self.current = self.sanitize(self.current);
    }

    fn sanitize(&self, value: f32) -> f32 {
        let span = self.upper - self.lower;
        if span < 1e-5 {
            return self.lower;
        }
        if self.clamp {
            value.clamp(self.lower, self.upper)
        } else {
            self.lower + (value - self.lower).rem_euclid(span)
        }
    }
}

/// A set of controllers belonging to one animator.
///
/// Writers call [`notify_controller_changed`](Self::notify_controller_changed)
/// after mutating a controller; the animator evaluation drains the notified
/// set with [`take_changed`](Self::take_changed).
#[derive(Debug, Default)]
pub struct AnimatorInstance {
    controllers: Vec<Controller>,
    changed: Vec<usize>,
}

impl AnimatorInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> AnimatorInstanceRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Append a controller, returning its index.
    pub fn add_controller(&mut self, controller: Controller) -> usize {
        self.controllers.push(controller);
        self.controllers.len() - 1
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn controller(&self, index: usize) -> Option<&Controller> {
        self.controllers.get(index)
    }

    pub fn controller_mut(&mut self, index: usize) -> Option<&mut Controller> {
        self.controllers.get_mut(index)
    }

    pub fn index_of_controller_named(&self, name: &str) -> Option<usize> {
        self.controllers.iter().position(|c| c.name() == name)
    }

    /// Record that a controller value changed since the last evaluation.
    pub fn notify_controller_changed(&mut self, index: usize) {
        if index < self.controllers.len() && !self.changed.contains(&index) {
            self.changed.push(index);
        }
    }

    /// Drain the indices notified since the last call.
    pub fn take_changed(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_controller_stays_in_range() {
        let mut c = Controller::new("stance");
        c.set_value_range(-1.0, 1.0);
        c.set_current_value(3.5);
        assert_eq!(c.current_value(), 1.0);
        c.set_current_value(-3.5);
        assert_eq!(c.current_value(), -1.0);
    }

    #[test]
    fn looping_controller_wraps() {
        let mut c = Controller::looping("time.walk", 0.0, 2.0);
        c.set_current_value(2.5);
        assert!((c.current_value() - 0.5).abs() < 1e-6);
        c.set_current_value(-0.25);
        assert!((c.current_value() - 1.75).abs() < 1e-6);
    }

    #[test]
    fn frozen_controller_ignores_writes() {
        let mut c = Controller::new("look.vertical");
        c.set_value_range(-90.0, 90.0);
        c.set_current_value(10.0);
        c.set_frozen(true);
        c.set_current_value(50.0);
        assert_eq!(c.current_value(), 10.0);
    }

    #[test]
    fn degenerate_range_collapses_to_lower() {
        let mut c = Controller::new("flat");
        c.set_value_range(2.0, 2.0);
        c.set_current_value(7.0);
        assert_eq!(c.current_value(), 2.0);
    }

    #[test]
    fn change_notifications_drain_once() {
        let mut instance = AnimatorInstance::new();
        let a = instance.add_controller(Controller::new("a"));
        let b = instance.add_controller(Controller::new("b"));
        instance.notify_controller_changed(a);
        instance.notify_controller_changed(b);
        instance.notify_controller_changed(a);
        assert_eq!(instance.take_changed(), vec![a, b]);
        assert!(instance.take_changed().is_empty());
    }

    #[test]
    fn out_of_range_notification_is_dropped() {
        let mut instance = AnimatorInstance::new();
        instance.notify_controller_changed(3);
        assert!(instance.take_changed().is_empty());
    }
}
