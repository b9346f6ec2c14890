use std::cell::RefCell;
use std::rc::{Rc, Weak};

use animator::{AnimatorInstance, AnimatorInstanceRef};

use crate::state::Locomotion;

/// Locomotion quantity an animator controller can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerAttribute {
    /// Elapsed time; the controller accumulates it.
    ElapsedTime,
    LookVertical,
    LookHorizontal,
    /// Moving velocity magnitude in meters per second.
    MovingSpeed,
    /// Moving direction relative to the body in degrees.
    MovingDirection,
    /// Moving speed, negated while the direction points backwards.
    RelativeMovingSpeed,
    /// Turning velocity in degrees per second.
    TurningSpeed,
    Stance,
    /// Accumulated path length in meters.
    Displacement,
    /// Turn-in-place playback time, gated by the reset/reverse pulses.
    TimeTurnIp,
    TiltOffset,
    TiltVertical,
    TiltHorizontal,
    /// Displacement, negated while the direction points backwards.
    RelativeDisplacement,
}

/// Binds one animator controller to a locomotion attribute.
///
/// Holds its animator instance weakly: once the animator is gone the
/// mapping silently stops applying.
#[derive(Debug, Clone)]
pub struct ControllerMapping {
    instance: Weak<RefCell<AnimatorInstance>>,
    controller: usize,
    attribute: ControllerAttribute,
}

impl ControllerMapping {
    pub fn new(
        instance: &AnimatorInstanceRef,
        controller: usize,
        attribute: ControllerAttribute,
    ) -> Self {
        Self {
            instance: Rc::downgrade(instance),
            controller,
            attribute,
        }
    }

    pub fn controller(&self) -> usize {
        self.controller
    }

    pub fn attribute(&self) -> ControllerAttribute {
        self.attribute
    }

    fn is_for(&self, instance: &AnimatorInstanceRef, controller: usize) -> bool {
        self.controller == controller && std::ptr::eq(self.instance.as_ptr(), Rc::as_ptr(instance))
    }

    /// Push the mapped value onto the controller and notify the animator.
    /// A stale instance or out-of-range controller index is a no-op.
    pub fn apply(&self, locomotion: &Locomotion, elapsed: f32) {
        let Some(instance) = self.instance.upgrade() else {
            return;
        };
        let mut instance = instance.borrow_mut();
        let Some(controller) = instance.controller_mut(self.controller) else {
            return;
        };

        match self.attribute {
            ControllerAttribute::ElapsedTime => {
                controller.increment_current_value(elapsed);
            }
            ControllerAttribute::LookVertical => {
                controller.set_current_value(locomotion.look_vertical().value());
            }
            ControllerAttribute::LookHorizontal => {
                controller.set_current_value(locomotion.look_horizontal().value());
            }
            ControllerAttribute::MovingSpeed => {
                controller.set_current_value(locomotion.moving_speed());
            }
            ControllerAttribute::MovingDirection => {
                controller.set_current_value(locomotion.moving_direction());
            }
            ControllerAttribute::RelativeMovingSpeed => {
                if locomotion.moving_direction().abs() > 90.0 {
                    controller.set_current_value(-locomotion.moving_speed());
                } else {
                    controller.set_current_value(locomotion.moving_speed());
                }
            }
            ControllerAttribute::TurningSpeed => {
                controller.set_current_value(locomotion.turning_speed());
            }
            ControllerAttribute::Stance => {
                controller.set_current_value(locomotion.stance().value());
            }
            ControllerAttribute::Displacement => {
                controller.increment_current_value(locomotion.moving_speed().abs() * elapsed);
            }
            ControllerAttribute::RelativeDisplacement => {
                let step = locomotion.moving_speed().abs() * elapsed;
                if locomotion.moving_direction().abs() > 90.0 {
                    controller.increment_current_value(-step);
                } else {
                    controller.increment_current_value(step);
                }
            }
            ControllerAttribute::TimeTurnIp => {
                if locomotion.reverse_time_turn_ip() {
                    let flipped = controller.maximum_value() - controller.current_value();
                    controller.set_current_value(flipped);
                }
                if locomotion.reset_time_turn_ip() {
                    controller.set_current_value(elapsed);
                } else {
                    controller.increment_current_value(elapsed);
                }
            }
            ControllerAttribute::TiltOffset => {
                controller.set_current_value(locomotion.tilt_offset());
            }
            ControllerAttribute::TiltVertical => {
                controller.set_current_value(locomotion.tilt_vertical().value());
            }
            ControllerAttribute::TiltHorizontal => {
                controller.set_current_value(locomotion.tilt_horizontal().value());
            }
        }

        instance.notify_controller_changed(self.controller);
    }

    /// Post-physics variant: only the tilt attributes re-apply after the
    /// ground has been sampled; everything else stays untouched.
    pub fn apply_post(&self, locomotion: &Locomotion, _elapsed: f32) {
        let Some(instance) = self.instance.upgrade() else {
            return;
        };
        let mut instance = instance.borrow_mut();
        let Some(controller) = instance.controller_mut(self.controller) else {
            return;
        };

        match self.attribute {
            ControllerAttribute::TiltOffset => {
                controller.set_current_value(locomotion.tilt_offset());
            }
            ControllerAttribute::TiltVertical => {
                controller.set_current_value(locomotion.tilt_vertical().value());
            }
            ControllerAttribute::TiltHorizontal => {
                controller.set_current_value(locomotion.tilt_horizontal().value());
            }
            _ => return,
        }

        instance.notify_controller_changed(self.controller);
    }
}

impl Locomotion {
    pub fn controller_mappings(&self) -> &[ControllerMapping] {
        &self.mappings
    }

    pub fn index_of_controller_mapping(
        &self,
        instance: &AnimatorInstanceRef,
        controller: usize,
    ) -> Option<usize> {
        self.mappings
            .iter()
            .position(|mapping| mapping.is_for(instance, controller))
    }

    /// Map a controller to an attribute. An existing mapping for the same
    /// `(instance, controller)` pair is retargeted instead of duplicated.
    pub fn add_controller_mapping(
        &mut self,
        instance: &AnimatorInstanceRef,
        controller: usize,
        attribute: ControllerAttribute,
    ) {
        if let Some(index) = self.index_of_controller_mapping(instance, controller) {
            self.mappings[index].attribute = attribute;
        } else {
            self.mappings
                .push(ControllerMapping::new(instance, controller, attribute));
        }
    }

    pub fn remove_controller_mapping(&mut self, instance: &AnimatorInstanceRef, controller: usize) {
        if let Some(index) = self.index_of_controller_mapping(instance, controller) {
            self.mappings.remove(index);
        }
    }

    pub fn remove_all_controller_mappings(&mut self) {
        self.mappings.clear();
    }
}
