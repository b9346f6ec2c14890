use bevy_math::{Quat, Vec3};

use crate::collision::{AiColliderRef, CollisionTestRef};
use crate::mapping::ControllerMapping;
use crate::smooth::{SmoothFloat, SmoothVec};
use crate::tilt::{TiltCornerTests, TiltMode};
use crate::util;
use crate::Error;

/// Per-actor locomotion state machine.
///
/// Translates look angles, a desired move direction and speed, stance, and
/// pending body rotation into frame-coherent orientation, velocities, body
/// tilt and animation controller values. One instance per controllable
/// actor; the owning game code feeds inputs and runs the per-tick update
/// pipeline (see the `update_*` methods).
#[derive(Debug)]
pub struct Locomotion {
    pub(crate) can_turn: bool,
    pub(crate) always_limit_left_right: bool,

    pub(crate) limit_look_up: f32,
    pub(crate) limit_look_down: f32,
    pub(crate) look_vertical: SmoothFloat,

    pub(crate) limit_look_left: f32,
    pub(crate) limit_look_right: f32,
    pub(crate) look_horizontal: SmoothFloat,
    pub(crate) turn_adjust_look_horizontal: bool,

    pub(crate) analog_moving_horizontal: SmoothFloat,
    pub(crate) analog_moving_vertical: f32,
    pub(crate) turn_horizontal: f32,
    pub(crate) analog_moving_speed: f32,

    pub(crate) adjust_time_orientation: f32,
    pub(crate) climb_limit_accel: f32,
    pub(crate) orientation: f32,
    pub(crate) orientation_quaternion: Quat,
    pub(crate) turning_speed: f32,
    pub(crate) angular_velocity: Vec3,

    pub(crate) is_moving: bool,
    pub(crate) moving_speed: f32,
    pub(crate) moving_orientation: f32,
    pub(crate) moving_direction: f32,

    pub(crate) linear_velocity: SmoothVec,

    pub(crate) stance: SmoothFloat,

    pub(crate) is_turning_ip: bool,
    pub(crate) adjust_time_turn_ip: f32,
    pub(crate) turn_ip: f32,
    pub(crate) reset_time_turn_ip: bool,
    pub(crate) reverse_time_turn_ip: bool,

    pub(crate) can_turn_in_place: bool,
    pub(crate) limit_turn_in_place_left: f32,
    pub(crate) limit_turn_in_place_right: f32,

    pub(crate) reset_time_walk: bool,

    pub(crate) can_tilt: bool,
    pub(crate) tilt_mode: TiltMode,
    pub(crate) tilt_single_test: Option<CollisionTestRef>,
    pub(crate) tilt_corner_tests: Option<TiltCornerTests>,

    pub(crate) limit_tilt_up: f32,
    pub(crate) limit_tilt_down: f32,
    pub(crate) tilt_vertical: SmoothFloat,

    pub(crate) limit_tilt_left: f32,
    pub(crate) limit_tilt_right: f32,
    pub(crate) tilt_horizontal: SmoothFloat,

    pub(crate) tilt_offset: f32,

    pub(crate) mappings: Vec<ControllerMapping>,

    pub(crate) ai_collider: Option<AiColliderRef>,
    pub(crate) update_ai_collider_angular_velocity: bool,
}

impl Default for Locomotion {
    fn default() -> Self {
        let mut look_vertical = SmoothFloat::new();
        look_vertical.set_adjust_time(0.0);
        look_vertical.set_adjust_range(90.0);

        let mut look_horizontal = SmoothFloat::new();
        look_horizontal.set_adjust_time(0.0);
        look_horizontal.set_adjust_range(90.0);

        let mut analog_moving_horizontal = SmoothFloat::new();
        analog_moving_horizontal.set_adjust_time(0.0);
        analog_moving_horizontal.set_adjust_range(90.0);

        let mut linear_velocity = SmoothVec::new();
        linear_velocity.set_adjust_time(0.5);
        linear_velocity.set_adjust_range(4.0);

        let mut stance = SmoothFloat::new();
        stance.set_adjust_time(0.5);
        stance.set_adjust_range(1.0);

        let mut tilt_vertical = SmoothFloat::new();
        tilt_vertical.set_adjust_time(0.5);
        tilt_vertical.set_adjust_range(30.0);

        let mut tilt_horizontal = SmoothFloat::new();
        tilt_horizontal.set_adjust_time(0.5);
        tilt_horizontal.set_adjust_range(30.0);

        let adjust_time_orientation = 1.0;

        Self {
            can_turn: true,
            always_limit_left_right: false,

            limit_look_up: 90.0,
            limit_look_down: -90.0,
            look_vertical,

            limit_look_left: -90.0,
            limit_look_right: 90.0,
            look_horizontal,
            turn_adjust_look_horizontal: true,

            analog_moving_horizontal,
            analog_moving_vertical: 0.0,
            turn_horizontal: 0.0,
            analog_moving_speed: 0.0,

            adjust_time_orientation,
            climb_limit_accel: util::climb_limit_accel_from_adjust_time(adjust_time_orientation),
            orientation: 0.0,
            orientation_quaternion: Quat::IDENTITY,
            turning_speed: 0.0,
            angular_velocity: Vec3::ZERO,

            is_moving: false,
            moving_speed: 0.0,
            moving_orientation: 0.0,
            moving_direction: 0.0,

            linear_velocity,

            stance,

            is_turning_ip: false,
            adjust_time_turn_ip: 1.0,
            turn_ip: 0.0,
            reset_time_turn_ip: false,
            reverse_time_turn_ip: false,

            can_turn_in_place: true,
            limit_turn_in_place_left: -70.0,
            limit_turn_in_place_right: 70.0,

            reset_time_walk: false,

            can_tilt: false,
            tilt_mode: TiltMode::None,
            tilt_single_test: None,
            tilt_corner_tests: None,

            limit_tilt_up: 30.0,
            limit_tilt_down: -30.0,
            tilt_vertical,

            limit_tilt_left: -30.0,
            limit_tilt_right: 30.0,
            tilt_horizontal,

            tilt_offset: 0.0,

            mappings: Vec::new(),

            ai_collider: None,
            update_ai_collider_angular_velocity: false,
        }
    }
}

impl Locomotion {
    pub fn new() -> Self {
        Self::default()
    }

    // --- turning configuration ---

    pub fn can_turn(&self) -> bool {
        self.can_turn
    }

    pub fn set_can_turn(&mut self, can_turn: bool) {
        self.can_turn = can_turn;
    }

    pub fn always_limit_left_right(&self) -> bool {
        self.always_limit_left_right
    }

    pub fn set_always_limit_left_right(&mut self, always_limit: bool) {
        self.always_limit_left_right = always_limit;
    }

    // --- looking up/down ---

    pub fn limit_look_up(&self) -> f32 {
        self.limit_look_up
    }

    /// Changing a look limit re-clamps the current value and goal.
    pub fn set_limit_look_up(&mut self, limit: f32) {
        self.limit_look_up = limit;
        self.set_look_vertical(self.look_vertical.value());
        self.set_look_vertical_goal(self.look_vertical.goal());
    }

    pub fn limit_look_down(&self) -> f32 {
        self.limit_look_down
    }

    pub fn set_limit_look_down(&mut self, limit: f32) {
        self.limit_look_down = limit;
        self.set_look_vertical(self.look_vertical.value());
        self.set_look_vertical_goal(self.look_vertical.goal());
    }

    pub fn look_vertical(&self) -> &SmoothFloat {
        &self.look_vertical
    }

    pub fn set_look_vertical(&mut self, value: f32) {
        self.look_vertical
            .set_value(value.clamp(self.limit_look_down, self.limit_look_up));
    }

    pub fn set_look_vertical_goal(&mut self, goal: f32) {
        self.look_vertical
            .set_goal(goal.clamp(self.limit_look_down, self.limit_look_up));
    }

    pub fn set_adjust_time_look_vertical(&mut self, time: f32) {
        self.look_vertical.set_adjust_time(time);
    }

    pub fn set_adjust_range_look_vertical(&mut self, range: f32) {
        self.look_vertical.set_adjust_range(range);
    }

    // --- looking left/right ---

    pub fn limit_look_left(&self) -> f32 {
        self.limit_look_left
    }

    pub fn set_limit_look_left(&mut self, limit: f32) {
        self.limit_look_left = limit;
        self.set_look_horizontal(self.look_horizontal.value());
        self.set_look_horizontal_goal(self.look_horizontal.goal());
    }

    pub fn limit_look_right(&self) -> f32 {
        self.limit_look_right
    }

    pub fn set_limit_look_right(&mut self, limit: f32) {
        self.limit_look_right = limit;
        self.set_look_horizontal(self.look_horizontal.value());
        self.set_look_horizontal_goal(self.look_horizontal.goal());
    }

    pub fn look_horizontal(&self) -> &SmoothFloat {
        &self.look_horizontal
    }

    pub fn set_look_horizontal(&mut self, value: f32) {
        self.look_horizontal
            .set_value(value.clamp(self.limit_look_left, self.limit_look_right));
    }

    pub fn set_look_horizontal_goal(&mut self, goal: f32) {
        self.look_horizontal
            .set_goal(goal.clamp(self.limit_look_left, self.limit_look_right));
    }

    pub fn set_adjust_time_look_horizontal(&mut self, time: f32) {
        self.look_horizontal.set_adjust_time(time);
    }

    pub fn set_adjust_range_look_horizontal(&mut self, range: f32) {
        self.look_horizontal.set_adjust_range(range);
    }

    pub fn turn_adjust_look_horizontal(&self) -> bool {
        self.turn_adjust_look_horizontal
    }

    /// If set, turning the body also shifts the look and analog-moving
    /// goals so the view stays fixed in world space while the body catches
    /// up.
    pub fn set_turn_adjust_look_horizontal(&mut self, turn_adjust: bool) {
        self.turn_adjust_look_horizontal = turn_adjust;
    }

    // --- analog movement input ---

    pub fn analog_moving_horizontal(&self) -> &SmoothFloat {
        &self.analog_moving_horizontal
    }

    pub fn set_analog_moving_horizontal_goal(&mut self, goal: f32) {
        self.analog_moving_horizontal
            .set_goal(goal.clamp(-180.0, 180.0));
    }

    pub fn set_adjust_time_analog_moving_horizontal(&mut self, time: f32) {
        self.analog_moving_horizontal.set_adjust_time(time);
    }

    pub fn set_adjust_range_analog_moving_horizontal(&mut self, range: f32) {
        self.analog_moving_horizontal.set_adjust_range(range);
    }

    /// Stored for input symmetry; nothing in the update pipeline consumes
    /// it and it is not part of the persisted state.
    pub fn analog_moving_vertical(&self) -> f32 {
        self.analog_moving_vertical
    }

    pub fn set_analog_moving_vertical(&mut self, value: f32) {
        self.analog_moving_vertical = value.clamp(-90.0, 90.0);
    }

    /// Pending body rotation in degrees, consumed over the following ticks.
    pub fn turn_horizontal(&self) -> f32 {
        self.turn_horizontal
    }

    pub fn set_turn_horizontal(&mut self, value: f32) {
        self.turn_horizontal = value;
    }

    pub fn analog_moving_speed(&self) -> f32 {
        self.analog_moving_speed
    }

    pub fn set_analog_moving_speed(&mut self, value: f32) {
        self.analog_moving_speed = value;
    }

    // --- orientation ---

    pub fn adjust_time_orientation(&self) -> f32 {
        self.adjust_time_orientation
    }

    pub fn set_adjust_time_orientation(&mut self, time: f32) -> Result<(), Error> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::InvalidParameter(
                "adjust_time_orientation requires a finite non-negative time",
            ));
        }
        self.adjust_time_orientation = time;
        self.climb_limit_accel = util::climb_limit_accel_from_adjust_time(time);
        Ok(())
    }

    pub fn climb_limit_accel(&self) -> f32 {
        self.climb_limit_accel
    }

    /// Body orientation around world Y in degrees, `[0, 360)`.
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: f32) {
        self.orientation = util::wrap_degrees(orientation);
        self.orientation_quaternion = Quat::from_rotation_y(self.orientation.to_radians());
    }

    pub fn orientation_quaternion(&self) -> Quat {
        self.orientation_quaternion
    }

    pub fn set_orientation_quaternion(&mut self, orientation: Quat) {
        self.orientation_quaternion = orientation;
    }

    /// Turning speed in degrees per second.
    pub fn turning_speed(&self) -> f32 {
        self.turning_speed
    }

    pub fn set_turning_speed(&mut self, speed: f32) {
        self.turning_speed = speed;
        self.angular_velocity = Vec3::new(0.0, speed, 0.0);
    }

    /// Angular velocity in degrees per second.
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    // --- moving state ---

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn set_is_moving(&mut self, is_moving: bool) {
        self.is_moving = is_moving;
    }

    /// Magnitude of the smoothed linear velocity, meters per second.
    pub fn moving_speed(&self) -> f32 {
        self.moving_speed
    }

    pub fn set_moving_speed(&mut self, speed: f32) {
        self.moving_speed = speed;
    }

    /// World-space movement heading in degrees, `[0, 360)`.
    pub fn moving_orientation(&self) -> f32 {
        self.moving_orientation
    }

    pub fn set_moving_orientation(&mut self, orientation: f32) {
        self.moving_orientation = util::wrap_degrees(orientation);
    }

    /// Movement direction relative to the body in degrees, `[-180, 180)`.
    pub fn moving_direction(&self) -> f32 {
        self.moving_direction
    }

    pub fn set_moving_direction(&mut self, direction: f32) {
        self.moving_direction = util::wrap_signed_degrees(direction);
    }

    pub fn linear_velocity(&self) -> &SmoothVec {
        &self.linear_velocity
    }

    pub fn set_adjust_time_linear_velocity(&mut self, time: f32) {
        self.linear_velocity.set_adjust_time(time);
    }

    pub fn set_adjust_range_linear_velocity(&mut self, range: f32) {
        self.linear_velocity.set_adjust_range(range);
    }

    // --- stance ---

    pub fn stance(&self) -> &SmoothFloat {
        &self.stance
    }

    pub fn set_stance(&mut self, value: f32) {
        self.stance.set_value(value);
    }

    pub fn set_stance_goal(&mut self, goal: f32) {
        self.stance.set_goal(goal);
    }

    pub fn set_adjust_time_stance(&mut self, time: f32) {
        self.stance.set_adjust_time(time);
    }

    pub fn set_adjust_range_stance(&mut self, range: f32) {
        self.stance.set_adjust_range(range);
    }

    // --- turning in place ---

    pub fn is_turning_ip(&self) -> bool {
        self.is_turning_ip
    }

    pub fn set_is_turning_ip(&mut self, turning: bool) {
        self.is_turning_ip = turning;
    }

    pub fn adjust_time_turn_ip(&self) -> f32 {
        self.adjust_time_turn_ip
    }

    pub fn set_adjust_time_turn_ip(&mut self, time: f32) -> Result<(), Error> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::InvalidParameter(
                "adjust_time_turn_ip requires a finite non-negative time",
            ));
        }
        self.adjust_time_turn_ip = time;
        Ok(())
    }

    /// Remaining turn-in-place rotation in degrees, signed.
    pub fn turn_ip(&self) -> f32 {
        self.turn_ip
    }

    pub fn set_turn_ip(&mut self, value: f32) {
        self.turn_ip = value;
    }

    pub fn reset_time_turn_ip(&self) -> bool {
        self.reset_time_turn_ip
    }

    pub fn set_reset_time_turn_ip(&mut self, reset: bool) {
        self.reset_time_turn_ip = reset;
    }

    pub fn reverse_time_turn_ip(&self) -> bool {
        self.reverse_time_turn_ip
    }

    pub fn set_reverse_time_turn_ip(&mut self, reverse: bool) {
        self.reverse_time_turn_ip = reverse;
    }

    pub fn can_turn_in_place(&self) -> bool {
        self.can_turn_in_place
    }

    pub fn set_can_turn_in_place(&mut self, can_turn_in_place: bool) {
        self.can_turn_in_place = can_turn_in_place;
    }

    pub fn limit_turn_in_place_left(&self) -> f32 {
        self.limit_turn_in_place_left
    }

    pub fn set_limit_turn_in_place_left(&mut self, limit: f32) {
        self.limit_turn_in_place_left = limit;
    }

    pub fn limit_turn_in_place_right(&self) -> f32 {
        self.limit_turn_in_place_right
    }

    pub fn set_limit_turn_in_place_right(&mut self, limit: f32) {
        self.limit_turn_in_place_right = limit;
    }

    pub fn reset_time_walk(&self) -> bool {
        self.reset_time_walk
    }

    pub fn set_reset_time_walk(&mut self, reset: bool) {
        self.reset_time_walk = reset;
    }

    // --- external attachments ---

    pub fn ai_collider(&self) -> Option<&AiColliderRef> {
        self.ai_collider.as_ref()
    }

    pub fn set_ai_collider(&mut self, collider: Option<AiColliderRef>) {
        self.ai_collider = collider;
    }

    pub fn update_ai_collider_angular_velocity(&self) -> bool {
        self.update_ai_collider_angular_velocity
    }

    pub fn set_update_ai_collider_angular_velocity(&mut self, update: bool) {
        self.update_ai_collider_angular_velocity = update;
    }

    // --- cancels ---

    /// Drop all pending input: analog movement, pending turn, and the look
    /// and stance goals collapse onto their current values.
    pub fn cancel_input(&mut self) {
        self.analog_moving_horizontal.reset();
        self.analog_moving_speed = 0.0;
        self.turn_horizontal = 0.0;
        self.look_horizontal.set_goal(self.look_horizontal.value());
        self.look_vertical.set_goal(self.look_vertical.value());
        self.stance.set_goal(self.stance.value());
    }

    /// Cancel input and kill all movement-derived state.
    pub fn cancel_movement(&mut self) {
        self.cancel_input();

        self.linear_velocity.reset();
        self.moving_speed = 0.0;
        self.moving_orientation = 0.0;
        self.moving_direction = 0.0;
        self.reset_time_walk = false;
    }

    /// Cancel movement and turning; tilt goals freeze at their values.
    pub fn cancel_motion(&mut self) {
        self.cancel_movement();
        self.cancel_turn_in_place();

        self.set_turning_speed(0.0);
        self.tilt_horizontal.set_goal(self.tilt_horizontal.value());
        self.tilt_vertical.set_goal(self.tilt_vertical.value());
    }

    /// Abort a running turn-in-place including its pulse flags.
    pub fn cancel_turn_in_place(&mut self) {
        self.turn_ip = 0.0;
        self.is_turning_ip = false;
        self.reverse_time_turn_ip = false;
        self.reset_time_turn_ip = false;
    }

    /// Fold the entire look-driven rotation into the pending body turn so
    /// the next updates rotate the body to face the looking direction.
    pub fn force_body_adjustment(&mut self) {
        if !self.can_turn {
            return;
        }

        self.turn_horizontal += self.look_horizontal.goal();

        if self.can_turn_in_place {
            self.turn_horizontal += self.turn_ip;
        }
        self.is_turning_ip = false;
        self.turn_ip = 0.0;
        self.reset_time_turn_ip = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_actor() {
        let locomotion = Locomotion::new();
        assert!(locomotion.can_turn());
        assert!(locomotion.can_turn_in_place());
        assert!(locomotion.turn_adjust_look_horizontal());
        assert!(!locomotion.can_tilt());
        assert_eq!(locomotion.limit_look_up(), 90.0);
        assert_eq!(locomotion.limit_look_down(), -90.0);
        assert_eq!(locomotion.limit_turn_in_place_right(), 70.0);
        assert_eq!(locomotion.adjust_time_orientation(), 1.0);
        assert!((locomotion.climb_limit_accel() - 4.0).abs() < 1e-4);
        assert_eq!(locomotion.orientation(), 0.0);
        assert_eq!(locomotion.orientation_quaternion(), Quat::IDENTITY);
        assert_eq!(locomotion.linear_velocity().adjust_time(), 0.5);
        assert_eq!(locomotion.linear_velocity().adjust_range(), 4.0);
    }

    #[test]
    fn look_vertical_setters_clamp_to_limits() {
        let mut locomotion = Locomotion::new();
        locomotion.set_limit_look_up(30.0);
        locomotion.set_limit_look_down(-10.0);
        locomotion.set_look_vertical(45.0);
        locomotion.set_look_vertical_goal(-45.0);
        assert_eq!(locomotion.look_vertical().value(), 30.0);
        assert_eq!(locomotion.look_vertical().goal(), -10.0);
    }

    #[test]
    fn shrinking_look_limit_reclamps_current_state() {
        let mut locomotion = Locomotion::new();
        locomotion.set_look_vertical(80.0);
        locomotion.set_look_vertical_goal(80.0);
        locomotion.set_limit_look_up(45.0);
        assert_eq!(locomotion.look_vertical().value(), 45.0);
        assert_eq!(locomotion.look_vertical().goal(), 45.0);
    }

    #[test]
    fn look_horizontal_setters_clamp_to_limits() {
        let mut locomotion = Locomotion::new();
        locomotion.set_look_horizontal_goal(100.0);
        assert_eq!(locomotion.look_horizontal().goal(), 90.0);
        locomotion.set_look_horizontal(-120.0);
        assert_eq!(locomotion.look_horizontal().value(), -90.0);
    }

    #[test]
    fn orientation_wraps_and_refreshes_quaternion() {
        let mut locomotion = Locomotion::new();
        locomotion.set_orientation(360.0);
        assert_eq!(locomotion.orientation(), 0.0);
        assert_eq!(locomotion.orientation_quaternion(), Quat::IDENTITY);

        locomotion.set_orientation(450.0);
        assert_eq!(locomotion.orientation(), 90.0);
        let expected = Quat::from_rotation_y(90.0f32.to_radians());
        assert!(locomotion.orientation_quaternion().dot(expected).abs() > 0.9999);
    }

    #[test]
    fn turning_speed_drives_angular_velocity() {
        let mut locomotion = Locomotion::new();
        locomotion.set_turning_speed(42.0);
        assert_eq!(locomotion.angular_velocity(), Vec3::new(0.0, 42.0, 0.0));
    }

    #[test]
    fn adjust_time_setters_reject_bad_input() {
        let mut locomotion = Locomotion::new();
        assert!(locomotion.set_adjust_time_orientation(-0.5).is_err());
        assert!(locomotion.set_adjust_time_orientation(f32::NAN).is_err());
        assert_eq!(locomotion.adjust_time_orientation(), 1.0);
        assert!(locomotion.set_adjust_time_orientation(0.5).is_ok());
        assert!((locomotion.climb_limit_accel() - 16.0).abs() < 1e-3);

        assert!(locomotion.set_adjust_time_turn_ip(-1.0).is_err());
        assert!(locomotion.set_adjust_time_turn_ip(2.0).is_ok());
        assert_eq!(locomotion.adjust_time_turn_ip(), 2.0);
    }

    #[test]
    fn analog_input_clamps() {
        let mut locomotion = Locomotion::new();
        locomotion.set_analog_moving_horizontal_goal(270.0);
        assert_eq!(locomotion.analog_moving_horizontal().goal(), 180.0);
        locomotion.set_analog_moving_vertical(135.0);
        assert_eq!(locomotion.analog_moving_vertical(), 90.0);
    }

    #[test]
    fn cancel_input_freezes_goals() {
        let mut locomotion = Locomotion::new();
        locomotion.set_adjust_time_look_vertical(0.5);
        locomotion.set_look_vertical(10.0);
        locomotion.set_look_vertical_goal(50.0);
        locomotion.set_analog_moving_speed(2.0);
        locomotion.set_turn_horizontal(30.0);
        locomotion.set_analog_moving_horizontal_goal(15.0);

        locomotion.cancel_input();

        assert_eq!(locomotion.look_vertical().goal(), 10.0);
        assert_eq!(locomotion.analog_moving_speed(), 0.0);
        assert_eq!(locomotion.turn_horizontal(), 0.0);
        assert_eq!(locomotion.analog_moving_horizontal().goal(), 0.0);
        assert_eq!(locomotion.analog_moving_horizontal().value(), 0.0);
    }

    #[test]
    fn cancel_turn_in_place_clears_pulses() {
        let mut locomotion = Locomotion::new();
        locomotion.set_is_turning_ip(true);
        locomotion.set_turn_ip(45.0);
        locomotion.set_reset_time_turn_ip(true);
        locomotion.set_reverse_time_turn_ip(true);

        locomotion.cancel_turn_in_place();

        assert!(!locomotion.is_turning_ip());
        assert_eq!(locomotion.turn_ip(), 0.0);
        assert!(!locomotion.reset_time_turn_ip());
        assert!(!locomotion.reverse_time_turn_ip());
    }

    #[test]
    fn force_body_adjustment_folds_look_into_pending_turn() {
        let mut locomotion = Locomotion::new();
        locomotion.set_look_horizontal_goal(60.0);
        locomotion.set_turn_ip(90.0);
        locomotion.set_is_turning_ip(true);

        locomotion.force_body_adjustment();

        assert_eq!(locomotion.turn_horizontal(), 150.0);
        assert!(!locomotion.is_turning_ip());
        assert_eq!(locomotion.turn_ip(), 0.0);
    }

    #[test]
    fn force_body_adjustment_requires_can_turn() {
        let mut locomotion = Locomotion::new();
        locomotion.set_can_turn(false);
        locomotion.set_look_horizontal_goal(60.0);
        locomotion.force_body_adjustment();
        assert_eq!(locomotion.turn_horizontal(), 0.0);
    }
}
