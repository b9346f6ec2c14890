//! Per-tick update pipeline.
//!
//! Caller contract, per actor and per tick:
//! 1. Push inputs, then `update_looking`, `update_locomotion`,
//!    `update_animator_instance`, `update_ai_collider`.
//! 2. Run physics.
//! 3. `update_post_locomotion` (tilt sampling plus post-only mappings).
//!
//! The `reset_time_walk`, `reset_time_turn_ip` and `reverse_time_turn_ip`
//! flags are one-shot pulses: raised inside `update_locomotion`, consumed
//! and cleared by `update_animator_instance` within the same tick.

use bevy_math::{Quat, Vec3};

use crate::state::Locomotion;

// Updates below this elapsed time are skipped entirely.
const MIN_UPDATE_ELAPSED: f32 = 1e-5;
// Speeds below this count as standing still.
const MOVE_SPEED_THRESHOLD: f32 = 0.001;
// Orientation smoothing engages above this adjust time.
const MIN_ADJUST_TIME: f32 = 0.001;

impl Locomotion {
    /// Advance the smoothed look angles and the analog moving direction.
    pub fn update_looking(&mut self, elapsed: f32) {
        self.look_horizontal.update(elapsed);
        self.look_vertical.update(elapsed);
        self.analog_moving_horizontal.update(elapsed);
    }

    /// Snap all intermediate state to its goals without smoothing, as after
    /// a teleport. Every smoother lands on its goal with zero change speed
    /// and all pulse flags are cleared.
    pub fn apply_states(&mut self) {
        self.reset_time_walk = false;
        self.reverse_time_turn_ip = false;
        self.reset_time_turn_ip = false;

        self.set_orientation(self.orientation + self.turn_horizontal);
        self.turn_horizontal = 0.0;

        self.look_horizontal.snap_to_goal();
        self.analog_moving_horizontal.snap_to_goal();
        self.look_vertical.snap_to_goal();
        self.stance.snap_to_goal();
        self.tilt_vertical.snap_to_goal();
        self.tilt_horizontal.snap_to_goal();

        self.turning_speed = 0.0;
        self.turn_ip = 0.0;

        self.set_moving_orientation(self.orientation + self.analog_moving_horizontal.value());

        let velocity = Quat::from_rotation_y(self.moving_orientation.to_radians())
            * Vec3::Z
            * self.analog_moving_speed;
        self.linear_velocity.set_value(velocity);
        self.linear_velocity.set_goal(velocity);
        self.linear_velocity.set_change_speed(0.0);
        self.moving_speed = self.analog_moving_speed;
        self.is_moving = self.analog_moving_speed.abs() > MOVE_SPEED_THRESHOLD;
    }

    /// Run one locomotion tick: moving detection, orientation, linear
    /// velocity and stance. Clears the pulse flags at entry so pulses raised
    /// here live until the animator update consumes them.
    pub fn update_locomotion(&mut self, elapsed: f32) {
        if elapsed < MIN_UPDATE_ELAPSED {
            return;
        }

        self.reset_time_walk = false;
        self.reverse_time_turn_ip = false;
        self.reset_time_turn_ip = false;

        self.update_is_moving();
        self.update_orientation(elapsed);
        self.update_linear_velocity(elapsed);
        self.update_stance(elapsed);
    }

    /// Derive the moving flag from the analog moving speed, raising the
    /// restart pulses on the edges.
    pub fn update_is_moving(&mut self) {
        let is_moving = self.analog_moving_speed.abs() > MOVE_SPEED_THRESHOLD;
        if is_moving == self.is_moving {
            return;
        }

        if is_moving {
            if self.moving_speed < MOVE_SPEED_THRESHOLD {
                self.reset_time_walk = true;
            }

            self.is_turning_ip = false;
            self.turn_ip = 0.0;
        } else {
            self.reset_time_turn_ip = true;
        }

        self.is_moving = is_moving;
    }

    /// Rotate the body toward the pending turn, branching on whether the
    /// actor moves. While standing the turn-in-place state machine may take
    /// over the rotation.
    pub fn update_orientation(&mut self, elapsed: f32) {
        if !self.can_turn {
            if self.look_horizontal.value() > self.limit_look_right {
                self.look_horizontal.set_value(self.limit_look_right);
                self.look_horizontal.set_goal(self.limit_look_right);
            } else if self.look_horizontal.value() < self.limit_look_left {
                self.look_horizontal.set_value(self.limit_look_left);
                self.look_horizontal.set_goal(self.limit_look_left);
            }

            self.turn_horizontal = 0.0;
            self.set_turning_speed(0.0);
            return;
        }

        let mut adjust = if self.is_moving {
            self.orientation_adjust_moving(elapsed)
        } else {
            self.orientation_adjust_not_moving(elapsed)
        };

        self.check_looking_range_violation(&mut adjust);
        self.adjust_orientation(adjust);
        self.set_turning_speed(adjust / elapsed);
    }

    /// Moving branch: consume the pending turn, rate-limited to 90 degrees
    /// per adjust time and acceleration-limited by the climb coefficient.
    fn orientation_adjust_moving(&self, elapsed: f32) -> f32 {
        let mut adjust = self.turn_horizontal;

        if self.adjust_time_orientation > MIN_ADJUST_TIME {
            let limit_turn_speed = 90.0 / self.adjust_time_orientation;
            adjust *= (elapsed / (self.adjust_time_orientation * 0.25)).min(1.0);

            let limit_accel = self.climb_limit_accel * 90.0 * elapsed;
            let old_turn_speed = self
                .turning_speed
                .clamp(-limit_turn_speed, limit_turn_speed);

            let speed_diff = adjust / elapsed - old_turn_speed;

            if speed_diff > limit_accel && adjust > 0.0 {
                adjust = (old_turn_speed + limit_accel) * elapsed;
            } else if speed_diff < -limit_accel && adjust < 0.0 {
                adjust = (old_turn_speed - limit_accel) * elapsed;
            }
        }

        adjust
    }

    /// Standing branch: softer smoothing of the pending turn, then the
    /// turn-in-place state machine which overrides the rotation entirely
    /// while active.
    fn orientation_adjust_not_moving(&mut self, elapsed: f32) -> f32 {
        let mut adjust = self.turn_horizontal;

        if self.adjust_time_orientation > MIN_ADJUST_TIME {
            let limit_turn_speed = 90.0 / self.adjust_time_orientation;
            let limit_turn_accel = limit_turn_speed * 3.5;
            let adjust_factor = 2.5 / self.adjust_time_orientation * elapsed;

            adjust *= adjust_factor.min(1.0);

            let max_speed_step = limit_turn_speed * elapsed;
            adjust = adjust.clamp(-max_speed_step, max_speed_step);

            let turning_speed = self
                .turning_speed
                .clamp(-limit_turn_speed, limit_turn_speed);
            let speed_diff = adjust / elapsed - turning_speed;
            let max_speed_diff = limit_turn_accel * elapsed;

            if speed_diff > max_speed_diff {
                adjust = (turning_speed + max_speed_diff) * elapsed;
            } else if speed_diff < -max_speed_diff {
                adjust = (turning_speed - max_speed_diff) * elapsed;
            }
        }

        if self.can_turn_in_place {
            // Strictly beyond a turn-in-place limit starts (or flips) a
            // 90 degree body turn.
            if self.look_horizontal.goal() > self.limit_turn_in_place_right {
                if self.is_turning_ip {
                    if self.turn_ip < 0.0 {
                        self.turn_ip += 90.0;
                        self.reverse_time_turn_ip = true;
                    }
                } else {
                    self.is_turning_ip = true;
                    self.turn_ip = 90.0;
                    self.reset_time_turn_ip = true;
                }
            } else if self.look_horizontal.goal() < self.limit_turn_in_place_left {
                if self.is_turning_ip {
                    if self.turn_ip > 0.0 {
                        self.turn_ip -= 90.0;
                        self.reverse_time_turn_ip = true;
                    }
                } else {
                    self.is_turning_ip = true;
                    self.turn_ip = -90.0;
                    self.reset_time_turn_ip = true;
                }
            }
        } else {
            self.is_turning_ip = false;
            self.turn_ip = 0.0;
            self.reset_time_turn_ip = false;
        }

        if self.is_turning_ip {
            let step = if self.adjust_time_turn_ip > MIN_ADJUST_TIME {
                90.0 * elapsed / self.adjust_time_turn_ip
            } else {
                self.turn_ip.abs()
            };

            if self.turn_ip > 0.0 {
                adjust = step;
                if adjust >= self.turn_ip {
                    adjust = self.turn_ip;
                    self.turn_ip = 0.0;
                    self.is_turning_ip = false;
                } else {
                    self.turn_ip -= adjust;
                }
            } else {
                adjust = -step;
                if adjust <= self.turn_ip {
                    adjust = self.turn_ip;
                    self.turn_ip = 0.0;
                    self.is_turning_ip = false;
                } else {
                    self.turn_ip -= adjust;
                }
            }
        }

        adjust
    }

    /// Keep looking inside the left/right limits. While the body can turn
    /// the rotation is trimmed so the look goal stays reachable; otherwise
    /// the look itself is clamped.
    fn check_looking_range_violation(&mut self, adjust: &mut f32) {
        if self.can_turn && !self.always_limit_left_right {
            if self.look_horizontal.goal() - *adjust > self.limit_look_right {
                *adjust = self.look_horizontal.goal() - self.limit_look_right;
            } else if self.look_horizontal.goal() - *adjust < self.limit_look_left {
                *adjust = self.look_horizontal.goal() - self.limit_look_left;
            }
        } else if self.look_horizontal.value() - *adjust > self.limit_look_right {
            self.look_horizontal.set_value(self.limit_look_right);
            self.look_horizontal.set_goal(self.limit_look_right);
        } else if self.look_horizontal.value() - *adjust < self.limit_look_left {
            self.look_horizontal.set_value(self.limit_look_left);
            self.look_horizontal.set_goal(self.limit_look_left);
        }
    }

    /// Rotate the body by `angle` degrees, counter-rotating the look and
    /// analog directions so they keep pointing at the same world spot. The
    /// pending turn shrinks monotonically toward zero.
    pub fn adjust_orientation(&mut self, angle: f32) {
        self.set_orientation(self.orientation + angle);

        self.look_horizontal
            .set_value(self.look_horizontal.value() - angle);
        self.analog_moving_horizontal
            .set_value(self.analog_moving_horizontal.value() - angle);

        if self.turn_adjust_look_horizontal {
            self.look_horizontal
                .set_goal(self.look_horizontal.goal() - angle);
            self.analog_moving_horizontal
                .set_goal(self.analog_moving_horizontal.goal() - angle);
        }

        if angle > 0.0 {
            self.turn_horizontal = (self.turn_horizontal - angle).max(0.0);
        } else {
            self.turn_horizontal = (self.turn_horizontal - angle).min(0.0);
        }
    }

    /// Chase the goal velocity implied by the analog input, then derive
    /// moving speed, heading and relative direction from the result.
    pub fn update_linear_velocity(&mut self, elapsed: f32) {
        if self.is_moving {
            self.set_moving_orientation(self.orientation + self.analog_moving_horizontal.value());
        }

        let heading = Quat::from_rotation_y(self.moving_orientation.to_radians());
        self.linear_velocity
            .set_goal(heading * Vec3::Z * self.analog_moving_speed);
        self.linear_velocity.update(elapsed);

        let linear_velocity = self.linear_velocity.value();
        self.moving_speed = linear_velocity.length();

        if self.moving_speed > MOVE_SPEED_THRESHOLD {
            // heading is undefined at standstill
            self.set_moving_orientation(linear_velocity.x.atan2(linear_velocity.z).to_degrees());
        }

        self.set_moving_direction(self.moving_orientation - self.orientation);
    }

    pub fn update_stance(&mut self, elapsed: f32) {
        self.stance.update(elapsed);
    }

    /// Post-physics step: sample ground tilt and re-apply the tilt-only
    /// controller mappings.
    pub fn update_post_locomotion(&mut self, elapsed: f32) {
        self.update_tilt(elapsed);

        for mapping in &self.mappings {
            mapping.apply_post(self, elapsed);
        }

        self.reverse_time_turn_ip = false;
        self.reset_time_turn_ip = false;
        self.reset_time_walk = false;
    }

    /// Push every mapped locomotion value onto its animator controller,
    /// consuming the one-shot pulse flags.
    pub fn update_animator_instance(&mut self, elapsed: f32) {
        for mapping in &self.mappings {
            mapping.apply(self, elapsed);
        }

        self.reverse_time_turn_ip = false;
        self.reset_time_turn_ip = false;
        self.reset_time_walk = false;
    }

    /// Push the derived velocities onto the attached physics collider.
    pub fn update_ai_collider(&self) {
        let Some(collider) = &self.ai_collider else {
            return;
        };

        let mut collider = collider.borrow_mut();
        collider.set_linear_velocity(self.linear_velocity.value());

        if self.update_ai_collider_angular_velocity {
            collider.set_angular_velocity(self.angular_velocity * std::f32::consts::PI / 180.0);
        }
    }
}
