//! Version-tagged binary snapshots of the locomotion state.
//!
//! The layout is a fixed little-endian field sequence: one version byte, a
//! flags bitfield, then the scalar and smoothed fields in a stable order.
//! Collaborator handles (collision tests, collider, animator mappings) are
//! wiring, not state, and are not part of the snapshot.

use std::io::{Read, Write};

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::smooth::{SmoothFloat, SmoothVec};
use crate::state::Locomotion;
use crate::tilt::TiltMode;
use crate::Error;

const STATE_VERSION: u8 = 1;

const FLAG_CAN_TURN: u16 = 0x1;
const FLAG_TURN_ADJUST_LOOK_HORIZONTAL: u16 = 0x2;
const FLAG_IS_MOVING: u16 = 0x4;
const FLAG_IS_TURNING_IP: u16 = 0x8;
const FLAG_RESET_TIME_TURN_IP: u16 = 0x10;
const FLAG_REVERSE_TIME_TURN_IP: u16 = 0x20;
const FLAG_CAN_TURN_IN_PLACE: u16 = 0x40;
const FLAG_RESET_TIME_WALK: u16 = 0x80;
const FLAG_CAN_TILT: u16 = 0x100;
const FLAG_UPDATE_AI_COLLIDER_ANGULAR_VELOCITY: u16 = 0x200;

// bincode's default profile writes fixed-width little-endian fields in
// declaration order, so these records double as the wire layout.

#[derive(Serialize, Deserialize)]
struct SmoothFloatRecord {
    value: f32,
    goal: f32,
    adjust_range: f32,
    adjust_time: f32,
    change_speed: f32,
}

impl SmoothFloatRecord {
    fn capture(smoothed: &SmoothFloat) -> Self {
        Self {
            value: smoothed.value(),
            goal: smoothed.goal(),
            adjust_range: smoothed.adjust_range(),
            adjust_time: smoothed.adjust_time(),
            change_speed: smoothed.change_speed(),
        }
    }

    fn restore(&self, smoothed: &mut SmoothFloat) {
        smoothed.set_value(self.value);
        smoothed.set_goal(self.goal);
        smoothed.set_adjust_range(self.adjust_range);
        smoothed.set_adjust_time(self.adjust_time);
        smoothed.set_change_speed(self.change_speed);
    }
}

#[derive(Serialize, Deserialize)]
struct SmoothVecRecord {
    value: Vec3,
    goal: Vec3,
    adjust_range: f32,
    adjust_time: f32,
    change_speed: f32,
}

impl SmoothVecRecord {
    fn capture(smoothed: &SmoothVec) -> Self {
        Self {
            value: smoothed.value(),
            goal: smoothed.goal(),
            adjust_range: smoothed.adjust_range(),
            adjust_time: smoothed.adjust_time(),
            change_speed: smoothed.change_speed(),
        }
    }

    fn restore(&self, smoothed: &mut SmoothVec) {
        smoothed.set_value(self.value);
        smoothed.set_goal(self.goal);
        smoothed.set_adjust_range(self.adjust_range);
        smoothed.set_adjust_time(self.adjust_time);
        smoothed.set_change_speed(self.change_speed);
    }
}

#[derive(Serialize, Deserialize)]
struct StateRecordV1 {
    flags: u16,

    limit_look_up: f32,
    limit_look_down: f32,
    look_vertical: SmoothFloatRecord,

    limit_look_left: f32,
    limit_look_right: f32,
    look_horizontal: SmoothFloatRecord,

    analog_moving_horizontal: SmoothFloatRecord,
    turn_horizontal: f32,

    analog_moving_speed: f32,

    adjust_time_orientation: f32,
    climb_limit_accel: f32,
    orientation: f32,
    turning_speed: f32,
    angular_velocity: Vec3,

    moving_speed: f32,
    moving_orientation: f32,
    moving_direction: f32,

    linear_velocity: SmoothVecRecord,

    stance: SmoothFloatRecord,

    adjust_time_turn_ip: f32,
    turn_ip: f32,

    limit_turn_in_place_left: f32,
    limit_turn_in_place_right: f32,

    tilt_mode: u8,

    limit_tilt_up: f32,
    limit_tilt_down: f32,
    tilt_vertical: SmoothFloatRecord,

    limit_tilt_left: f32,
    limit_tilt_right: f32,
    tilt_horizontal: SmoothFloatRecord,

    tilt_offset: f32,
}

impl Locomotion {
    /// Write the state as a version-tagged binary snapshot.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        bincode::serialize_into(&mut *writer, &STATE_VERSION)?;
        bincode::serialize_into(writer, &self.capture_v1())?;
        Ok(())
    }

    /// Restore the state from a snapshot written by [`write_to`].
    ///
    /// Unknown versions, unknown tilt modes and truncated payloads fail
    /// with [`Error::InvalidFormat`] before any state is touched.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<(), Error> {
        let version: u8 = bincode::deserialize_from(&mut *reader)?;
        match version {
            1 => {
                let record: StateRecordV1 = bincode::deserialize_from(reader)?;
                self.restore_v1(record)
            }
            other => Err(Error::InvalidFormat(format!(
                "unknown locomotion state version {other}"
            ))),
        }
    }

    fn capture_v1(&self) -> StateRecordV1 {
        let mut flags = 0u16;
        if self.can_turn {
            flags |= FLAG_CAN_TURN;
        }
        if self.turn_adjust_look_horizontal {
            flags |= FLAG_TURN_ADJUST_LOOK_HORIZONTAL;
        }
        if self.is_moving {
            flags |= FLAG_IS_MOVING;
        }
        if self.is_turning_ip {
            flags |= FLAG_IS_TURNING_IP;
        }
        if self.reset_time_turn_ip {
            flags |= FLAG_RESET_TIME_TURN_IP;
        }
        if self.reverse_time_turn_ip {
            flags |= FLAG_REVERSE_TIME_TURN_IP;
        }
        if self.can_turn_in_place {
            flags |= FLAG_CAN_TURN_IN_PLACE;
        }
        if self.reset_time_walk {
            flags |= FLAG_RESET_TIME_WALK;
        }
        if self.can_tilt {
            flags |= FLAG_CAN_TILT;
        }
        if self.update_ai_collider_angular_velocity {
            flags |= FLAG_UPDATE_AI_COLLIDER_ANGULAR_VELOCITY;
        }

        StateRecordV1 {
            flags,

            limit_look_up: self.limit_look_up,
            limit_look_down: self.limit_look_down,
            look_vertical: SmoothFloatRecord::capture(&self.look_vertical),

            limit_look_left: self.limit_look_left,
            limit_look_right: self.limit_look_right,
            look_horizontal: SmoothFloatRecord::capture(&self.look_horizontal),

            analog_moving_horizontal: SmoothFloatRecord::capture(&self.analog_moving_horizontal),
            turn_horizontal: self.turn_horizontal,

            analog_moving_speed: self.analog_moving_speed,

            adjust_time_orientation: self.adjust_time_orientation,
            climb_limit_accel: self.climb_limit_accel,
            orientation: self.orientation,
            turning_speed: self.turning_speed,
            angular_velocity: self.angular_velocity,

            moving_speed: self.moving_speed,
            moving_orientation: self.moving_orientation,
            moving_direction: self.moving_direction,

            linear_velocity: SmoothVecRecord::capture(&self.linear_velocity),

            stance: SmoothFloatRecord::capture(&self.stance),

            adjust_time_turn_ip: self.adjust_time_turn_ip,
            turn_ip: self.turn_ip,

            limit_turn_in_place_left: self.limit_turn_in_place_left,
            limit_turn_in_place_right: self.limit_turn_in_place_right,

            tilt_mode: self.tilt_mode.to_byte(),

            limit_tilt_up: self.limit_tilt_up,
            limit_tilt_down: self.limit_tilt_down,
            tilt_vertical: SmoothFloatRecord::capture(&self.tilt_vertical),

            limit_tilt_left: self.limit_tilt_left,
            limit_tilt_right: self.limit_tilt_right,
            tilt_horizontal: SmoothFloatRecord::capture(&self.tilt_horizontal),

            tilt_offset: self.tilt_offset,
        }
    }

    fn restore_v1(&mut self, record: StateRecordV1) -> Result<(), Error> {
        // Validate before mutating anything.
        let tilt_mode = TiltMode::from_byte(record.tilt_mode)?;

        let flags = record.flags;
        self.can_turn = flags & FLAG_CAN_TURN != 0;
        self.turn_adjust_look_horizontal = flags & FLAG_TURN_ADJUST_LOOK_HORIZONTAL != 0;
        self.is_moving = flags & FLAG_IS_MOVING != 0;
        self.is_turning_ip = flags & FLAG_IS_TURNING_IP != 0;
        self.reset_time_turn_ip = flags & FLAG_RESET_TIME_TURN_IP != 0;
        self.reverse_time_turn_ip = flags & FLAG_REVERSE_TIME_TURN_IP != 0;
        self.can_turn_in_place = flags & FLAG_CAN_TURN_IN_PLACE != 0;
        self.reset_time_walk = flags & FLAG_RESET_TIME_WALK != 0;
        self.can_tilt = flags & FLAG_CAN_TILT != 0;
        self.update_ai_collider_angular_velocity =
            flags & FLAG_UPDATE_AI_COLLIDER_ANGULAR_VELOCITY != 0;

        self.limit_look_up = record.limit_look_up;
        self.limit_look_down = record.limit_look_down;
        record.look_vertical.restore(&mut self.look_vertical);

        self.limit_look_left = record.limit_look_left;
        self.limit_look_right = record.limit_look_right;
        record.look_horizontal.restore(&mut self.look_horizontal);

        record
            .analog_moving_horizontal
            .restore(&mut self.analog_moving_horizontal);
        self.turn_horizontal = record.turn_horizontal;

        self.analog_moving_speed = record.analog_moving_speed;

        self.adjust_time_orientation = record.adjust_time_orientation;
        self.climb_limit_accel = record.climb_limit_accel;
        // Rebuilds the orientation quaternion from the angle.
        self.set_orientation(record.orientation);
        self.turning_speed = record.turning_speed;
        self.angular_velocity = record.angular_velocity;

        self.moving_speed = record.moving_speed;
        self.moving_orientation = record.moving_orientation;
        self.moving_direction = record.moving_direction;

        record.linear_velocity.restore(&mut self.linear_velocity);

        record.stance.restore(&mut self.stance);

        self.adjust_time_turn_ip = record.adjust_time_turn_ip;
        self.turn_ip = record.turn_ip;

        self.limit_turn_in_place_left = record.limit_turn_in_place_left;
        self.limit_turn_in_place_right = record.limit_turn_in_place_right;

        self.tilt_mode = tilt_mode;

        self.limit_tilt_up = record.limit_tilt_up;
        self.limit_tilt_down = record.limit_tilt_down;
        record.tilt_vertical.restore(&mut self.tilt_vertical);

        self.limit_tilt_left = record.limit_tilt_left;
        self.limit_tilt_right = record.limit_tilt_right;
        record.tilt_horizontal.restore(&mut self.tilt_horizontal);

        self.tilt_offset = record.tilt_offset;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::Quat;

    // version + flags + every scalar/smoothed field of the v1 record
    const SNAPSHOT_LEN: usize = 260;
    const TILT_MODE_OFFSET: usize = 199;

    fn populated() -> Locomotion {
        let mut locomotion = Locomotion::new();
        locomotion.set_can_turn(true);
        locomotion.set_turn_adjust_look_horizontal(false);
        locomotion.set_can_turn_in_place(true);
        locomotion.set_can_tilt(true);
        locomotion.set_update_ai_collider_angular_velocity(true);

        locomotion.set_limit_look_up(80.0);
        locomotion.set_limit_look_down(-60.0);
        locomotion.set_adjust_time_look_vertical(0.4);
        locomotion.set_adjust_range_look_vertical(70.0);
        locomotion.set_look_vertical(12.0);
        locomotion.set_look_vertical_goal(25.0);

        locomotion.set_limit_look_left(-85.0);
        locomotion.set_limit_look_right(85.0);
        locomotion.set_adjust_time_look_horizontal(0.3);
        locomotion.set_look_horizontal(-20.0);
        locomotion.set_look_horizontal_goal(35.0);

        locomotion.set_adjust_time_analog_moving_horizontal(0.25);
        locomotion.set_analog_moving_horizontal_goal(60.0);
        locomotion.set_turn_horizontal(14.0);
        locomotion.set_analog_moving_speed(2.75);

        locomotion.set_adjust_time_orientation(0.5).unwrap();
        locomotion.set_orientation(123.0);
        locomotion.set_turning_speed(18.0);

        locomotion.set_is_moving(true);
        locomotion.set_moving_speed(2.5);
        locomotion.set_moving_orientation(140.0);
        locomotion.set_moving_direction(17.0);

        locomotion.set_adjust_time_linear_velocity(0.35);
        locomotion.set_adjust_range_linear_velocity(6.0);

        locomotion.set_adjust_time_stance(0.6);
        locomotion.set_stance(0.5);
        locomotion.set_stance_goal(1.0);

        locomotion.set_is_turning_ip(true);
        locomotion.set_adjust_time_turn_ip(0.8).unwrap();
        locomotion.set_turn_ip(55.0);
        locomotion.set_reset_time_turn_ip(true);
        locomotion.set_reverse_time_turn_ip(true);
        locomotion.set_reset_time_walk(true);
        locomotion.set_limit_turn_in_place_left(-65.0);
        locomotion.set_limit_turn_in_place_right(75.0);

        locomotion.set_tilt_mode(TiltMode::Weighted);
        locomotion.set_limit_tilt_up(25.0);
        locomotion.set_limit_tilt_down(-25.0);
        locomotion.set_tilt_vertical(6.0);
        locomotion.set_tilt_vertical_goal(9.0);
        locomotion.set_limit_tilt_left(-20.0);
        locomotion.set_limit_tilt_right(20.0);
        locomotion.set_tilt_horizontal(-4.0);
        locomotion.set_tilt_horizontal_goal(3.0);
        locomotion.set_tilt_offset(0.15);

        locomotion
    }

    fn snapshot(locomotion: &Locomotion) -> Vec<u8> {
        let mut buffer = Vec::new();
        locomotion.write_to(&mut buffer).expect("write snapshot");
        buffer
    }

    #[test]
    fn snapshot_layout_is_stable() {
        let buffer = snapshot(&populated());
        assert_eq!(buffer.len(), SNAPSHOT_LEN);
        assert_eq!(buffer[0], 1, "version byte");
        assert_eq!(buffer[TILT_MODE_OFFSET], 2, "weighted tilt mode byte");
    }

    #[test]
    fn flags_bitfield_matches_layout() {
        let locomotion = populated();
        let buffer = snapshot(&locomotion);
        let flags = u16::from_le_bytes([buffer[1], buffer[2]]);
        assert_ne!(flags & 0x1, 0, "can_turn");
        assert_eq!(flags & 0x2, 0, "turn_adjust_look_horizontal off");
        assert_ne!(flags & 0x4, 0, "is_moving");
        assert_ne!(flags & 0x8, 0, "is_turning_ip");
        assert_ne!(flags & 0x10, 0, "reset_time_turn_ip");
        assert_ne!(flags & 0x20, 0, "reverse_time_turn_ip");
        assert_ne!(flags & 0x40, 0, "can_turn_in_place");
        assert_ne!(flags & 0x80, 0, "reset_time_walk");
        assert_ne!(flags & 0x100, 0, "can_tilt");
        assert_ne!(flags & 0x200, 0, "update_ai_collider_angular_velocity");
    }

    #[test]
    fn round_trip_restores_every_field() {
        let original = populated();
        let buffer = snapshot(&original);

        let mut restored = Locomotion::new();
        restored
            .read_from(&mut buffer.as_slice())
            .expect("read snapshot");

        assert_eq!(restored.can_turn(), original.can_turn());
        assert_eq!(
            restored.turn_adjust_look_horizontal(),
            original.turn_adjust_look_horizontal()
        );
        assert_eq!(restored.is_moving(), original.is_moving());
        assert_eq!(restored.is_turning_ip(), original.is_turning_ip());
        assert_eq!(restored.reset_time_turn_ip(), original.reset_time_turn_ip());
        assert_eq!(
            restored.reverse_time_turn_ip(),
            original.reverse_time_turn_ip()
        );
        assert_eq!(restored.can_turn_in_place(), original.can_turn_in_place());
        assert_eq!(restored.reset_time_walk(), original.reset_time_walk());
        assert_eq!(restored.can_tilt(), original.can_tilt());
        assert_eq!(
            restored.update_ai_collider_angular_velocity(),
            original.update_ai_collider_angular_velocity()
        );

        assert_eq!(restored.limit_look_up(), original.limit_look_up());
        assert_eq!(restored.limit_look_down(), original.limit_look_down());
        assert_eq!(restored.look_vertical(), original.look_vertical());
        assert_eq!(restored.limit_look_left(), original.limit_look_left());
        assert_eq!(restored.limit_look_right(), original.limit_look_right());
        assert_eq!(restored.look_horizontal(), original.look_horizontal());
        assert_eq!(
            restored.analog_moving_horizontal(),
            original.analog_moving_horizontal()
        );
        assert_eq!(restored.turn_horizontal(), original.turn_horizontal());
        assert_eq!(restored.analog_moving_speed(), original.analog_moving_speed());

        assert_eq!(
            restored.adjust_time_orientation(),
            original.adjust_time_orientation()
        );
        assert_eq!(restored.climb_limit_accel(), original.climb_limit_accel());
        assert_eq!(restored.orientation(), original.orientation());
        assert_eq!(restored.turning_speed(), original.turning_speed());
        assert_eq!(restored.angular_velocity(), original.angular_velocity());

        assert_eq!(restored.moving_speed(), original.moving_speed());
        assert_eq!(restored.moving_orientation(), original.moving_orientation());
        assert_eq!(restored.moving_direction(), original.moving_direction());
        assert_eq!(restored.linear_velocity(), original.linear_velocity());
        assert_eq!(restored.stance(), original.stance());

        assert_eq!(restored.adjust_time_turn_ip(), original.adjust_time_turn_ip());
        assert_eq!(restored.turn_ip(), original.turn_ip());
        assert_eq!(
            restored.limit_turn_in_place_left(),
            original.limit_turn_in_place_left()
        );
        assert_eq!(
            restored.limit_turn_in_place_right(),
            original.limit_turn_in_place_right()
        );

        assert_eq!(restored.tilt_mode(), original.tilt_mode());
        assert_eq!(restored.limit_tilt_up(), original.limit_tilt_up());
        assert_eq!(restored.limit_tilt_down(), original.limit_tilt_down());
        assert_eq!(restored.tilt_vertical(), original.tilt_vertical());
        assert_eq!(restored.limit_tilt_left(), original.limit_tilt_left());
        assert_eq!(restored.limit_tilt_right(), original.limit_tilt_right());
        assert_eq!(restored.tilt_horizontal(), original.tilt_horizontal());
        assert_eq!(restored.tilt_offset(), original.tilt_offset());

        // Quaternion is rebuilt from the angle, not stored.
        let expected = Quat::from_rotation_y(original.orientation().to_radians());
        assert!(restored.orientation_quaternion().dot(expected).abs() > 0.9999);
    }

    #[test]
    fn unknown_version_is_rejected_without_mutation() {
        let mut buffer = snapshot(&populated());
        buffer[0] = 9;

        let mut target = Locomotion::new();
        target.set_orientation(42.0);
        let error = target.read_from(&mut buffer.as_slice()).unwrap_err();
        assert!(matches!(error, Error::InvalidFormat(_)));
        assert_eq!(target.orientation(), 42.0);
    }

    #[test]
    fn unknown_tilt_mode_is_rejected_without_mutation() {
        let mut buffer = snapshot(&populated());
        buffer[TILT_MODE_OFFSET] = 7;

        let mut target = Locomotion::new();
        target.set_orientation(42.0);
        let error = target.read_from(&mut buffer.as_slice()).unwrap_err();
        assert!(matches!(error, Error::InvalidFormat(_)));
        assert_eq!(target.orientation(), 42.0);
    }

    #[test]
    fn truncated_snapshot_is_rejected() {
        let buffer = snapshot(&populated());
        let mut target = Locomotion::new();
        let error = target
            .read_from(&mut buffer[..buffer.len() / 2].as_ref())
            .unwrap_err();
        assert!(matches!(error, Error::InvalidFormat(_)));
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut target = Locomotion::new();
        assert!(target.read_from(&mut [].as_slice()).is_err());
    }
}
