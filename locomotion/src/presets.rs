//! Ready-tuned locomotion configurations.
//!
//! Starting points for common actor archetypes; game code adjusts limits
//! and smoothing from here instead of building every actor from scratch.

use crate::{Locomotion, TiltMode};

/// Player-style biped: instant looking, agile body turns, no ground tilt.
pub fn biped() -> Locomotion {
    let mut locomotion = Locomotion::new();

    locomotion.set_adjust_time_look_vertical(0.0);
    locomotion.set_adjust_time_look_horizontal(0.0);
    locomotion.set_adjust_time_analog_moving_horizontal(0.2);

    locomotion
        .set_adjust_time_orientation(0.5)
        .expect("valid adjust time");
    locomotion.set_adjust_time_turn_ip(1.0).expect("valid adjust time");

    // Brisk walk-to-run envelope.
    locomotion.set_adjust_time_linear_velocity(0.3);
    locomotion.set_adjust_range_linear_velocity(6.0);

    locomotion.set_adjust_time_stance(0.4);

    locomotion
}

/// Four-legged actor: slower body turns, weighted ground tilt for the
/// wider footprint. Corner probes still need to be attached by the caller.
pub fn quadruped() -> Locomotion {
    let mut locomotion = Locomotion::new();

    locomotion.set_adjust_time_look_vertical(0.3);
    locomotion.set_adjust_time_look_horizontal(0.3);
    locomotion.set_adjust_time_analog_moving_horizontal(0.4);

    locomotion
        .set_adjust_time_orientation(1.2)
        .expect("valid adjust time");
    locomotion.set_adjust_time_turn_ip(1.5).expect("valid adjust time");

    locomotion.set_adjust_time_linear_velocity(0.6);
    locomotion.set_adjust_range_linear_velocity(3.0);

    locomotion.set_can_tilt(true);
    locomotion.set_tilt_mode(TiltMode::Weighted);
    locomotion.set_limit_tilt_up(40.0);
    locomotion.set_limit_tilt_down(-40.0);
    locomotion.set_limit_tilt_left(-40.0);
    locomotion.set_limit_tilt_right(40.0);
    locomotion.set_adjust_time_tilt_vertical(0.3);
    locomotion.set_adjust_time_tilt_horizontal(0.3);

    locomotion
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn biped_looks_instantly() {
        let locomotion = biped();
        assert_eq!(locomotion.look_horizontal().adjust_time(), 0.0);
        assert!(!locomotion.can_tilt());
        assert_eq!(locomotion.adjust_time_orientation(), 0.5);
    }

    #[test]
    fn quadruped_tilts_weighted() {
        let locomotion = quadruped();
        assert!(locomotion.can_tilt());
        assert_eq!(locomotion.tilt_mode(), TiltMode::Weighted);
        assert_eq!(locomotion.limit_tilt_up(), 40.0);
    }
}
