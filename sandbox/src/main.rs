//! Offline locomotion sandbox.
//!
//! Drives one actor through the full per-tick pipeline against a synthetic
//! rolling terrain: scripted look and movement input, animator controllers
//! fed through mappings, a kinematic collider integrated by a toy physics
//! step, and ground probes refreshed from the terrain between physics and
//! the post-locomotion update.

use anyhow::Result;
use bevy_math::{Vec2, Vec3};
use clap::Parser;
use tracing::{debug, info};

use animator::{AnimatorInstance, AnimatorInstanceRef, Controller, Curve, CurvePoint};
use locomotion::{
    presets, AiCollider, CollisionHit, CollisionTest, CollisionTestRef, ControllerAttribute,
    Locomotion, TiltCornerTests,
};

#[derive(Parser, Debug)]
#[command(name = "locomotion-sandbox")]
#[command(about = "Offline actor locomotion sandbox", long_about = None)]
struct Args {
    /// Number of simulation ticks
    #[arg(long, default_value_t = 400)]
    ticks: u32,
    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 0.02)]
    timestep: f32,
    /// Start from the quadruped preset instead of the biped
    #[arg(long, default_value_t = false)]
    quadruped: bool,
    /// Sample ground tilt from the synthetic terrain
    #[arg(long, default_value_t = false)]
    tilt: bool,
    /// Log state every Nth tick
    #[arg(long, default_value_t = 20)]
    log_every: u32,
}

// Gentle swell so the probes and tilt have something to chew on.
fn ground_height(x: f32, z: f32) -> f32 {
    (x * 0.25).sin() * 0.4 + (z * 0.2).cos() * 0.3
}

fn ground_normal(x: f32, z: f32) -> Vec3 {
    let e = 0.05;
    let slope_x = (ground_height(x + e, z) - ground_height(x - e, z)) / (2.0 * e);
    let slope_z = (ground_height(x, z + e) - ground_height(x, z - e)) / (2.0 * e);
    Vec3::new(-slope_x, 1.0, -slope_z).normalize()
}

const PROBE_HEIGHT: f32 = 1.0;
const PROBE_REACH: f32 = 2.0;

/// Downward probe at a body-space offset from the actor position.
fn make_probe(offset: Vec2) -> CollisionTestRef {
    CollisionTest::new_shared(
        Vec3::new(offset.x, PROBE_HEIGHT, offset.y),
        Vec3::new(0.0, -PROBE_REACH, 0.0),
    )
}

/// Re-anchor a probe at the actor position and cast it against the terrain.
fn refresh_probe(probe: &CollisionTestRef, position: Vec3, offset: Vec2) {
    let mut probe = probe.borrow_mut();
    let origin = Vec3::new(
        position.x + offset.x,
        position.y + PROBE_HEIGHT,
        position.z + offset.y,
    );
    probe.set_origin(origin);

    let height = ground_height(origin.x, origin.z);
    let fraction = (origin.y - height) / PROBE_REACH;
    if (0.0..=1.0).contains(&fraction) {
        probe.set_hits(vec![CollisionHit {
            distance: fraction,
            normal: ground_normal(origin.x, origin.z),
        }]);
    } else {
        probe.clear_hits();
    }
}

fn build_animator(locomotion: &mut Locomotion) -> AnimatorInstanceRef {
    let instance = AnimatorInstance::new_shared();
    let mappings = [
        ("look.vertical", -90.0, 90.0, ControllerAttribute::LookVertical),
        ("look.horizontal", -90.0, 90.0, ControllerAttribute::LookHorizontal),
        ("move.velocity", -10.0, 10.0, ControllerAttribute::RelativeMovingSpeed),
        ("move.direction", -180.0, 180.0, ControllerAttribute::MovingDirection),
        ("turn.velocity", -360.0, 360.0, ControllerAttribute::TurningSpeed),
        ("stance", 0.0, 1.0, ControllerAttribute::Stance),
        ("displacement", 0.0, 1000.0, ControllerAttribute::Displacement),
        ("tilt.vertical", -40.0, 40.0, ControllerAttribute::TiltVertical),
        ("tilt.horizontal", -40.0, 40.0, ControllerAttribute::TiltHorizontal),
        ("tilt.offset", -2.0, 2.0, ControllerAttribute::TiltOffset),
    ];
    for (name, lower, upper, attribute) in mappings {
        let mut controller = Controller::new(name);
        controller.set_value_range(lower, upper);
        let index = instance.borrow_mut().add_controller(controller);
        locomotion.add_controller_mapping(&instance, index, attribute);
    }

    // Walk cycle time wraps instead of clamping.
    let walk = instance
        .borrow_mut()
        .add_controller(Controller::looping("time.walk", 0.0, 1.2));
    locomotion.add_controller_mapping(&instance, walk, ControllerAttribute::ElapsedTime);
    let turn = instance
        .borrow_mut()
        .add_controller(Controller::looping("time.turn", 0.0, 0.8));
    locomotion.add_controller_mapping(&instance, turn, ControllerAttribute::TimeTurnIp);

    instance
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!(?args, "Sandbox starting");

    let mut locomotion = if args.quadruped {
        presets::quadruped()
    } else {
        presets::biped()
    };
    locomotion.set_update_ai_collider_angular_velocity(true);

    let animator = build_animator(&mut locomotion);

    let collider = AiCollider::new_shared();
    locomotion.set_ai_collider(Some(collider.clone()));

    let corner_offsets = [
        Vec2::new(-0.3, 0.45),
        Vec2::new(0.3, 0.45),
        Vec2::new(-0.3, -0.45),
        Vec2::new(0.3, -0.45),
    ];
    let probes: Vec<CollisionTestRef> = corner_offsets.iter().map(|o| make_probe(*o)).collect();
    if args.tilt {
        locomotion.set_can_tilt(true);
        locomotion.set_tilt_mode(locomotion::TiltMode::Weighted);
        locomotion.set_tilt_corner_tests(Some(TiltCornerTests {
            front_left: probes[0].clone(),
            front_right: probes[1].clone(),
            back_left: probes[2].clone(),
            back_right: probes[3].clone(),
        }));
    }

    // Throttle envelope: ease in, hold, ease out over the whole run.
    let mut throttle = Curve::new();
    throttle.add_point(CurvePoint::with_handles(
        Vec2::ZERO,
        Vec2::ZERO,
        Vec2::new(0.15, 0.0),
    ));
    throttle.add_point(CurvePoint::new(Vec2::new(0.3, 1.0)));
    throttle.add_point(CurvePoint::new(Vec2::new(0.7, 1.0)));
    throttle.add_point(CurvePoint::with_handles(
        Vec2::new(1.0, 0.0),
        Vec2::new(0.85, 0.0),
        Vec2::new(1.0, 0.0),
    ));

    let dt = args.timestep;
    let mut position = Vec3::ZERO;

    for tick in 0..args.ticks {
        let progress = tick as f32 / args.ticks.max(1) as f32;
        let time = tick as f32 * dt;

        // Scripted intent: sweep the view and walk along it.
        locomotion.set_look_horizontal_goal(50.0 * (time * 0.7).sin());
        locomotion.set_look_vertical_goal(15.0 * (time * 0.4).sin());
        locomotion.set_analog_moving_horizontal_goal(20.0 * (time * 0.3).sin());
        locomotion.set_analog_moving_speed(3.0 * throttle.evaluate(progress));
        locomotion.set_stance_goal(if progress > 0.5 { 1.0 } else { 0.0 });

        locomotion.update_looking(dt);
        locomotion.update_locomotion(dt);
        locomotion.update_animator_instance(dt);
        locomotion.update_ai_collider();

        // Toy physics: integrate the collider velocity, keep feet on ground.
        position += collider.borrow().linear_velocity() * dt;
        position.y = ground_height(position.x, position.z);

        for (probe, offset) in probes.iter().zip(corner_offsets) {
            refresh_probe(probe, position, offset);
        }

        locomotion.update_post_locomotion(dt);

        let changed = animator.borrow_mut().take_changed().len();
        debug!(tick, changed, "controllers updated");

        if tick % args.log_every.max(1) == 0 {
            info!(
                tick,
                x = position.x,
                z = position.z,
                orientation = locomotion.orientation(),
                speed = locomotion.moving_speed(),
                direction = locomotion.moving_direction(),
                turning = locomotion.turning_speed(),
                tilt_v = locomotion.tilt_vertical().value(),
                tilt_h = locomotion.tilt_horizontal().value(),
                tilt_offset = locomotion.tilt_offset(),
                "actor state"
            );
        }
    }

    let animator = animator.borrow();
    for index in 0..animator.controller_count() {
        let controller = animator.controller(index).expect("controller index");
        info!(
            name = controller.name(),
            value = controller.current_value(),
            "final controller value"
        );
    }

    Ok(())
}
