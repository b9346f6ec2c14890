use std::cell::RefCell;
use std::rc::Rc;

use bevy_math::{Quat, Vec3};

/// Shared handle to a collision test owned by the physics side.
pub type CollisionTestRef = Rc<RefCell<CollisionTest>>;

/// Shared handle to the physics collider a locomotion state drives.
pub type AiColliderRef = Rc<RefCell<AiCollider>>;

/// One hit of a collision test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Hit distance as a fraction of the test direction, in `[0, 1]`.
    pub distance: f32,
    /// Surface normal at the hit, world space.
    pub normal: Vec3,
}

/// A downward ray or shape cast the physics system refreshes every step.
///
/// Locomotion only reads the results; origin, direction and hit list are
/// written by the host between physics and the post-locomotion update.
#[derive(Debug, Clone, Default)]
pub struct CollisionTest {
    origin: Vec3,
    direction: Vec3,
    hits: Vec<CollisionHit>,
}

impl CollisionTest {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            hits: Vec::new(),
        }
    }

    pub fn new_shared(origin: Vec3, direction: Vec3) -> CollisionTestRef {
        Rc::new(RefCell::new(Self::new(origin, direction)))
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn hit_at(&self, index: usize) -> Option<&CollisionHit> {
        self.hits.get(index)
    }

    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }

    pub fn push_hit(&mut self, hit: CollisionHit) {
        self.hits.push(hit);
    }

    /// Replace all hits with the given result set.
    pub fn set_hits(&mut self, hits: Vec<CollisionHit>) {
        self.hits = hits;
    }
}

/// The kinematic collider carrying the actor through the physics world.
///
/// Locomotion writes velocities into it each tick and reads its orientation
/// when transforming ground normals into the actor frame.
#[derive(Debug, Clone)]
pub struct AiCollider {
    orientation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
}

impl Default for AiCollider {
    fn default() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

impl AiCollider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> AiColliderRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    /// Angular velocity in radians per second.
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_list_round_trip() {
        let mut test = CollisionTest::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(test.hit_count(), 0);
        test.push_hit(CollisionHit {
            distance: 0.5,
            normal: Vec3::Y,
        });
        assert_eq!(test.hit_count(), 1);
        assert_eq!(test.hit_at(0).unwrap().distance, 0.5);
        assert!(test.hit_at(1).is_none());
        test.clear_hits();
        assert_eq!(test.hit_count(), 0);
    }
}
