//! Per-character locomotion for animated actors.
//!
//! Translates high-level intent (look angles, desired move direction and
//! speed, stance, pending body turns) into frame-coherent orientation,
//! velocities, ground tilt and animation controller values. The crate is
//! engine-agnostic: physics and animation stay on the other side of narrow
//! handle contracts ([`CollisionTest`], [`AiCollider`], and the controllers
//! of the `animator` crate).

mod smooth;
pub use smooth::{SmoothFloat, SmoothVec};

mod collision;
pub use collision::{AiCollider, AiColliderRef, CollisionHit, CollisionTest, CollisionTestRef};

mod state;
pub use state::Locomotion;

mod mapping;
pub use mapping::{ControllerAttribute, ControllerMapping};

mod tilt;
pub use tilt::{TiltCornerTests, TiltMode};

mod persistence;
mod pipeline;
mod util;

pub mod presets;

/// Errors surfaced by configuration setters and snapshot parsing.
///
/// Missing collaborators are deliberately not errors: tilt sampling and
/// collider updates no-op when their handles are absent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("invalid locomotion snapshot: {0}")]
    InvalidFormat(String),
}

impl From<bincode::Error> for Error {
    fn from(error: bincode::Error) -> Self {
        Error::InvalidFormat(error.to_string())
    }
}
