//! Animation-side collaborators for the locomotion stack.
//!
//! This crate intentionally stays free of any engine or windowing types. It
//! exposes the two things rig-driving code needs: animator instances with
//! named, range-limited controllers, and the 2D curve container animator
//! rules evaluate.

mod controller;
pub use controller::{AnimatorInstance, AnimatorInstanceRef, Controller};

mod curve;
pub use curve::{Curve, CurveInterpolation, CurvePoint};
