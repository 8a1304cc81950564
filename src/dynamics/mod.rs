//! Rigid-body state and the constraint equations acting on it.

pub mod solver;

mod rigid_body;
mod rigid_body_set;

pub use rigid_body::{RigidBody, RigidBodyBuilder, RigidBodyType};
pub use rigid_body_set::{RigidBodyHandle, RigidBodySet};
