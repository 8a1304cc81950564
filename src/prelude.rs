//! Convenient re-exports of the most commonly used types.

pub use crate::dynamics::solver::{
    AnyEquation, ContactEquation, EQUATION_DOF, Equation, EquationState, JacobianEquation,
};
pub use crate::dynamics::{
    RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
pub use crate::error::EquationError;
pub use crate::math::{AngVector, Real, Vector};
