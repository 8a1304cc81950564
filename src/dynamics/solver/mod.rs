//! SPOOK-damped constraint equations and their solver-facing contract.
//!
//! An iterative solver derives the step quantities of every enabled equation
//! once per step ([`Equation::compute_b`], [`Equation::compute_inv_c`]), then
//! sweeps the equations Gauss-Seidel style, measuring the remaining violation
//! with [`Equation::compute_gw_lambda`] and feeding each accepted impulse
//! increment back into the body scratch velocities through
//! [`Equation::add_to_wlambda`], with the accumulated impulse clamped to the
//! equation's force bounds.

mod contact_equation;
mod equation;

pub use contact_equation::{AnyEquation, ContactEquation};
pub use equation::{EQUATION_DOF, Equation, EquationState, JacobianEquation};
