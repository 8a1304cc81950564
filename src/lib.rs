//! Constraint-equation building blocks for a SPOOK-damped 2D rigid-body
//! solver.
//!
//! The crate provides the numerical core an iterative (projected
//! Gauss-Seidel) solver operates on: a generic bilateral constraint driven by
//! an explicit six-slot Jacobian row, and a non-penetration contact equation
//! that evaluates the same contract with direct vector algebra. Both derive
//! their stabilization from the SPOOK stepping scheme, which turns a
//! constraint's stiffness and relaxation into the per-step coefficients
//! `a`, `b`, and `epsilon`.
//!
//! Collision detection, the solver sweep itself, and world stepping are the
//! province of the surrounding engine: this crate consumes rigid-body state
//! and contact geometry, and produces incremental velocity changes on the
//! bodies' solver scratch accumulators.

pub extern crate nalgebra as na;

pub mod dynamics;
pub mod error;
pub mod math;
pub mod prelude;
