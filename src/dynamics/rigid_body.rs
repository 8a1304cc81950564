//! Rigid-body state consumed and mutated by the constraint equations.

use crate::math::{AngVector, Real, Vector};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The dynamics category of a rigid body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Finite mass; moves in response to forces and impulses.
    Dynamic,
    /// Infinite mass and inertia; impulses have no effect on it.
    Fixed,
}

/// A 2D rigid body: two linear degrees of freedom and one angular.
///
/// Constraint equations read the kinematic state and mass properties, and
/// accumulate solver impulses into the `vlambda`/`wlambda` scratch
/// velocities. The scratch stays separate from the committed velocities
/// while an iterative solver sweeps the equations; it is folded in by
/// [`apply_constraint_velocity`](Self::apply_constraint_velocity) when the
/// solve of a step is finished.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// World-space position of the center of mass.
    pub position: Vector<Real>,
    /// Orientation angle in radians.
    pub angle: Real,
    /// Linear velocity.
    pub linvel: Vector<Real>,
    /// Angular velocity.
    pub angvel: AngVector<Real>,
    /// Force accumulated for the current step.
    pub force: Vector<Real>,
    /// Torque accumulated for the current step.
    pub torque: Real,
    /// Inverse mass; zero for fixed bodies.
    pub inv_mass: Real,
    /// Inverse moment of inertia; zero for fixed bodies.
    pub inv_inertia: Real,
    /// Inverse mass as seen by the generic equation path during a solve.
    pub inv_mass_solve: Real,
    /// Inverse inertia as seen by the generic equation path during a solve.
    pub inv_inertia_solve: Real,
    /// Per-axis scaling of the inverse mass on the generic equation path.
    /// Setting a component to zero locks the corresponding linear axis.
    pub mass_multiplier: Vector<Real>,
    /// Scratch linear velocity accumulated by the solver.
    pub vlambda: Vector<Real>,
    /// Scratch angular velocity accumulated by the solver.
    pub wlambda: AngVector<Real>,
    /// The dynamics category of this body.
    pub body_type: RigidBodyType,
}

impl RigidBody {
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    /// Clears the solver scratch velocities. A solver loop calls this before
    /// iterating the equations of a new step.
    pub fn reset_constraint_velocity(&mut self) {
        self.vlambda = Vector::zeros();
        self.wlambda = 0.0;
    }

    /// Folds the solved scratch velocities into the committed velocities.
    pub fn apply_constraint_velocity(&mut self) {
        self.linvel += self.vlambda;
        self.angvel += self.wlambda;
    }
}

/// Builder for [`RigidBody`].
#[derive(Copy, Clone, Debug)]
pub struct RigidBodyBuilder {
    body_type: RigidBodyType,
    position: Vector<Real>,
    angle: Real,
    linvel: Vector<Real>,
    angvel: AngVector<Real>,
    mass: Real,
    inertia: Real,
    mass_multiplier: Vector<Real>,
}

impl RigidBodyBuilder {
    /// Starts building a body of the given type, at the origin, with unit
    /// mass and inertia.
    pub fn new(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            position: Vector::zeros(),
            angle: 0.0,
            linvel: Vector::zeros(),
            angvel: 0.0,
            mass: 1.0,
            inertia: 1.0,
            mass_multiplier: Vector::new(1.0, 1.0),
        }
    }

    /// Starts building a dynamic body.
    pub fn dynamic() -> Self {
        Self::new(RigidBodyType::Dynamic)
    }

    /// Starts building a fixed body.
    pub fn fixed() -> Self {
        Self::new(RigidBodyType::Fixed)
    }

    /// Sets the initial position of the center of mass.
    pub fn translation(mut self, position: Vector<Real>) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial orientation angle in radians.
    pub fn rotation(mut self, angle: Real) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the initial linear velocity.
    pub fn linvel(mut self, linvel: Vector<Real>) -> Self {
        self.linvel = linvel;
        self
    }

    /// Sets the initial angular velocity.
    pub fn angvel(mut self, angvel: AngVector<Real>) -> Self {
        self.angvel = angvel;
        self
    }

    /// Sets the mass. A zero mass makes the body ignore linear impulses even
    /// when dynamic.
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the moment of inertia. A zero inertia makes the body ignore
    /// angular impulses even when dynamic.
    pub fn inertia(mut self, inertia: Real) -> Self {
        self.inertia = inertia;
        self
    }

    /// Sets the per-axis linear mass scaling used by the generic equation
    /// path.
    pub fn mass_multiplier(mut self, mass_multiplier: Vector<Real>) -> Self {
        self.mass_multiplier = mass_multiplier;
        self
    }

    /// Builds the rigid body.
    pub fn build(self) -> RigidBody {
        let mass = sanitize_mass_input(self.mass, "mass");
        let inertia = sanitize_mass_input(self.inertia, "inertia");

        let (inv_mass, inv_inertia) = match self.body_type {
            RigidBodyType::Fixed => (0.0, 0.0),
            RigidBodyType::Dynamic => (checked_inverse(mass), checked_inverse(inertia)),
        };

        RigidBody {
            position: self.position,
            angle: self.angle,
            linvel: self.linvel,
            angvel: self.angvel,
            force: Vector::zeros(),
            torque: 0.0,
            inv_mass,
            inv_inertia,
            inv_mass_solve: inv_mass,
            inv_inertia_solve: inv_inertia,
            mass_multiplier: self.mass_multiplier,
            vlambda: Vector::zeros(),
            wlambda: 0.0,
            body_type: self.body_type,
        }
    }
}

fn sanitize_mass_input(value: Real, what: &str) -> Real {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("ignoring invalid rigid-body {what} {value}, treating it as zero");
        0.0
    }
}

fn checked_inverse(value: Real) -> Real {
    if value > 0.0 { 1.0 / value } else { 0.0 }
}
