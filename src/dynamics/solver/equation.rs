use crate::dynamics::{RigidBody, RigidBodyHandle, RigidBodySet};
use crate::error::EquationError;
use crate::math::{Real, SPATIAL_DIM, Vector};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Number of Jacobian slots of a two-body equation: three generalized
/// coordinates (x, y, angle) per body.
pub const EQUATION_DOF: usize = 2 * SPATIAL_DIM;

/// State shared by every equation kind: the constrained body pair, impulse
/// bounds, the SPOOK parameters with their derived coefficients, and the
/// scalar results of the last solve.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct EquationState {
    /// First constrained body.
    pub body_a: RigidBodyHandle,
    /// Second constrained body.
    pub body_b: RigidBodyHandle,
    /// Lower bound on the solved constraint force.
    pub min_force: Real,
    /// Upper bound on the solved constraint force.
    pub max_force: Real,
    /// Constraint stiffness \(k\).
    pub stiffness: Real,
    /// Number of time steps over which the constraint error is relaxed \(d\).
    pub relaxation: Real,
    /// The time step the SPOOK coefficients were derived for.
    pub time_step: Real,
    /// SPOOK coefficient \(a\); valid after [`update`](Self::update).
    pub a: Real,
    /// SPOOK coefficient \(b\); valid after [`update`](Self::update).
    pub b: Real,
    /// SPOOK regularization \(\varepsilon\); valid after [`update`](Self::update).
    pub epsilon: Real,
    /// Set when stiffness, relaxation, or the time step changed after the
    /// coefficients were last derived.
    pub needs_update: bool,
    /// Constraint force from the last solve: the accumulated impulse divided
    /// by the time step.
    pub multiplier: Real,
    /// Velocity-level bias added to \(G W\) by the generic equation path.
    pub relative_velocity: Real,
    /// Accumulated impulse from the last solve.
    pub lambda: Real,
    /// SPOOK right-hand side from the last solve.
    pub rhs: Real,
    /// Inverse of the regularized effective mass from the last solve.
    pub inv_c: Real,
    /// Whether a solver should include this equation in its sweeps.
    pub enabled: bool,
}

impl EquationState {
    /// The default constraint stiffness.
    pub const DEFAULT_STIFFNESS: Real = 1.0e6;
    /// The default constraint relaxation.
    pub const DEFAULT_RELAXATION: Real = 4.0;

    /// Creates the state of an unbounded equation between two bodies.
    pub fn new(body_a: RigidBodyHandle, body_b: RigidBodyHandle) -> Self {
        Self::with_force_bounds(body_a, body_b, -Real::MAX, Real::MAX)
    }

    /// Creates the state of an equation with explicit force bounds.
    pub fn with_force_bounds(
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        min_force: Real,
        max_force: Real,
    ) -> Self {
        debug_assert!(min_force <= max_force);

        Self {
            body_a,
            body_b,
            min_force,
            max_force,
            stiffness: Self::DEFAULT_STIFFNESS,
            relaxation: Self::DEFAULT_RELAXATION,
            time_step: 1.0 / 60.0,
            a: 0.0,
            b: 0.0,
            epsilon: 0.0,
            needs_update: true,
            multiplier: 0.0,
            relative_velocity: 0.0,
            lambda: 0.0,
            rhs: 0.0,
            inv_c: 0.0,
            enabled: true,
        }
    }

    /// Derives the SPOOK coefficients from the current stiffness \(k\),
    /// relaxation \(d\), and time step \(h\) (equations 9, 10 and 11 of the
    /// SPOOK notes):
    ///
    /// ```text
    /// a       = 4 / (h (1 + 4 d))
    /// b       = 4 d / (1 + 4 d)
    /// epsilon = 4 / (h² k (1 + 4 d))
    /// ```
    ///
    /// Must be called again whenever `stiffness`, `relaxation`, or
    /// `time_step` change; staleness is not auto-detected, and the equation
    /// keeps using the previously derived coefficients otherwise.
    ///
    /// Rejects non-positive (or non-finite) parameters, which would make the
    /// coefficients ill-defined.
    pub fn update(&mut self) -> Result<(), EquationError> {
        let k = self.stiffness;
        let d = self.relaxation;
        let h = self.time_step;

        if !(k > 0.0) {
            return Err(EquationError::InvalidStiffness(k));
        }
        if !(d > 0.0) {
            return Err(EquationError::InvalidRelaxation(d));
        }
        if !(h > 0.0) {
            return Err(EquationError::InvalidTimeStep(h));
        }

        self.a = 4.0 / (h * (1.0 + 4.0 * d));
        self.b = (4.0 * d) / (1.0 + 4.0 * d);
        self.epsilon = 4.0 / (h * h * k * (1.0 + 4.0 * d));
        self.needs_update = false;

        Ok(())
    }

    /// Sets the stiffness and flags the coefficients for recomputation.
    pub fn set_stiffness(&mut self, stiffness: Real) {
        self.stiffness = stiffness;
        self.needs_update = true;
    }

    /// Sets the relaxation and flags the coefficients for recomputation.
    pub fn set_relaxation(&mut self, relaxation: Real) {
        self.relaxation = relaxation;
        self.needs_update = true;
    }

    /// Sets the time step and flags the coefficients for recomputation.
    pub fn set_time_step(&mut self, time_step: Real) {
        self.time_step = time_step;
        self.needs_update = true;
    }
}

/// Core interface every constraint equation exposes to a solver loop.
///
/// The per-step protocol: derive the step quantities once per step
/// (`compute_b`, `compute_inv_c`), then during each Gauss-Seidel sweep
/// measure the remaining violation with `compute_gw_lambda` and feed the
/// accepted impulse increment back through `add_to_wlambda` — exactly once
/// per accepted iteration. The solver owns the clamping of the accumulated
/// impulse to `min_force * h ..= max_force * h`.
///
/// The hot-path methods perform no validation: non-finite body or parameter
/// state propagates through the returned scalars rather than interrupting
/// the solve.
pub trait Equation {
    /// The shared bounds/flags/SPOOK record of this equation.
    fn state(&self) -> &EquationState;

    /// Mutable access to the shared record.
    fn state_mut(&mut self) -> &mut EquationState;

    /// Computes the SPOOK right-hand side
    /// \(B = -G q \cdot a - G W \cdot b - G M^{-1} f \cdot h\),
    /// the residual a solver drives toward zero.
    fn compute_b(&mut self, a: Real, b: Real, h: Real, bodies: &RigidBodySet) -> Real;

    /// Computes the inverse of the regularized effective mass
    /// \(1 / (G M^{-1} G^T + \varepsilon)\), recording it in the state.
    fn compute_inv_c(&mut self, eps: Real, bodies: &RigidBodySet) -> Real;

    /// Projects the constraint against the solver scratch velocities
    /// (`vlambda`, `wlambda`) instead of the committed velocities.
    fn compute_gw_lambda(&self, bodies: &RigidBodySet) -> Real;

    /// Applies an impulse increment of magnitude `delta_lambda` along the
    /// constraint direction to the scratch velocities of both bodies,
    /// scaled by their inverse mass and inertia.
    fn add_to_wlambda(&self, delta_lambda: Real, bodies: &mut RigidBodySet);
}

/// A generic SPOOK-damped bilateral constraint described by an explicit
/// six-slot Jacobian row `[x_a, y_a, ang_a, x_b, y_b, ang_b]`.
///
/// Joint-style constraints are expressed by filling in `g` (and encoding
/// position-level error into `offset`); the equation then provides every
/// projection a solver needs through the [`Equation`] trait.
pub struct JacobianEquation {
    state: EquationState,
    /// The Jacobian row of this equation, zero-initialized.
    pub g: [Real; EQUATION_DOF],
    /// Position-level bias added to \(G q\).
    pub offset: Real,
}

impl JacobianEquation {
    /// Creates an unbounded equation with a zero Jacobian.
    pub fn new(body_a: RigidBodyHandle, body_b: RigidBodyHandle) -> Self {
        Self::with_force_bounds(body_a, body_b, -Real::MAX, Real::MAX)
    }

    /// Creates an equation with explicit force bounds and a zero Jacobian.
    pub fn with_force_bounds(
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        min_force: Real,
        max_force: Real,
    ) -> Self {
        Self {
            state: EquationState::with_force_bounds(body_a, body_b, min_force, max_force),
            g: [0.0; EQUATION_DOF],
            offset: 0.0,
        }
    }

    /// Multiplies a Jacobian row with a pair of generalized velocities:
    /// `G · [vi.x, vi.y, wi, vj.x, vj.y, wj]`.
    pub fn gmult(
        g: &[Real; EQUATION_DOF],
        vi: &Vector<Real>,
        wi: Real,
        vj: &Vector<Real>,
        wj: Real,
    ) -> Real {
        g[0] * vi.x + g[1] * vi.y + g[2] * wi + g[3] * vj.x + g[4] * vj.y + g[5] * wj
    }

    fn body_pair<'a>(&self, bodies: &'a RigidBodySet) -> (&'a RigidBody, &'a RigidBody) {
        (&bodies[self.state.body_a], &bodies[self.state.body_b])
    }

    /// Projects the Jacobian against the generalized body positions, plus
    /// the position-level `offset` bias.
    ///
    /// The linear slots project against a zero placeholder: only the body
    /// angles contribute directly, and linear position-level error is
    /// carried by `offset`.
    pub fn compute_gq(&self, bodies: &RigidBodySet) -> Real {
        let (rb_a, rb_b) = self.body_pair(bodies);
        let q = Vector::zeros();
        Self::gmult(&self.g, &q, rb_a.angle, &q, rb_b.angle) + self.offset
    }

    /// Projects the Jacobian against the committed body velocities, plus the
    /// `relative_velocity` bias: the constraint's current velocity-level
    /// violation.
    pub fn compute_gw(&self, bodies: &RigidBodySet) -> Real {
        let (rb_a, rb_b) = self.body_pair(bodies);
        Self::gmult(&self.g, &rb_a.linvel, rb_a.angvel, &rb_b.linvel, rb_b.angvel)
            + self.state.relative_velocity
    }

    /// Projects the Jacobian against \(M^{-1} f\), the free acceleration of
    /// the pair, with the per-axis mass multiplier applied to the linear
    /// parts.
    pub fn compute_gimf(&self, bodies: &RigidBodySet) -> Real {
        let (rb_a, rb_b) = self.body_pair(bodies);
        let imf_a = (rb_a.force * rb_a.inv_mass_solve).component_mul(&rb_a.mass_multiplier);
        let imf_b = (rb_b.force * rb_b.inv_mass_solve).component_mul(&rb_b.mass_multiplier);

        Self::gmult(
            &self.g,
            &imf_a,
            rb_a.torque * rb_a.inv_inertia_solve,
            &imf_b,
            rb_b.torque * rb_b.inv_inertia_solve,
        )
    }

    /// Computes \(G M^{-1} G^T\): the effective inverse mass seen by this
    /// equation, linear terms scaled by the mass multiplier and angular
    /// terms by the inverse inertia.
    pub fn compute_gimgt(&self, bodies: &RigidBodySet) -> Real {
        let (rb_a, rb_b) = self.body_pair(bodies);
        let g = &self.g;

        g[0] * g[0] * rb_a.inv_mass_solve * rb_a.mass_multiplier.x
            + g[1] * g[1] * rb_a.inv_mass_solve * rb_a.mass_multiplier.y
            + g[2] * g[2] * rb_a.inv_inertia_solve
            + g[3] * g[3] * rb_b.inv_mass_solve * rb_b.mass_multiplier.x
            + g[4] * g[4] * rb_b.inv_mass_solve * rb_b.mass_multiplier.y
            + g[5] * g[5] * rb_b.inv_inertia_solve
    }
}

impl Equation for JacobianEquation {
    fn state(&self) -> &EquationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EquationState {
        &mut self.state
    }

    fn compute_b(&mut self, a: Real, b: Real, h: Real, bodies: &RigidBodySet) -> Real {
        let gq = self.compute_gq(bodies);
        let gw = self.compute_gw(bodies);
        let gimf = self.compute_gimf(bodies);
        -gq * a - gw * b - gimf * h
    }

    fn compute_inv_c(&mut self, eps: Real, bodies: &RigidBodySet) -> Real {
        let inv_c = 1.0 / (self.compute_gimgt(bodies) + eps);
        self.state.inv_c = inv_c;
        inv_c
    }

    fn compute_gw_lambda(&self, bodies: &RigidBodySet) -> Real {
        let (rb_a, rb_b) = self.body_pair(bodies);
        Self::gmult(
            &self.g,
            &rb_a.vlambda,
            rb_a.wlambda,
            &rb_b.vlambda,
            rb_b.wlambda,
        )
    }

    fn add_to_wlambda(&self, delta_lambda: Real, bodies: &mut RigidBodySet) {
        let g = &self.g;
        let g_a = Vector::new(g[0], g[1]);
        let g_b = Vector::new(g[3], g[4]);

        let (rb_a, rb_b) = bodies.get_pair_mut(self.state.body_a, self.state.body_b);

        rb_a.vlambda +=
            (g_a * (rb_a.inv_mass_solve * delta_lambda)).component_mul(&rb_a.mass_multiplier);
        rb_a.wlambda += rb_a.inv_inertia_solve * g[2] * delta_lambda;

        rb_b.vlambda +=
            (g_b * (rb_b.inv_mass_solve * delta_lambda)).component_mul(&rb_b.mass_multiplier);
        rb_b.wlambda += rb_b.inv_inertia_solve * g[5] * delta_lambda;
    }
}
