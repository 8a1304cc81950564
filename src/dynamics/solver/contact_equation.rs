use crate::dynamics::{RigidBodyHandle, RigidBodySet};
use crate::math::{Real, Vector};

use super::{Equation, EquationState, JacobianEquation};

/// Constraint equation variants understood by a solver loop.
///
/// Dispatch is a plain `match`: the kinds share no state beyond
/// [`EquationState`], and a solver selects behavior by variant rather than
/// through virtual calls.
pub enum AnyEquation {
    /// Generic equation driven by an explicit Jacobian row.
    Jacobian(JacobianEquation),
    /// Non-penetration contact equation.
    Contact(ContactEquation),
}

impl AnyEquation {
    pub fn contact(&self) -> Option<&ContactEquation> {
        match self {
            AnyEquation::Contact(c) => Some(c),
            _ => None,
        }
    }

    pub fn contact_mut(&mut self) -> Option<&mut ContactEquation> {
        match self {
            AnyEquation::Contact(c) => Some(c),
            _ => None,
        }
    }

    pub fn jacobian(&self) -> Option<&JacobianEquation> {
        match self {
            AnyEquation::Jacobian(j) => Some(j),
            _ => None,
        }
    }

    pub fn jacobian_mut(&mut self) -> Option<&mut JacobianEquation> {
        match self {
            AnyEquation::Jacobian(j) => Some(j),
            _ => None,
        }
    }
}

impl Equation for AnyEquation {
    fn state(&self) -> &EquationState {
        match self {
            AnyEquation::Jacobian(j) => j.state(),
            AnyEquation::Contact(c) => c.state(),
        }
    }

    fn state_mut(&mut self) -> &mut EquationState {
        match self {
            AnyEquation::Jacobian(j) => j.state_mut(),
            AnyEquation::Contact(c) => c.state_mut(),
        }
    }

    fn compute_b(&mut self, a: Real, b: Real, h: Real, bodies: &RigidBodySet) -> Real {
        match self {
            AnyEquation::Jacobian(j) => j.compute_b(a, b, h, bodies),
            AnyEquation::Contact(c) => c.compute_b(a, b, h, bodies),
        }
    }

    fn compute_inv_c(&mut self, eps: Real, bodies: &RigidBodySet) -> Real {
        match self {
            AnyEquation::Jacobian(j) => j.compute_inv_c(eps, bodies),
            AnyEquation::Contact(c) => c.compute_inv_c(eps, bodies),
        }
    }

    fn compute_gw_lambda(&self, bodies: &RigidBodySet) -> Real {
        match self {
            AnyEquation::Jacobian(j) => j.compute_gw_lambda(bodies),
            AnyEquation::Contact(c) => c.compute_gw_lambda(bodies),
        }
    }

    fn add_to_wlambda(&self, delta_lambda: Real, bodies: &mut RigidBodySet) {
        match self {
            AnyEquation::Jacobian(j) => j.add_to_wlambda(delta_lambda, bodies),
            AnyEquation::Contact(c) => c.add_to_wlambda(delta_lambda, bodies),
        }
    }
}

/// Non-penetration constraint at a contact point between two bodies.
///
/// The collision-detection collaborator fills in `ri`, `rj`, `ni`, and
/// `penetration` each step before `compute_b` runs. A contact only pushes:
/// the force bounds are fixed to `[0, MAX_CONTACT_FORCE]`.
///
/// The scalar separation constraint is evaluated with direct vector algebra
/// instead of the generic Jacobian row; the lever-arm cross products are
/// cached once per step by `compute_b` and reused across solver iterations.
pub struct ContactEquation {
    state: EquationState,
    /// Lever arm from body A's center of mass to the contact point, in world
    /// orientation.
    pub ri: Vector<Real>,
    /// Lever arm from body B's center of mass to the contact point, in world
    /// orientation.
    pub rj: Vector<Real>,
    /// Unit contact normal, pointing from body A toward body B. Body B
    /// separates from body A along `+ni`.
    pub ni: Vector<Real>,
    /// Signed contact depth: positive when the bodies overlap, negative when
    /// they are separated.
    pub penetration: Real,
    rixn: Real,
    rjxn: Real,
}

impl ContactEquation {
    /// Upper force bound of a contact.
    pub const MAX_CONTACT_FORCE: Real = 1.0e6;

    pub fn new(body_a: RigidBodyHandle, body_b: RigidBodyHandle) -> Self {
        Self {
            state: EquationState::with_force_bounds(
                body_a,
                body_b,
                0.0,
                Self::MAX_CONTACT_FORCE,
            ),
            ri: Vector::zeros(),
            rj: Vector::zeros(),
            ni: Vector::zeros(),
            penetration: 0.0,
            rixn: 0.0,
            rjxn: 0.0,
        }
    }

    /// The cross product `ri × ni`, cached by the last `compute_b`.
    pub fn rixn(&self) -> Real {
        self.rixn
    }

    /// The cross product `rj × ni`, cached by the last `compute_b`.
    pub fn rjxn(&self) -> Real {
        self.rjxn
    }

    /// The summed effective-mass denominator
    /// `C = invM_a + invM_b + eps + invI_a (ri × n)² + invI_b (rj × n)²`.
    ///
    /// Valid only after `compute_b` has cached the cross products this step.
    pub fn compute_c(&self, eps: Real, bodies: &RigidBodySet) -> Real {
        let rb_a = &bodies[self.state.body_a];
        let rb_b = &bodies[self.state.body_b];

        rb_a.inv_mass
            + rb_b.inv_mass
            + eps
            + rb_a.inv_inertia * self.rixn * self.rixn
            + rb_b.inv_inertia * self.rjxn * self.rjxn
    }
}

impl Equation for ContactEquation {
    fn state(&self) -> &EquationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EquationState {
        &mut self.state
    }

    fn compute_b(&mut self, a: Real, b: Real, h: Real, bodies: &RigidBodySet) -> Real {
        let rb_a = &bodies[self.state.body_a];
        let rb_b = &bodies[self.state.body_b];
        let n = &self.ni;

        let rixn = self.ri.perp(n);
        let rjxn = self.rj.perp(n);
        self.rixn = rixn;
        self.rjxn = rjxn;

        // q = (xj + rj) - (xi + ri): the world-space separation of the two
        // contact anchors.
        let penetration_vec = (rb_b.position + self.rj) - (rb_a.position + self.ri);
        let gq = n.dot(&penetration_vec);

        let gw = rb_b.linvel.dot(n) - rb_a.linvel.dot(n) + rb_b.angvel * rjxn
            - rb_a.angvel * rixn;
        let gimf = rb_b.force.dot(n) * rb_b.inv_mass - rb_a.force.dot(n) * rb_a.inv_mass
            + rb_b.inv_inertia * rb_b.torque * rjxn
            - rb_a.inv_inertia * rb_a.torque * rixn;

        -gq * a - gw * b - h * gimf
    }

    fn compute_inv_c(&mut self, eps: Real, bodies: &RigidBodySet) -> Real {
        let inv_c = 1.0 / self.compute_c(eps, bodies);
        self.state.inv_c = inv_c;
        inv_c
    }

    fn compute_gw_lambda(&self, bodies: &RigidBodySet) -> Real {
        let rb_a = &bodies[self.state.body_a];
        let rb_b = &bodies[self.state.body_b];

        let ulambda = rb_b.vlambda - rb_a.vlambda;
        ulambda.dot(&self.ni) - rb_a.wlambda * self.rixn + rb_b.wlambda * self.rjxn
    }

    fn add_to_wlambda(&self, delta_lambda: Real, bodies: &mut RigidBodySet) {
        let n = &self.ni;
        let (rb_a, rb_b) = bodies.get_pair_mut(self.state.body_a, self.state.body_b);

        rb_a.vlambda -= n * (rb_a.inv_mass * delta_lambda);
        rb_b.vlambda += n * (rb_b.inv_mass * delta_lambda);

        rb_a.wlambda -= rb_a.inv_inertia * self.rixn * delta_lambda;
        rb_b.wlambda += rb_b.inv_inertia * self.rjxn * delta_lambda;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::dynamics::RigidBodyBuilder;

    fn body_pair(
        xa: Vector<Real>,
        xb: Vector<Real>,
    ) -> (RigidBodySet, RigidBodyHandle, RigidBodyHandle) {
        let mut bodies = RigidBodySet::new();
        let a = bodies.insert(RigidBodyBuilder::dynamic().translation(xa).build());
        let b = bodies.insert(RigidBodyBuilder::dynamic().translation(xb).build());
        (bodies, a, b)
    }

    #[test]
    fn contacts_only_push() {
        let (_, a, b) = body_pair(Vector::zeros(), Vector::new(1.0, 0.0));
        let eq = ContactEquation::new(a, b);

        assert_eq!(eq.state().min_force, 0.0);
        assert_eq!(eq.state().max_force, ContactEquation::MAX_CONTACT_FORCE);
    }

    #[test]
    fn equal_mass_impulse_symmetry() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(1.0, 0.0));
        let mut eq = ContactEquation::new(a, b);
        eq.ni = Vector::new(1.0, 0.0);

        // Zero lever arms: the cached cross products vanish and the response
        // is purely linear.
        eq.compute_b(1.0, 1.0, 1.0 / 60.0, &bodies);
        assert_eq!(eq.rixn(), 0.0);
        assert_eq!(eq.rjxn(), 0.0);

        eq.add_to_wlambda(0.7, &mut bodies);
        assert_relative_eq!(bodies[a].vlambda.x, -0.7, max_relative = 1.0e-12);
        assert_relative_eq!(bodies[b].vlambda.x, 0.7, max_relative = 1.0e-12);
        assert_eq!(bodies[a].wlambda, 0.0);
        assert_eq!(bodies[b].wlambda, 0.0);
    }

    #[test]
    fn overlap_produces_a_separating_rhs() {
        // Two unit circles of radius 0.5 whose centers are 0.8 apart along x:
        // they overlap by 0.2.
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(0.8, 0.0));
        let mut eq = ContactEquation::new(a, b);
        eq.ni = Vector::new(1.0, 0.0);
        eq.ri = Vector::new(0.5, 0.0);
        eq.rj = Vector::new(-0.5, 0.0);
        eq.penetration = 0.2;

        let (ca, cb, h) = (60.0, 16.0 / 17.0, 1.0 / 60.0);
        let rhs = eq.compute_b(ca, cb, h, &bodies);

        // Gq is the signed separation of the anchors: -penetration here.
        assert_relative_eq!(rhs, 0.2 * ca, max_relative = 1.0e-9);

        // A positive impulse then drives the bodies apart along ±ni.
        let inv_c = eq.compute_inv_c(1.0e-8, &bodies);
        let delta = inv_c * rhs;
        assert!(delta > 0.0);
        eq.add_to_wlambda(delta, &mut bodies);
        assert!(bodies[a].vlambda.x < 0.0);
        assert!(bodies[b].vlambda.x > 0.0);
    }

    #[test]
    fn compute_c_sums_effective_masses() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(0.0, 1.0));
        bodies[a].inv_mass = 0.5;
        bodies[a].inv_inertia = 0.25;
        bodies[b].inv_mass = 1.0;
        bodies[b].inv_inertia = 2.0;

        let mut eq = ContactEquation::new(a, b);
        eq.ni = Vector::new(0.0, 1.0);
        eq.ri = Vector::new(0.5, 0.0);
        eq.rj = Vector::new(-0.5, 0.0);
        eq.compute_b(1.0, 1.0, 1.0 / 60.0, &bodies);

        assert_relative_eq!(eq.rixn(), 0.5, max_relative = 1.0e-12);
        assert_relative_eq!(eq.rjxn(), -0.5, max_relative = 1.0e-12);

        let eps = 1.0e-4;
        assert_relative_eq!(
            eq.compute_c(eps, &bodies),
            0.5 + 1.0 + eps + 0.25 * 0.25 + 2.0 * 0.25,
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn gw_lambda_measures_scratch_closing_speed() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(0.0, 1.0));
        let mut eq = ContactEquation::new(a, b);
        eq.ni = Vector::new(0.0, 1.0);
        eq.ri = Vector::new(0.5, 0.0);
        eq.rj = Vector::new(-0.5, 0.0);
        eq.compute_b(1.0, 1.0, 1.0 / 60.0, &bodies);

        bodies[a].vlambda = Vector::new(0.0, -1.0);
        bodies[b].vlambda = Vector::new(0.0, 2.0);
        bodies[a].wlambda = 0.5;
        bodies[b].wlambda = -0.5;

        // (vlambda_b - vlambda_a) · n - wlambda_a (ri × n) + wlambda_b (rj × n)
        assert_relative_eq!(
            eq.compute_gw_lambda(&bodies),
            3.0 - 0.5 * 0.5 + (-0.5) * (-0.5),
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn offset_contact_spins_the_bodies() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(0.0, 1.0));
        bodies[a].inv_inertia = 0.25;
        bodies[b].inv_inertia = 0.25;

        let mut eq = ContactEquation::new(a, b);
        eq.ni = Vector::new(0.0, 1.0);
        eq.ri = Vector::new(0.5, 0.0);
        eq.rj = Vector::new(0.5, 0.0);
        eq.compute_b(1.0, 1.0, 1.0 / 60.0, &bodies);

        eq.add_to_wlambda(2.0, &mut bodies);
        assert_relative_eq!(bodies[a].wlambda, -0.25 * 0.5 * 2.0, max_relative = 1.0e-12);
        assert_relative_eq!(bodies[b].wlambda, 0.25 * 0.5 * 2.0, max_relative = 1.0e-12);
    }

    #[test]
    fn degenerate_normal_yields_a_null_response() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(1.0, 0.0));
        let mut eq = ContactEquation::new(a, b);
        // ni left at zero: the Jacobian degenerates without special-casing.
        let rhs = eq.compute_b(60.0, 1.0, 1.0 / 60.0, &bodies);
        assert_eq!(rhs, 0.0);

        eq.add_to_wlambda(1.0, &mut bodies);
        assert_eq!(bodies[a].vlambda, Vector::zeros());
        assert_eq!(bodies[b].vlambda, Vector::zeros());
    }

    #[test]
    fn any_equation_dispatches_to_the_contact_path() {
        let (mut bodies, a, b) = body_pair(Vector::zeros(), Vector::new(1.0, 0.0));
        let mut contact = ContactEquation::new(a, b);
        contact.ni = Vector::new(1.0, 0.0);
        let mut eq = AnyEquation::Contact(contact);

        assert!(eq.contact().is_some());
        assert!(eq.jacobian().is_none());

        eq.compute_b(1.0, 1.0, 1.0 / 60.0, &bodies);
        eq.add_to_wlambda(1.0, &mut bodies);
        assert_relative_eq!(bodies[b].vlambda.x, 1.0, max_relative = 1.0e-12);
    }
}
