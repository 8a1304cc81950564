//! Storage for rigid bodies, addressed by handles.

use std::ops::{Index, IndexMut};

use crate::dynamics::RigidBody;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// An index into a [`RigidBodySet`].
///
/// Equations store handles rather than references: bodies are owned by the
/// set, and several equations may address the same body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBodyHandle(u32);

impl RigidBodyHandle {
    /// The raw index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous store of rigid bodies.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBodySet {
    bodies: Vec<RigidBody>,
}

impl RigidBodySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    /// The number of bodies in the set.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Inserts a body and returns its handle.
    pub fn insert(&mut self, body: RigidBody) -> RigidBodyHandle {
        let handle = RigidBodyHandle(self.bodies.len() as u32);
        self.bodies.push(body);
        handle
    }

    pub fn get(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.index())
    }

    /// Mutable access to two distinct bodies at once.
    ///
    /// Panics if both handles address the same body; an equation between a
    /// body and itself is not a valid constraint.
    pub fn get_pair_mut(
        &mut self,
        handle_a: RigidBodyHandle,
        handle_b: RigidBodyHandle,
    ) -> (&mut RigidBody, &mut RigidBody) {
        assert_ne!(
            handle_a, handle_b,
            "get_pair_mut requires two distinct bodies"
        );

        let (index_a, index_b) = (handle_a.index(), handle_b.index());
        if index_a < index_b {
            let (lo, hi) = self.bodies.split_at_mut(index_b);
            (&mut lo[index_a], &mut hi[0])
        } else {
            let (lo, hi) = self.bodies.split_at_mut(index_a);
            (&mut hi[0], &mut lo[index_b])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, rb)| (RigidBodyHandle(i as u32), rb))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RigidBodyHandle, &mut RigidBody)> {
        self.bodies
            .iter_mut()
            .enumerate()
            .map(|(i, rb)| (RigidBodyHandle(i as u32), rb))
    }
}

impl Index<RigidBodyHandle> for RigidBodySet {
    type Output = RigidBody;

    fn index(&self, handle: RigidBodyHandle) -> &RigidBody {
        &self.bodies[handle.index()]
    }
}

impl IndexMut<RigidBodyHandle> for RigidBodySet {
    fn index_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBodyBuilder;
    use crate::math::Vector;

    #[test]
    fn insert_returns_distinct_handles() {
        let mut bodies = RigidBodySet::new();
        let a = bodies.insert(RigidBodyBuilder::dynamic().build());
        let b = bodies.insert(RigidBodyBuilder::fixed().build());

        assert_ne!(a, b);
        assert_eq!(bodies.len(), 2);
        assert!(bodies[a].is_dynamic());
        assert!(!bodies[b].is_dynamic());
    }

    #[test]
    fn get_pair_mut_returns_both_bodies_in_order() {
        let mut bodies = RigidBodySet::new();
        let a = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(1.0, 0.0))
                .build(),
        );
        let b = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(2.0, 0.0))
                .build(),
        );

        let (rb_a, rb_b) = bodies.get_pair_mut(a, b);
        assert_eq!(rb_a.position.x, 1.0);
        assert_eq!(rb_b.position.x, 2.0);

        // Swapped handles swap the returned references.
        let (rb_b, rb_a) = bodies.get_pair_mut(b, a);
        assert_eq!(rb_a.position.x, 1.0);
        assert_eq!(rb_b.position.x, 2.0);
    }

    #[test]
    #[should_panic(expected = "distinct bodies")]
    fn get_pair_mut_rejects_aliased_handles() {
        let mut bodies = RigidBodySet::new();
        let a = bodies.insert(RigidBodyBuilder::dynamic().build());
        let _ = bodies.get_pair_mut(a, a);
    }
}
