//! Type aliases and dimension constants for 2D rigid-body math.

use crate::na;

/// The scalar type used throughout the crate.
pub type Real = f64;

/// The 2D linear vector type.
pub type Vector<N> = na::Vector2<N>;

/// The angular counterpart of [`Vector`]: a single scalar in 2D.
pub type AngVector<N> = N;

/// The number of linear degrees of freedom of a body.
pub const DIM: usize = 2;

/// The number of angular degrees of freedom of a body.
pub const ANG_DIM: usize = 1;

/// The total number of generalized coordinates of a body.
pub const SPATIAL_DIM: usize = 3;
