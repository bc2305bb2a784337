/// Tolerance for double precision comparisons.
pub const VERY_SMALL: f64 = 1.0e-14;

/// Tolerance for comparisons against user-supplied ranges, which are rarely
/// given to better than single precision.
pub const VERY_SMALL_F: f64 = 1.0e-6;

pub const FULL_CIRCLE_DEGREES: f64 = 360.0;

/// Interactions wider than this are almost always a misconfigured angle or
/// dihedral discretization.
pub const MAX_COLUMNS_PER_INTERACTION: usize = 1000;
