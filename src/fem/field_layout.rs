use crate::base::Field;
use std::ops::Range;

/// Number of local velocity equations of a triangle (two BDM₁ functions per edge)
pub const N_LOCAL_U: usize = 6;

/// Local equation number of the (constant) pressure of a triangle
pub const LOCAL_P: usize = 6;

/// Local equation number of the first saturation vertex value of a triangle
pub const LOCAL_S: usize = 7;

/// Total number of local equations of a triangle (6 velocity, 1 pressure, 3 saturation)
pub const N_LOCAL_EQ: usize = 10;

/// Describes the coupled unknown vector as three sub-fields
///
/// The global vector is ordered as follows:
///
/// ```text
/// ┌─────────────────────────┬──────────────────┬───────────────────┐
/// │ velocity u (2 × n_edge) │ pressure p (n_cell) │ saturation s (n_point) │
/// └─────────────────────────┴──────────────────┴───────────────────┘
/// ```
///
/// * The velocity DOFs are the normal fluxes (w.r.t the fixed edge normal) at the two endpoints of each edge
/// * The pressure DOFs are constant per cell
/// * The saturation DOFs are the vertex values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    /// Polynomial degree (only degree 1 is available)
    pub degree: usize,

    /// Number of edges
    pub n_edge: usize,

    /// Number of cells
    pub n_cell: usize,

    /// Number of points
    pub n_point: usize,

    /// Total number of equations
    pub n_equation: usize,
}

impl FieldLayout {
    /// Allocates a new instance
    pub fn new(degree: usize, n_edge: usize, n_cell: usize, n_point: usize) -> Self {
        FieldLayout {
            degree,
            n_edge,
            n_cell,
            n_point,
            n_equation: 2 * n_edge + n_cell + n_point,
        }
    }

    /// Returns the range of global equations of a sub-field
    pub fn range(&self, field: Field) -> Range<usize> {
        match field {
            Field::Velocity => 0..2 * self.n_edge,
            Field::Pressure => 2 * self.n_edge..2 * self.n_edge + self.n_cell,
            Field::Saturation => 2 * self.n_edge + self.n_cell..self.n_equation,
        }
    }

    /// Returns the velocity equation of an edge endpoint
    ///
    /// `end` is 0 for the endpoint with the smallest point id and 1 otherwise
    #[inline]
    pub fn eq_u(&self, edge: usize, end: usize) -> usize {
        2 * edge + end
    }

    /// Returns the pressure equation of a cell
    #[inline]
    pub fn eq_p(&self, cell: usize) -> usize {
        2 * self.n_edge + cell
    }

    /// Returns the saturation equation of a point
    #[inline]
    pub fn eq_s(&self, point: usize) -> usize {
        2 * self.n_edge + self.n_cell + point
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FieldLayout;
    use crate::base::Field;

    #[test]
    fn layout_works() {
        // two triangles: 5 edges, 2 cells, 4 points
        let layout = FieldLayout::new(1, 5, 2, 4);
        assert_eq!(layout.n_equation, 16);
        assert_eq!(layout.range(Field::Velocity), 0..10);
        assert_eq!(layout.range(Field::Pressure), 10..12);
        assert_eq!(layout.range(Field::Saturation), 12..16);
        assert_eq!(layout.eq_u(3, 1), 7);
        assert_eq!(layout.eq_p(1), 11);
        assert_eq!(layout.eq_s(0), 12);
        assert_eq!(layout.eq_s(3), 15);
    }
}
