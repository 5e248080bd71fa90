use super::{dot, FemMesh};
use crate::base::{Bc, BcKind, BoundaryPolicy};
use russell_lab::Vector;

/// Assists in setting a prescribed normal velocity (flux) at the endpoint of a boundary edge
///
/// The normal velocity is an essential condition of the mixed formulation. It is only
/// applied on segments without a prescribed pressure.
pub struct BcPrescribed {
    /// Equation corresponding to the prescribed value
    pub eq: usize,

    /// Coordinates of the edge endpoint
    pub x: [f64; 2],

    /// Converts the outward flux into the flux w.r.t the fixed edge normal (±1)
    pub sign: f64,

    /// Normal velocity boundary condition
    pub bc: Bc,
}

/// Implements an array of BcPrescribed
pub struct BcPrescribedArray {
    /// All values
    pub all: Vec<BcPrescribed>,

    /// An array indicating which DOFs (equations) are prescribed
    ///
    /// The length of `flags` is equal to `n_equation`, the total number of DOFs (total number of equations).
    pub flags: Vec<bool>,

    /// Array with only the DOFs numbers of the prescribed equations
    pub equations: Vec<usize>,
}

impl BcPrescribed {
    /// Returns the value of the DOF (flux w.r.t the fixed edge normal)
    pub fn value(&self) -> f64 {
        self.sign * self.bc.value(&self.x)
    }
}

impl BcPrescribedArray {
    /// Allocates a new instance
    pub fn new(fem: &FemMesh, policy: &BoundaryPolicy) -> Self {
        let mut all = Vec::new();
        let mut flags = vec![false; fem.layout.n_equation];
        let mut equations = Vec::new();
        for facet in &fem.boundary {
            if policy.get(facet.segment, BcKind::Pressure).is_some() {
                continue;
            }
            if let Some(bc) = policy.get(facet.segment, BcKind::NormalVelocity) {
                let edge = &fem.edges[facet.edge];
                let n_out = fem.geometry[facet.cell].outward_normal(facet.local_edge);
                let sign = if dot(&edge.normal, &n_out) > 0.0 { 1.0 } else { -1.0 };
                for end in 0..2 {
                    let eq = fem.layout.eq_u(facet.edge, end);
                    let coords = &fem.mesh.points[edge.points[end]].coords;
                    all.push(BcPrescribed {
                        eq,
                        x: [coords[0], coords[1]],
                        sign,
                        bc: *bc,
                    });
                    flags[eq] = true;
                    equations.push(eq);
                }
            }
        }
        BcPrescribedArray { all, flags, equations }
    }

    /// Sets all prescribed values in the solution vector
    pub fn apply(&self, uu: &mut Vector) {
        self.all.iter().for_each(|e| uu[e.eq] = e.value());
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::BcPrescribedArray;
    use crate::base::{Bc, BoundaryPolicy, Config, SampleMeshes, Segment};
    use crate::fem::{FemMesh, FemState};

    #[test]
    fn new_and_apply_work() {
        //  3-----2
        //  | [1]/|
        //  |  /  |
        //  |/ [0]|
        //  0-----1
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();

        // the reference policy has pressures everywhere; thus no prescribed flux
        let policy = BoundaryPolicy::reference();
        let prescribed = BcPrescribedArray::new(&fem, &policy);
        assert_eq!(prescribed.equations.len(), 0);

        // inflow through the left side (edge 2 = (0, 3) with global normal (1, 0))
        // and no-flow on the bottom (edge 0 = (0, 1) with global normal (0, -1))
        let mut policy = BoundaryPolicy::new();
        policy
            .on(Segment::Left, Bc::NormalVelocity(|x| -1.0 - x[1]))
            .on(Segment::Bottom, Bc::NormalVelocity(|_| 0.0))
            .on(Segment::Right, Bc::Pressure(|_| 0.0))
            .on(Segment::Right, Bc::NormalVelocity(|_| 123.0));
        let prescribed = BcPrescribedArray::new(&fem, &policy);
        assert_eq!(prescribed.equations, &[4, 5, 0, 1]);
        assert_eq!(prescribed.flags.iter().filter(|f| **f).count(), 4);
        let mut state = FemState::new(&fem);
        state.uu.fill(9.0);
        prescribed.apply(&mut state.uu);
        assert_eq!(state.uu[4], 1.0); // point 0 at y = 0
        assert_eq!(state.uu[5], 2.0); // point 3 at y = 1
        assert_eq!(state.uu[0], 0.0);
        assert_eq!(state.uu[1], 0.0);
        assert_eq!(state.uu[6], 9.0);
    }
}
