use super::{dot, FemMesh, FemState, EDGE_IPS, LOCAL_S, N_LOCAL_U};
use crate::base::{Field, Segment};

/// Assists in the post-processing of results
///
/// # Examples
///
/// ```
/// use tpflow::prelude::*;
///
/// let mesh = SampleMeshes::unit_square(2, 2);
/// let config = Config::new();
/// let fem = FemMesh::new(&mesh, &config).unwrap();
/// let state = FemState::new(&fem);
/// let post = PostProc::new(&fem);
/// assert_eq!(post.total_divergence(&state), 0.0);
/// assert_eq!(post.saturation_range(&state), (0.0, 0.0));
/// ```
pub struct PostProc<'a> {
    fem: &'a FemMesh<'a>,
}

impl<'a> PostProc<'a> {
    /// Allocates a new instance
    pub fn new(fem: &'a FemMesh<'a>) -> Self {
        PostProc { fem }
    }

    /// Evaluates the velocity within a cell given barycentric coordinates
    pub fn velocity_at(&self, state: &FemState, cell: usize, ll: &[f64; 3]) -> [f64; 2] {
        let geo = &self.fem.geometry[cell];
        let l2g = &self.fem.local_to_global[cell];
        let mut u = [0.0; 2];
        for a in 0..N_LOCAL_U {
            let phi = geo.bdm_value(a, ll);
            u[0] += state.uu[l2g[a]] * phi[0];
            u[1] += state.uu[l2g[a]] * phi[1];
        }
        u
    }

    /// Returns the integral of div(u) over each cell
    pub fn cell_divergence_integrals(&self, state: &FemState) -> Vec<f64> {
        self.fem
            .geometry
            .iter()
            .zip(&self.fem.local_to_global)
            .map(|(geo, l2g)| {
                let div: f64 = (0..N_LOCAL_U).map(|a| state.uu[l2g[a]] * geo.bdm_div[a]).sum();
                div * geo.area
            })
            .collect()
    }

    /// Returns the integral of div(u) over the domain
    pub fn total_divergence(&self, state: &FemState) -> f64 {
        self.cell_divergence_integrals(state).iter().sum()
    }

    /// Returns the minimum and maximum vertex saturations
    pub fn saturation_range(&self, state: &FemState) -> (f64, f64) {
        let s = state.field(self.fem, Field::Saturation);
        let min = s.iter().fold(f64::INFINITY, |acc, v| f64::min(acc, *v));
        let max = s.iter().fold(f64::NEG_INFINITY, |acc, v| f64::max(acc, *v));
        (min, max)
    }

    /// Returns the pressure of each cell
    pub fn pressures(&self, state: &FemState) -> Vec<f64> {
        state.field(self.fem, Field::Pressure).to_vec()
    }

    /// Returns the saturation at each point
    pub fn saturations(&self, state: &FemState) -> Vec<f64> {
        state.field(self.fem, Field::Saturation).to_vec()
    }

    /// Returns the saturation at a point within a cell given barycentric coordinates
    pub fn saturation_at(&self, state: &FemState, cell: usize, ll: &[f64; 3]) -> f64 {
        let l2g = &self.fem.local_to_global[cell];
        (0..3).map(|m| ll[m] * state.uu[l2g[LOCAL_S + m]]).sum()
    }

    /// Projects the velocity onto the points (area-weighted average of the cell values at the vertices)
    pub fn nodal_velocities(&self, state: &FemState) -> Vec<[f64; 2]> {
        let npoint = self.fem.mesh.points.len();
        let mut sum = vec![[0.0; 2]; npoint];
        let mut weight = vec![0.0; npoint];
        for (cell, geo) in self.fem.geometry.iter().enumerate() {
            let points = &self.fem.mesh.cells[cell].points;
            for m in 0..3 {
                let mut ll = [0.0; 3];
                ll[m] = 1.0;
                let u = self.velocity_at(state, cell, &ll);
                sum[points[m]][0] += geo.area * u[0];
                sum[points[m]][1] += geo.area * u[1];
                weight[points[m]] += geo.area;
            }
        }
        sum.iter()
            .zip(&weight)
            .map(|(s, w)| if *w > 0.0 { [s[0] / w, s[1] / w] } else { [0.0, 0.0] })
            .collect()
    }

    /// Returns the outward flux ∫ u·n dΓ through a boundary segment
    pub fn boundary_flux(&self, state: &FemState, segment: Segment) -> f64 {
        let mut flux = 0.0;
        for facet in self.fem.facets_on(segment) {
            let geo = &self.fem.geometry[facet.cell];
            let n = geo.outward_normal(facet.local_edge);
            let length = geo.edge_length(facet.local_edge);
            for ip in &EDGE_IPS {
                let (ll, _) = geo.edge_point(facet.local_edge, ip[0]);
                let u = self.velocity_at(state, facet.cell, &ll);
                flux += ip[1] * length * dot(&u, &n);
            }
        }
        flux
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
