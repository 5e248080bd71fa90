use crate::StrError;

/// Holds the integration points of a triangle (degree 4, 6 points)
///
/// Each row holds the barycentric coordinates (L₀, L₁, L₂) and the weight (the weights add up to 1;
/// thus they must be multiplied by the area of the triangle).
pub const TRI_IPS: [[f64; 4]; 6] = [
    [0.445948490915965, 0.445948490915965, 0.108103018168070, 0.223381589678011],
    [0.445948490915965, 0.108103018168070, 0.445948490915965, 0.223381589678011],
    [0.108103018168070, 0.445948490915965, 0.445948490915965, 0.223381589678011],
    [0.091576213509771, 0.091576213509771, 0.816847572980459, 0.109951743655322],
    [0.091576213509771, 0.816847572980459, 0.091576213509771, 0.109951743655322],
    [0.816847572980459, 0.091576213509771, 0.091576213509771, 0.109951743655322],
];

/// Holds the integration points of an edge (Gauss-Legendre, 2 points)
///
/// Each row holds the coordinate ξ ∈ [0, 1] along the edge and the weight (the weights add up to 1;
/// thus they must be multiplied by the length of the edge).
pub const EDGE_IPS: [[f64; 2]; 2] = [
    [0.211324865405187117745425609749, 0.5],
    [0.788675134594812882254574390251, 0.5],
];

/// Returns the local vertices (i, j) of a local edge k of a triangle
///
/// ```text
///       2
///      / \
///  e2 /   \ e1
///    /     \
///   0-------1
///       e0
/// ```
#[inline]
pub fn edge_vertices(k: usize) -> (usize, usize) {
    (k, (k + 1) % 3)
}

/// Holds the geometry of a straight-sided triangle and its lowest-order BDM basis
///
/// The BDM₁ space has two functions per edge. For the edge (i, j) and the fixed
/// (global) edge normal n̄, the functions are:
///
/// ```text
///       λᵢ curl λⱼ            λⱼ curl λᵢ
/// φ = —————————————    ψ = —————————————     curl λ = (∂λ/∂y, -∂λ/∂x)
///      curl λⱼ · n̄            curl λᵢ · n̄
/// ```
///
/// such that `φ·n̄ = λᵢ` and `ψ·n̄ = λⱼ` on the edge (i, j) with zero normal components on the
/// other edges. Hence the degree-of-freedom is the normal velocity at the edge endpoint.
#[derive(Clone, Debug)]
pub struct CellGeometry {
    /// Coordinates of the vertices
    pub coords: [[f64; 2]; 3],

    /// Area
    pub area: f64,

    /// Gradients of the barycentric coordinates ∇λₘ (constant)
    pub grad: [[f64; 2]; 3],

    /// Largest edge length
    pub diameter: f64,

    /// Constant vector part of each BDM function (ordered as edge 0 (i, j), edge 1 (i, j), edge 2 (i, j))
    pub bdm_vec: [[f64; 2]; 6],

    /// Local vertex whose barycentric coordinate multiplies each BDM function
    pub bdm_vertex: [usize; 6],

    /// Divergence of each BDM function (constant)
    pub bdm_div: [f64; 6],
}

impl CellGeometry {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `coords` -- the coordinates of the three vertices (counterclockwise)
    /// * `normals` -- the fixed (global) unit normal vectors of the three local edges
    pub fn new(coords: [[f64; 2]; 3], normals: &[[f64; 2]; 3]) -> Result<Self, StrError> {
        let [x0, x1, x2] = coords;
        let two_area = (x1[0] - x0[0]) * (x2[1] - x0[1]) - (x2[0] - x0[0]) * (x1[1] - x0[1]);
        if !(two_area > 0.0) {
            return Err("triangle must be counterclockwise with positive area");
        }
        let grad = [
            [(x1[1] - x2[1]) / two_area, (x2[0] - x1[0]) / two_area],
            [(x2[1] - x0[1]) / two_area, (x0[0] - x2[0]) / two_area],
            [(x0[1] - x1[1]) / two_area, (x1[0] - x0[0]) / two_area],
        ];
        let mut diameter: f64 = 0.0;
        let mut bdm_vec = [[0.0; 2]; 6];
        let mut bdm_vertex = [0; 6];
        let mut bdm_div = [0.0; 6];
        for k in 0..3 {
            let (i, j) = edge_vertices(k);
            let dx = coords[j][0] - coords[i][0];
            let dy = coords[j][1] - coords[i][1];
            diameter = f64::max(diameter, f64::sqrt(dx * dx + dy * dy));
            let n = &normals[k];
            for (a, (v, w)) in [(2 * k, (i, j)), (2 * k + 1, (j, i))] {
                let curl = [grad[w][1], -grad[w][0]];
                let c = curl[0] * n[0] + curl[1] * n[1];
                if f64::abs(c) < f64::EPSILON {
                    return Err("edge normal is inconsistent with the triangle");
                }
                bdm_vec[a] = [curl[0] / c, curl[1] / c];
                bdm_vertex[a] = v;
                bdm_div[a] = grad[v][0] * bdm_vec[a][0] + grad[v][1] * bdm_vec[a][1];
            }
        }
        Ok(CellGeometry {
            coords,
            area: two_area / 2.0,
            grad,
            diameter,
            bdm_vec,
            bdm_vertex,
            bdm_div,
        })
    }

    /// Calculates the real coordinates corresponding to barycentric coordinates
    pub fn x_at(&self, ll: &[f64; 3]) -> [f64; 2] {
        let mut x = [0.0; 2];
        for m in 0..3 {
            x[0] += ll[m] * self.coords[m][0];
            x[1] += ll[m] * self.coords[m][1];
        }
        x
    }

    /// Evaluates the BDM function `a` at barycentric coordinates
    #[inline]
    pub fn bdm_value(&self, a: usize, ll: &[f64; 3]) -> [f64; 2] {
        let l = ll[self.bdm_vertex[a]];
        [l * self.bdm_vec[a][0], l * self.bdm_vec[a][1]]
    }

    /// Evaluates all BDM functions at barycentric coordinates
    pub fn bdm_values(&self, ll: &[f64; 3]) -> [[f64; 2]; 6] {
        let mut phi = [[0.0; 2]; 6];
        for a in 0..6 {
            phi[a] = self.bdm_value(a, ll);
        }
        phi
    }

    /// Returns the length of a local edge
    pub fn edge_length(&self, k: usize) -> f64 {
        let (i, j) = edge_vertices(k);
        let dx = self.coords[j][0] - self.coords[i][0];
        let dy = self.coords[j][1] - self.coords[i][1];
        f64::sqrt(dx * dx + dy * dy)
    }

    /// Returns the outward unit normal of a local edge
    pub fn outward_normal(&self, k: usize) -> [f64; 2] {
        let (i, j) = edge_vertices(k);
        let dx = self.coords[j][0] - self.coords[i][0];
        let dy = self.coords[j][1] - self.coords[i][1];
        let l = f64::sqrt(dx * dx + dy * dy);
        [dy / l, -dx / l]
    }

    /// Returns the barycentric and real coordinates of a point along a local edge
    ///
    /// The coordinate ξ ∈ [0, 1] goes from the first to the second vertex of the edge.
    pub fn edge_point(&self, k: usize, xi: f64) -> ([f64; 3], [f64; 2]) {
        let (i, j) = edge_vertices(k);
        let mut ll = [0.0; 3];
        ll[i] = 1.0 - xi;
        ll[j] = xi;
        (ll, self.x_at(&ll))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
