use super::{gather, store_matrix, store_vector, CellGeometry, ElementTrait, FemMesh, FemState};
use super::{LOCAL_P, LOCAL_S, N_LOCAL_EQ, N_LOCAL_U, TRI_IPS};
use crate::base::{Config, Mobility, Stabilization};
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Velocities smaller than this value do not define a streamline direction
const TINY_VELOCITY: f64 = 1e-14;

/// Implements the local equations of the two-phase flow problem over a triangle
///
/// # Local equations
///
/// With the test functions `(φ, q, r)` (BDM₁, DG₀, CG₁) and the mid-step saturation
/// `s_mid = (s_prev + s) / 2`:
///
/// ```text
/// Darcy:       Rᵘ = ∫ φ · λ⁻¹(s_mid) K⁻¹ u dΩ - ∫ div(φ) p dΩ
/// continuity:  Rᵖ = ∫ q div(u) dΩ
/// transport:   Rˢ = ∫ r (s - s_prev) dΩ - Δt ∫ ∇r · F(s_mid) u dΩ + Δt ∫ stab(r, s_mid) dΩ
/// ```
///
/// The stabilization term is either `ε ∇r·∇s_mid` (diffusive) or `τ (u₀·∇r)(u₀·∇s_mid)`
/// (streamline-upwind) with `u₀` the velocity of the previous step and `τ = h / (2 |u₀|)`.
///
/// # Local numbering
///
/// ```text
///  0..6  BDM₁ velocity coefficients (two per local edge)
///  6     pressure
///  7..10 saturation at the vertices
/// ```
pub struct ElementTwoPhase<'a> {
    /// Global configuration
    config: &'a Config,

    /// Constitutive model
    mobility: Mobility,

    /// Geometry and BDM₁ basis of the cell
    geo: &'a CellGeometry,

    /// Local-to-global mapping
    local_to_global: Vec<usize>,
}

/// Holds the values at an integration point
struct IpValues {
    /// Weight times area
    w: f64,

    /// Barycentric coordinates (CG₁ shape functions)
    ll: [f64; 3],

    /// BDM₁ functions
    phi: [[f64; 2]; 6],

    /// Inverse of the permeability tensor
    kinv: [[f64; 2]; 2],

    /// Current velocity
    u: [f64; 2],

    /// Velocity of the previous step
    u_old: [f64; 2],

    /// Current saturation
    s: f64,

    /// Saturation of the previous step
    s_old: f64,
}

impl<'a> ElementTwoPhase<'a> {
    /// Allocates a new instance
    pub fn new(fem: &'a FemMesh, config: &'a Config, cell_id: usize) -> Result<Self, StrError> {
        if cell_id >= fem.geometry.len() {
            return Err("cell id is out-of-bounds");
        }
        let mobility = Mobility::new(config.mu_rel).map_err(|_| "mu_rel must be > 0.0")?;
        Ok(ElementTwoPhase {
            config,
            mobility,
            geo: &fem.geometry[cell_id],
            local_to_global: fem.local_to_global[cell_id].clone(),
        })
    }

    /// Evaluates the fields at an integration point
    fn ip_values(&self, ip: &[f64; 4], uu: &[f64; N_LOCAL_EQ], uu_old: &[f64; N_LOCAL_EQ]) -> IpValues {
        let ll = [ip[0], ip[1], ip[2]];
        let phi = self.geo.bdm_values(&ll);
        let x = self.geo.x_at(&ll);
        let mut u = [0.0; 2];
        let mut u_old = [0.0; 2];
        for a in 0..N_LOCAL_U {
            for d in 0..2 {
                u[d] += uu[a] * phi[a][d];
                u_old[d] += uu_old[a] * phi[a][d];
            }
        }
        let mut s = 0.0;
        let mut s_old = 0.0;
        for m in 0..3 {
            s += ll[m] * uu[LOCAL_S + m];
            s_old += ll[m] * uu_old[LOCAL_S + m];
        }
        IpValues {
            w: ip[3] * self.geo.area,
            ll,
            phi,
            kinv: self.config.permeability.inverse(&x),
            u,
            u_old,
            s,
            s_old,
        }
    }

    /// Returns the gradient of the mid-step saturation (constant over the cell)
    fn grad_s_mid(&self, uu: &[f64; N_LOCAL_EQ], uu_old: &[f64; N_LOCAL_EQ]) -> [f64; 2] {
        let mut g = [0.0; 2];
        for m in 0..3 {
            let s_mid = 0.5 * (uu[LOCAL_S + m] + uu_old[LOCAL_S + m]);
            g[0] += s_mid * self.geo.grad[m][0];
            g[1] += s_mid * self.geo.grad[m][1];
        }
        g
    }

    /// Returns the streamline-upwind parameter τ for the previous-step velocity
    fn tau(&self, u_old: &[f64; 2]) -> Option<f64> {
        let norm = f64::sqrt(dot(u_old, u_old));
        if norm < TINY_VELOCITY {
            None
        } else {
            Some(self.geo.diameter / (2.0 * norm))
        }
    }
}

impl<'a> ElementTrait for ElementTwoPhase<'a> {
    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.local_to_global
    }

    /// Calculates the residual vector
    fn calc_residual(&self, residual: &mut Vector, state: &FemState) -> Result<(), StrError> {
        let (uu, uu_old) = gather::<N_LOCAL_EQ>(&self.local_to_global, state);
        let dt = state.dt;
        let p = uu[LOCAL_P];
        let div_u: f64 = (0..N_LOCAL_U).map(|a| uu[a] * self.geo.bdm_div[a]).sum();
        let grad_s_mid = self.grad_s_mid(&uu, &uu_old);
        let grad = &self.geo.grad;
        let mut r = [0.0; N_LOCAL_EQ];
        for ip in &TRI_IPS {
            let v = self.ip_values(ip, &uu, &uu_old);
            let s_mid = 0.5 * (v.s + v.s_old);
            let lam_inv = self.mobility.total_mobility_inverse(s_mid);
            let ff = self.mobility.fractional_flow(s_mid);
            let ku = mat_vec(&v.kinv, &v.u);

            // Darcy
            for a in 0..N_LOCAL_U {
                r[a] += v.w * (lam_inv * dot(&v.phi[a], &ku) - self.geo.bdm_div[a] * p);
            }

            // continuity
            r[LOCAL_P] += v.w * div_u;

            // transport
            for m in 0..3 {
                r[LOCAL_S + m] += v.w * (v.ll[m] * (v.s - v.s_old) - dt * ff * dot(&grad[m], &v.u));
            }

            // stabilization
            match self.config.stabilization {
                Stabilization::Diffusive { epsilon } => {
                    for m in 0..3 {
                        r[LOCAL_S + m] += v.w * epsilon * dt * dot(&grad[m], &grad_s_mid);
                    }
                }
                Stabilization::StreamlineUpwind => {
                    if let Some(tau) = self.tau(&v.u_old) {
                        let c = dot(&v.u_old, &grad_s_mid);
                        for m in 0..3 {
                            r[LOCAL_S + m] += v.w * dt * tau * dot(&v.u_old, &grad[m]) * c;
                        }
                    }
                }
            }
        }
        store_vector(residual, &r);
        Ok(())
    }

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&self, jacobian: &mut Matrix, state: &FemState) -> Result<(), StrError> {
        let (uu, uu_old) = gather::<N_LOCAL_EQ>(&self.local_to_global, state);
        let dt = state.dt;
        let grad = &self.geo.grad;
        let div = &self.geo.bdm_div;
        let mut kk = [[0.0; N_LOCAL_EQ]; N_LOCAL_EQ];
        for ip in &TRI_IPS {
            let v = self.ip_values(ip, &uu, &uu_old);
            let w = v.w;
            let s_mid = 0.5 * (v.s + v.s_old);
            let lam_inv = self.mobility.total_mobility_inverse(s_mid);
            let d_lam_inv = self.mobility.total_mobility_inverse_deriv(s_mid);
            let ff = self.mobility.fractional_flow(s_mid);
            let d_ff = self.mobility.fractional_flow_deriv(s_mid);
            let ku = mat_vec(&v.kinv, &v.u);

            for a in 0..N_LOCAL_U {
                // ∂Rᵘ/∂u
                for b in 0..N_LOCAL_U {
                    kk[a][b] += w * lam_inv * dot(&v.phi[a], &mat_vec(&v.kinv, &v.phi[b]));
                }
                // ∂Rᵘ/∂p
                kk[a][LOCAL_P] -= w * div[a];
                // ∂Rᵘ/∂s
                for n in 0..3 {
                    kk[a][LOCAL_S + n] += w * d_lam_inv * 0.5 * v.ll[n] * dot(&v.phi[a], &ku);
                }
                // ∂Rᵖ/∂u
                kk[LOCAL_P][a] += w * div[a];
            }

            for m in 0..3 {
                // ∂Rˢ/∂u
                for b in 0..N_LOCAL_U {
                    kk[LOCAL_S + m][b] -= w * dt * ff * dot(&grad[m], &v.phi[b]);
                }
                // ∂Rˢ/∂s
                for n in 0..3 {
                    kk[LOCAL_S + m][LOCAL_S + n] +=
                        w * (v.ll[m] * v.ll[n] - dt * d_ff * 0.5 * v.ll[n] * dot(&grad[m], &v.u));
                }
            }

            // stabilization
            match self.config.stabilization {
                Stabilization::Diffusive { epsilon } => {
                    for m in 0..3 {
                        for n in 0..3 {
                            kk[LOCAL_S + m][LOCAL_S + n] += w * epsilon * dt * 0.5 * dot(&grad[m], &grad[n]);
                        }
                    }
                }
                Stabilization::StreamlineUpwind => {
                    if let Some(tau) = self.tau(&v.u_old) {
                        for m in 0..3 {
                            for n in 0..3 {
                                kk[LOCAL_S + m][LOCAL_S + n] +=
                                    w * dt * tau * dot(&v.u_old, &grad[m]) * 0.5 * dot(&v.u_old, &grad[n]);
                            }
                        }
                    }
                }
            }
        }
        store_matrix(jacobian, &kk);
        Ok(())
    }
}

/// Computes the dot product of two 2D vectors
#[inline]
pub(crate) fn dot(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Computes the product of a 2×2 matrix and a 2D vector
#[inline]
fn mat_vec(m: &[[f64; 2]; 2], v: &[f64; 2]) -> [f64; 2] {
    [m[0][0] * v[0] + m[0][1] * v[1], m[1][0] * v[0] + m[1][1] * v[1]]
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
