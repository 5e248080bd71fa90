use super::{dot, gather, store_matrix, store_vector, BoundaryFacet, CellGeometry, ElementTrait, FemMesh, FemState};
use super::{EDGE_IPS, LOCAL_S, N_LOCAL_EQ, N_LOCAL_U};
use crate::base::{Bc, BcKind, BoundaryPolicy, Config, InflowMode, Mobility};
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Implements the boundary terms of the two-phase flow problem over a boundary facet
///
/// The terms are:
///
/// ```text
/// Darcy:      Rᵘₐ += ∫ φₐ·n p̄ dΓ                       (where a pressure is prescribed)
/// transport:  Rˢₘ += Δt ∫ rₘ F(s_b) u·n dΓ
/// ```
///
/// where `s_b` is the boundary saturation selected by the inflow mode:
///
/// * `Marked` -- `s_b = s̄` on facets with a prescribed saturation; no term otherwise
/// * `Upwind` -- for `u₀·n ≤ 0` (inflow, u₀ is the velocity of the previous step) `s_b = s̄` where
///   a saturation is prescribed (no term otherwise); for `u₀·n > 0` (outflow) `s_b = s_mid`
///
/// The local numbering is the same as the one of the owning cell.
pub struct BoundaryTwoPhase<'a> {
    /// Global configuration
    config: &'a Config,

    /// Constitutive model
    mobility: Mobility,

    /// Geometry and BDM₁ basis of the owning cell
    geo: &'a CellGeometry,

    /// Local edge of the owning cell
    local_edge: usize,

    /// Prescribed pressure, if any
    pressure: Option<Bc>,

    /// Prescribed inflow saturation, if any
    saturation: Option<Bc>,

    /// Local-to-global mapping (of the owning cell)
    local_to_global: Vec<usize>,
}

impl<'a> BoundaryTwoPhase<'a> {
    /// Allocates a new instance
    pub fn new(
        fem: &'a FemMesh,
        config: &'a Config,
        policy: &BoundaryPolicy,
        facet: &BoundaryFacet,
    ) -> Result<Self, StrError> {
        let mobility = Mobility::new(config.mu_rel).map_err(|_| "mu_rel must be > 0.0")?;
        Ok(BoundaryTwoPhase {
            config,
            mobility,
            geo: &fem.geometry[facet.cell],
            local_edge: facet.local_edge,
            pressure: policy.get(facet.segment, BcKind::Pressure).copied(),
            saturation: policy.get(facet.segment, BcKind::Saturation).copied(),
            local_to_global: fem.local_to_global[facet.cell].clone(),
        })
    }

    /// Returns whether this facet contributes to the residual vector
    pub fn has_terms(&self) -> bool {
        self.pressure.is_some() || self.with_jacobian()
    }

    /// Returns whether this facet contributes to the Jacobian matrix
    pub fn with_jacobian(&self) -> bool {
        match self.config.inflow {
            InflowMode::Marked => self.saturation.is_some(),
            InflowMode::Upwind => true,
        }
    }

    /// Returns the fractional flow at the boundary and its derivative w.r.t s_mid (zero if s̄ is used)
    ///
    /// Returns None if there is no transport term at this point.
    fn boundary_fractional_flow(&self, x: &[f64; 2], un_old: f64, s_mid: f64) -> Option<(f64, f64)> {
        let inflow = match self.config.inflow {
            InflowMode::Marked => true,
            InflowMode::Upwind => un_old <= 0.0,
        };
        if inflow {
            self.saturation
                .as_ref()
                .map(|bc| (self.mobility.fractional_flow(bc.value(x)), 0.0))
        } else {
            Some((
                self.mobility.fractional_flow(s_mid),
                self.mobility.fractional_flow_deriv(s_mid),
            ))
        }
    }
}

impl<'a> ElementTrait for BoundaryTwoPhase<'a> {
    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.local_to_global
    }

    /// Calculates the residual vector
    fn calc_residual(&self, residual: &mut Vector, state: &FemState) -> Result<(), StrError> {
        let (uu, uu_old) = gather::<N_LOCAL_EQ>(&self.local_to_global, state);
        let k = self.local_edge;
        let n = self.geo.outward_normal(k);
        let length = self.geo.edge_length(k);
        let mut r = [0.0; N_LOCAL_EQ];
        for ip in &EDGE_IPS {
            let w = ip[1] * length;
            let (ll, x) = self.geo.edge_point(k, ip[0]);
            let phi = self.geo.bdm_values(&ll);
            let mut un = 0.0;
            let mut un_old = 0.0;
            for a in 0..N_LOCAL_U {
                let phi_n = dot(&phi[a], &n);
                un += uu[a] * phi_n;
                un_old += uu_old[a] * phi_n;
            }
            if let Some(bc) = &self.pressure {
                let p_bar = bc.value(&x);
                for a in 0..N_LOCAL_U {
                    r[a] += w * p_bar * dot(&phi[a], &n);
                }
            }
            let s_mid: f64 = (0..3).map(|m| ll[m] * 0.5 * (uu[LOCAL_S + m] + uu_old[LOCAL_S + m])).sum();
            if let Some((ff, _)) = self.boundary_fractional_flow(&x, un_old, s_mid) {
                for m in 0..3 {
                    r[LOCAL_S + m] += state.dt * w * ll[m] * ff * un;
                }
            }
        }
        store_vector(residual, &r);
        Ok(())
    }

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&self, jacobian: &mut Matrix, state: &FemState) -> Result<(), StrError> {
        let (uu, uu_old) = gather::<N_LOCAL_EQ>(&self.local_to_global, state);
        let k = self.local_edge;
        let n = self.geo.outward_normal(k);
        let length = self.geo.edge_length(k);
        let mut kk = [[0.0; N_LOCAL_EQ]; N_LOCAL_EQ];
        for ip in &EDGE_IPS {
            let w = ip[1] * length;
            let (ll, x) = self.geo.edge_point(k, ip[0]);
            let phi = self.geo.bdm_values(&ll);
            let mut phi_n = [0.0; N_LOCAL_U];
            let mut un = 0.0;
            let mut un_old = 0.0;
            for a in 0..N_LOCAL_U {
                phi_n[a] = dot(&phi[a], &n);
                un += uu[a] * phi_n[a];
                un_old += uu_old[a] * phi_n[a];
            }
            let s_mid: f64 = (0..3).map(|m| ll[m] * 0.5 * (uu[LOCAL_S + m] + uu_old[LOCAL_S + m])).sum();
            if let Some((ff, d_ff)) = self.boundary_fractional_flow(&x, un_old, s_mid) {
                for m in 0..3 {
                    for b in 0..N_LOCAL_U {
                        kk[LOCAL_S + m][b] += state.dt * w * ll[m] * ff * phi_n[b];
                    }
                    for j in 0..3 {
                        kk[LOCAL_S + m][LOCAL_S + j] += state.dt * w * ll[m] * d_ff * 0.5 * ll[j] * un;
                    }
                }
            }
        }
        store_matrix(jacobian, &kk);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
