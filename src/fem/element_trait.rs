use super::FemState;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Defines the trait for local equations (interior cells and boundary facets)
///
/// The calculations must not change the element; thus the same state always yields the same results.
pub trait ElementTrait: Send + Sync {
    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize>;

    /// Calculates the residual vector
    fn calc_residual(&self, residual: &mut Vector, state: &FemState) -> Result<(), StrError>;

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&self, jacobian: &mut Matrix, state: &FemState) -> Result<(), StrError>;
}

/// Collects the local values of the current and previous unknowns
pub(crate) fn gather<const N: usize>(local_to_global: &[usize], state: &FemState) -> ([f64; N], [f64; N]) {
    let mut uu = [0.0; N];
    let mut uu_old = [0.0; N];
    for l in 0..N {
        uu[l] = state.uu[local_to_global[l]];
        uu_old[l] = state.uu_old[local_to_global[l]];
    }
    (uu, uu_old)
}

/// Copies a local array into a residual vector
pub(crate) fn store_vector<const N: usize>(residual: &mut Vector, r: &[f64; N]) {
    for i in 0..N {
        residual[i] = r[i];
    }
}

/// Copies a local array into a Jacobian matrix
pub(crate) fn store_matrix<const N: usize>(jacobian: &mut Matrix, kk: &[[f64; N]; N]) {
    for i in 0..N {
        for j in 0..N {
            jacobian.set(i, j, kk[i][j]);
        }
    }
}
