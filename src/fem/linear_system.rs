use super::{BcPrescribedArray, Boundaries, Elements, FemMesh};
use crate::base::{Config, LinSolKind};
use crate::StrError;
use russell_lab::{vec_norm, Norm, Vector};
use russell_sparse::{CooMatrix, Genie, LinSolver, Sym};

/// Holds variables to solve the global linear system
pub struct LinearSystem<'a> {
    /// Total number of global equations (total number of DOFs)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// **Notes:**
    ///
    /// 1. The global matrix is sparse with the number of nonzero values indicated by `nnz`
    /// 2. The local element matrices add only to parts of the global matrix yielding a banded matrix
    /// 3. The largest upper bound of nnz is the total number of entries in the global matrix (nrow × ncol).
    ///    However, the elements share DOFs; therefore, the exact nnz is (much) less than nrow × ncol
    /// 4. The number of entries in a local matrix is indicated by `ndof_local`; hence,
    ///    the total number of entries in a local matrix equals ndof_local × ndof_local.
    /// 5. The least upper bound (supremum) of nnz, indicated here by `nnz_sup`, is equal to the
    ///    sum of all the number of entries in the local matrices (interior and boundary) plus the
    ///    number of prescribed equations since we will put ones on the diagonal of the global matrix; thus
    ///    `nnz = n_prescribed + Σ (ndof_local × ndof_local) + Σ (ndof_local_boundary × ndof_local_boundary)`
    pub nnz_sup: usize,

    /// Holds the residual vector R
    pub rr: Vector,

    /// Holds the global Jacobian matrix K
    pub kk: CooMatrix,

    /// Holds the linear solver
    pub solver: LinSolver<'a>,

    /// Holds the "minus-delta-U" vector (the solution of the linear system)
    pub mdu: Vector,
}

impl<'a> LinearSystem<'a> {
    /// Allocates a new instance
    pub fn new(
        fem: &FemMesh,
        config: &Config,
        prescribed: &BcPrescribedArray,
        elements: &Elements,
        boundaries: &Boundaries,
    ) -> Result<Self, StrError> {
        let n_equation = fem.layout.n_equation;
        let mut nnz_sup = prescribed.equations.len();
        nnz_sup += elements.all.iter().fold(0, |acc, e| {
            let n = e.actual.local_to_global().len();
            acc + n * n
        });
        nnz_sup += boundaries.nnz();
        let genie = match config.lin_sol_kind {
            LinSolKind::Umfpack => Genie::Umfpack,
            LinSolKind::Mumps => Genie::Mumps,
        };
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            rr: Vector::new(n_equation),
            kk: CooMatrix::new(n_equation, n_equation, nnz_sup, Sym::No)?,
            solver: LinSolver::new(genie)?,
            mdu: Vector::new(n_equation),
        })
    }

    /// Factorizes K and solves K · mdu = R
    ///
    /// Returns an error if the factorization fails or if mdu contains NaN or Inf entries.
    pub fn factorize_and_solve(&mut self, verbose: bool) -> Result<(), StrError> {
        self.solver.actual.factorize(&self.kk, None)?;
        self.solver.actual.solve(&mut self.mdu, &self.rr, verbose)?;
        if !vec_norm(&self.mdu, Norm::Max).is_finite() {
            return Err("found NaN or Inf in the Newton update");
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LinearSystem;
    use crate::base::{BoundaryPolicy, Config, SampleMeshes};
    use crate::fem::{BcPrescribedArray, Boundaries, Elements, FemMesh};

    #[test]
    fn new_works() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let policy = BoundaryPolicy::reference();
        let prescribed = BcPrescribedArray::new(&fem, &policy);
        let elements = Elements::new(&fem, &config).unwrap();
        let boundaries = Boundaries::new(&fem, &config, &policy).unwrap();
        let lin_sys = LinearSystem::new(&fem, &config, &prescribed, &elements, &boundaries).unwrap();
        let n_element = 2;
        let n_equation_local = 10;
        let n_inflow_facets = 1;
        assert_eq!(lin_sys.n_equation, 16);
        assert_eq!(
            lin_sys.nnz_sup,
            (n_element + n_inflow_facets) * n_equation_local * n_equation_local
        );
    }

    #[test]
    fn factorize_and_solve_works() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let policy = BoundaryPolicy::reference();
        let prescribed = BcPrescribedArray::new(&fem, &policy);
        let elements = Elements::new(&fem, &config).unwrap();
        let boundaries = Boundaries::new(&fem, &config, &policy).unwrap();
        let mut lin_sys = LinearSystem::new(&fem, &config, &prescribed, &elements, &boundaries).unwrap();

        // diagonal system
        lin_sys.kk.reset();
        for i in 0..lin_sys.n_equation {
            lin_sys.kk.put(i, i, 2.0).unwrap();
            lin_sys.rr[i] = i as f64;
        }
        lin_sys.factorize_and_solve(false).unwrap();
        for i in 0..lin_sys.n_equation {
            assert_eq!(lin_sys.mdu[i], (i as f64) / 2.0);
        }

        // singular system (the last row and column are empty)
        let mut lin_sys = LinearSystem::new(&fem, &config, &prescribed, &elements, &boundaries).unwrap();
        lin_sys.kk.reset();
        for i in 0..(lin_sys.n_equation - 1) {
            lin_sys.kk.put(i, i, 2.0).unwrap();
        }
        assert!(lin_sys.factorize_and_solve(false).is_err());
    }
}
