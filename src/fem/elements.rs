use super::{assemble_matrix, assemble_vector, ElementTrait, ElementTwoPhase, FemMesh, FemState};
use crate::base::Config;
use crate::StrError;
use rayon::prelude::*;
use russell_lab::{deriv1_central5, Matrix, Vector};
use russell_sparse::CooMatrix;

/// Defines a generic element, wrapping an "actual" implementation
pub struct GenericElement<'a> {
    /// Connects to the "actual" implementation of local equations
    pub actual: Box<dyn ElementTrait + 'a>,

    /// Implements the residual vector
    pub residual: Vector,

    /// Implements the Jacobian matrix
    pub jacobian: Matrix,
}

/// Holds a collection of (generic) finite elements
pub struct Elements<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// All elements
    pub all: Vec<GenericElement<'a>>,
}

/// Holds auxiliary arguments for the computation of numerical Jacobian matrices
struct ArgsForNumericalJacobian<'a> {
    /// Holds the residual vector
    pub residual: &'a mut Vector,

    /// Holds the current state
    pub state: &'a mut FemState,
}

impl<'a> GenericElement<'a> {
    /// Allocates a new instance
    pub fn new(actual: Box<dyn ElementTrait + 'a>) -> Self {
        let neq = actual.local_to_global().len();
        GenericElement {
            actual,
            residual: Vector::new(neq),
            jacobian: Matrix::new(neq, neq),
        }
    }

    /// Calculates the residual vector
    pub fn calc_residual(&mut self, state: &FemState) -> Result<(), StrError> {
        self.actual.calc_residual(&mut self.residual, state)
    }

    /// Calculates the Jacobian matrix
    pub fn calc_jacobian(&mut self, state: &FemState) -> Result<(), StrError> {
        self.actual.calc_jacobian(&mut self.jacobian, state)
    }

    /// Calculates the Jacobian matrix using finite differences
    ///
    /// **Note:** The state may be changed temporarily, but it is restored at the end of the function
    pub fn numerical_jacobian(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let neq = self.residual.dim();
        let local_to_global = self.actual.local_to_global().clone();
        let mut args = ArgsForNumericalJacobian {
            residual: &mut self.residual,
            state,
        };
        for i in 0..neq {
            for j in 0..neq {
                let eq = local_to_global[j];
                let at_u = args.state.uu[eq];
                let res = deriv1_central5(at_u, &mut args, |u, a| {
                    let original_uu = a.state.uu[eq];
                    a.state.uu[eq] = u;
                    let status = self.actual.calc_residual(a.residual, a.state);
                    a.state.uu[eq] = original_uu;
                    status?;
                    Ok(a.residual[i])
                })?;
                self.jacobian.set(i, j, res);
            }
        }
        Ok(())
    }
}

impl<'a> Elements<'a> {
    /// Allocates a new instance with one element per cell
    pub fn new(fem: &'a FemMesh, config: &'a Config) -> Result<Self, StrError> {
        let mut all = Vec::with_capacity(fem.geometry.len());
        for cell_id in 0..fem.geometry.len() {
            all.push(GenericElement::new(Box::new(ElementTwoPhase::new(fem, config, cell_id)?)));
        }
        Ok(Elements { config, all })
    }

    /// Computes the residual vectors
    pub fn calc_residuals(&mut self, state: &FemState) -> Result<(), StrError> {
        calc_all(&mut self.all, state, self.config.parallel_assembly, false)
    }

    /// Computes the Jacobian matrices
    pub fn calc_jacobians(&mut self, state: &FemState) -> Result<(), StrError> {
        calc_all(&mut self.all, state, self.config.parallel_assembly, true)
    }

    /// Assembles residual vectors
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc residuals first
    /// 2. The global vector R will be cleared (with zeros) at the beginning
    ///
    /// **Important:** You must call the Boundaries assemble_residuals after Elements
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        rr.fill(0.0); // << important
        self.all
            .iter()
            .for_each(|e| assemble_vector(rr, &e.residual, e.actual.local_to_global(), prescribed));
    }

    /// Assembles Jacobian matrices
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc jacobians first
    /// 2. The CooMatrix position in the global matrix K will be reset at the beginning
    ///
    /// **Important:** You must call the Boundaries assemble_jacobians after Elements
    pub fn assemble_jacobians(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        kk.reset(); // << important
        for e in &self.all {
            assemble_matrix(kk, &e.jacobian, e.actual.local_to_global(), prescribed)?;
        }
        Ok(())
    }
}

/// Computes the local residual vectors or Jacobian matrices of a collection of elements
///
/// The local results are independent of each other; thus the order of computation does not
/// affect the values. The scatter into the global arrays happens later, in element order.
pub(crate) fn calc_all(
    all: &mut [GenericElement],
    state: &FemState,
    parallel: bool,
    jacobian: bool,
) -> Result<(), StrError> {
    let calc = |e: &mut GenericElement| {
        if jacobian {
            e.calc_jacobian(state)
        } else {
            e.calc_residual(state)
        }
    };
    if parallel {
        all.par_iter_mut().map(calc).collect()
    } else {
        all.iter_mut().map(calc).collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Elements;
    use crate::base::{Config, SampleMeshes};
    use crate::fem::{FemMesh, FemState};
    use russell_lab::Vector;
    use russell_sparse::{CooMatrix, Sym};

    #[test]
    fn new_works() {
        let mesh = SampleMeshes::unit_square(2, 2);
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let elements = Elements::new(&fem, &config).unwrap();
        assert_eq!(elements.all.len(), 8);
        assert_eq!(elements.all[0].residual.dim(), 10);
        assert_eq!(elements.all[0].jacobian.dims(), (10, 10));
    }

    #[test]
    fn serial_and_parallel_calculations_are_identical() {
        let mesh = SampleMeshes::unit_square(3, 3);
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut state = FemState::new(&fem);
        state.dt = 0.01;
        for i in 0..state.uu.dim() {
            state.uu[i] = 0.5 + 0.25 * f64::sin(i as f64);
            state.uu_old[i] = 0.5 + 0.25 * f64::cos(i as f64);
        }
        let neq = fem.layout.n_equation;
        let prescribed = vec![false; neq];
        let nnz = 8 * 3 * 3 * 100;

        let mut serial = Elements::new(&fem, &config).unwrap();
        serial.calc_residuals(&state).unwrap();
        serial.calc_jacobians(&state).unwrap();
        let mut rr_serial = Vector::new(neq);
        serial.assemble_residuals(&mut rr_serial, &prescribed);
        let mut kk_serial = CooMatrix::new(neq, neq, nnz, Sym::No).unwrap();
        serial.assemble_jacobians(&mut kk_serial, &prescribed).unwrap();

        let mut config_parallel = Config::new();
        config_parallel.set_parallel_assembly(true);
        let mut parallel = Elements::new(&fem, &config_parallel).unwrap();
        parallel.calc_residuals(&state).unwrap();
        parallel.calc_jacobians(&state).unwrap();
        let mut rr_parallel = Vector::new(neq);
        parallel.assemble_residuals(&mut rr_parallel, &prescribed);
        let mut kk_parallel = CooMatrix::new(neq, neq, nnz, Sym::No).unwrap();
        parallel.assemble_jacobians(&mut kk_parallel, &prescribed).unwrap();

        assert_eq!(rr_serial.as_data(), rr_parallel.as_data());
        assert_eq!(kk_serial.as_dense().as_data(), kk_parallel.as_dense().as_data());
    }
}
