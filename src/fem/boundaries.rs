use super::{assemble_matrix, assemble_vector, calc_all, BoundaryTwoPhase, FemMesh, FemState, GenericElement};
use crate::base::{BoundaryPolicy, Config};
use crate::StrError;
use russell_lab::Vector;
use russell_sparse::CooMatrix;

/// Holds a collection of boundary facets with natural (weak) terms
pub struct Boundaries<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// All facets contributing to the residual vector
    pub all: Vec<GenericElement<'a>>,

    /// Indicates which facets contribute to the Jacobian matrix
    pub with_jacobian: Vec<bool>,
}

impl<'a> Boundaries<'a> {
    /// Allocates a new instance
    ///
    /// Facets on segments without pressure and saturation conditions are skipped.
    pub fn new(fem: &'a FemMesh, config: &'a Config, policy: &BoundaryPolicy) -> Result<Self, StrError> {
        let mut all = Vec::new();
        let mut with_jacobian = Vec::new();
        for facet in &fem.boundary {
            let bry = BoundaryTwoPhase::new(fem, config, policy, facet)?;
            if !bry.has_terms() {
                continue;
            }
            with_jacobian.push(bry.with_jacobian());
            all.push(GenericElement::new(Box::new(bry)));
        }
        Ok(Boundaries {
            config,
            all,
            with_jacobian,
        })
    }

    /// Returns the number of entries added to the global Jacobian matrix
    pub fn nnz(&self) -> usize {
        self.all
            .iter()
            .zip(&self.with_jacobian)
            .filter(|(_, j)| **j)
            .map(|(e, _)| e.actual.local_to_global().len() * e.actual.local_to_global().len())
            .sum()
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
    /// **Important:** You must call this function after Elements assemble_residuals
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        self.all
            .iter()
            .for_each(|e| assemble_vector(rr, &e.residual, e.actual.local_to_global(), prescribed));
    }

    /// Assembles Jacobian matrices
    ///
    /// **Important:** You must call this function after Elements assemble_jacobians
    pub fn assemble_jacobians(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        for (e, with_jacobian) in self.all.iter().zip(&self.with_jacobian) {
            if *with_jacobian {
                assemble_matrix(kk, &e.jacobian, e.actual.local_to_global(), prescribed)?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Boundaries;
    use crate::base::{Bc, BoundaryPolicy, Config, InflowMode, SampleMeshes, Segment};
    use crate::fem::FemMesh;

    #[test]
    fn new_works() {
        let mesh = SampleMeshes::unit_square(2, 2);
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();

        // pressure everywhere and saturation on the left
        let policy = BoundaryPolicy::reference();
        let boundaries = Boundaries::new(&fem, &config, &policy).unwrap();
        assert_eq!(boundaries.all.len(), 8);
        assert_eq!(boundaries.with_jacobian, &[true, true, false, false, false, false, false, false]);
        assert_eq!(boundaries.nnz(), 2 * 100);

        // nothing on top and bottom
        let mut policy = BoundaryPolicy::new();
        policy
            .on(Segment::Left, Bc::Pressure(|_| 1.0))
            .on(Segment::Right, Bc::Pressure(|_| 0.0));
        let boundaries = Boundaries::new(&fem, &config, &policy).unwrap();
        assert_eq!(boundaries.all.len(), 4);
        assert_eq!(boundaries.nnz(), 0);

        // upwind inflow requires the Jacobian everywhere
        let mut config = Config::new();
        config.set_inflow(InflowMode::Upwind);
        let boundaries = Boundaries::new(&fem, &config, &policy).unwrap();
        assert_eq!(boundaries.all.len(), 8);
        assert_eq!(boundaries.nnz(), 8 * 100);
    }
}
