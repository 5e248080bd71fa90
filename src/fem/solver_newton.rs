use super::{BcPrescribedArray, Boundaries, ControlConvergence, Elements, FemMesh, FemState, LinearSystem};
use crate::base::{BoundaryPolicy, Config, SimError};
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Holds the outcome of a converged time step
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct StepSummary {
    /// Index of the time step (1 to n)
    pub timestep: usize,

    /// Time at the end of the step
    pub t: f64,

    /// Number of Newton updates needed to converge
    pub iterations: usize,

    /// Final norm of the residual vector ‖R‖∞
    pub norm_rr: f64,
}

/// Implements the Newton-Raphson solver of the coupled nonlinear system of one time step
///
/// At each iteration, the linear system `J · mdu = R` is solved and the unknowns are updated
/// with `U ← U - mdu`. The previous-step values in the state are never modified.
pub struct SolverNewton<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Holds the prescribed normal velocities
    pub prescribed: BcPrescribedArray,

    /// Holds a collection of elements
    pub elements: Elements<'a>,

    /// Holds a collection of boundary facets
    pub boundaries: Boundaries<'a>,

    /// Holds variables to solve the global linear system
    pub linear_system: LinearSystem<'a>,

    /// Holds the convergence control
    pub control: ControlConvergence<'a>,
}

impl<'a> SolverNewton<'a> {
    /// Allocates a new instance
    pub fn new(fem: &'a FemMesh, config: &'a Config, policy: &BoundaryPolicy) -> Result<Self, SimError> {
        if let Some(msg) = config.validate() {
            return Err(SimError::Configuration(msg));
        }
        let prescribed = BcPrescribedArray::new(fem, policy);
        let elements = Elements::new(fem, config).map_err(|e| SimError::Configuration(e.to_string()))?;
        let boundaries =
            Boundaries::new(fem, config, policy).map_err(|e| SimError::Configuration(e.to_string()))?;
        let linear_system = LinearSystem::new(fem, config, &prescribed, &elements, &boundaries)
            .map_err(|e| SimError::Configuration(format!("cannot allocate the linear system: {}", e)))?;
        Ok(SolverNewton {
            config,
            prescribed,
            elements,
            boundaries,
            linear_system,
            control: ControlConvergence::new(config),
        })
    }

    /// Computes the global residual vector R (stored in the linear system)
    pub fn assemble_residual(&mut self, state: &FemState) -> Result<(), StrError> {
        self.elements.calc_residuals(state)?;
        self.boundaries.calc_residuals(state)?;
        let rr = &mut self.linear_system.rr;
        self.elements.assemble_residuals(rr, &self.prescribed.flags);
        self.boundaries.assemble_residuals(rr, &self.prescribed.flags);
        Ok(())
    }

    /// Computes the global Jacobian matrix J (stored in the linear system)
    pub fn assemble_jacobian(&mut self, state: &FemState) -> Result<(), StrError> {
        self.elements.calc_jacobians(state)?;
        self.boundaries.calc_jacobians(state)?;
        let kk = &mut self.linear_system.kk;
        self.elements.assemble_jacobians(kk, &self.prescribed.flags)?;
        self.boundaries.assemble_jacobians(kk, &self.prescribed.flags)?;
        for eq in &self.prescribed.equations {
            kk.put(*eq, *eq, 1.0)?;
        }
        Ok(())
    }

    /// Solves the nonlinear system of one time step
    ///
    /// The state must hold the new time `t`, the time increment `dt`, the previous-step values
    /// `uu_old`, and the initial guess `uu` (usually equal to `uu_old`).
    pub fn solve(&mut self, state: &mut FemState, timestep: usize) -> Result<StepSummary, SimError> {
        let n_max = self.config.n_max_iterations;
        self.prescribed.apply(&mut state.uu);
        self.control.reset();
        for iteration in 0..=n_max {
            // residual
            // (a residual that cannot be evaluated is treated like a NaN residual)
            if self.assemble_residual(state).is_err() {
                return Err(SimError::Nonconvergence {
                    timestep,
                    t: state.t,
                    iterations: iteration,
                    norm_rr: f64::NAN,
                });
            }

            // check convergence
            if self.control.analyze_rr(iteration, &self.linear_system.rr).is_err() {
                return Err(SimError::Nonconvergence {
                    timestep,
                    t: state.t,
                    iterations: iteration,
                    norm_rr: self.control.norm_rr(),
                });
            }
            self.control.print_iteration();
            if self.control.converged() {
                return Ok(StepSummary {
                    timestep,
                    t: state.t,
                    iterations: iteration,
                    norm_rr: self.control.norm_rr(),
                });
            }
            if iteration == n_max {
                break;
            }

            // Jacobian and linear solve
            self.assemble_jacobian(state)
                .and_then(|_| {
                    self.linear_system
                        .factorize_and_solve(self.config.verbose_lin_sys_solve)
                })
                .map_err(|e| SimError::SingularJacobian {
                    timestep,
                    t: state.t,
                    reason: e.to_string(),
                })?;
            self.control.analyze_mdu(&self.linear_system.mdu);

            // update U
            let mdu = &self.linear_system.mdu;
            for i in 0..mdu.dim() {
                state.uu[i] -= mdu[i];
            }
        }
        Err(SimError::Nonconvergence {
            timestep,
            t: state.t,
            iterations: n_max,
            norm_rr: self.control.norm_rr(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
