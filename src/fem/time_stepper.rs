use super::{FemMesh, FemState, FieldExporter, Snapshot, SolverNewton, StepSummary};
use crate::base::{BoundaryPolicy, Config, SimError};
use russell_lab::vec_copy;

/// Defines the status of the time stepper
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepperStatus {
    /// Waiting for the next time step (initial status)
    Idle,

    /// Running the Newton iterations of a time step
    Stepping,

    /// All time steps have converged (terminal)
    Completed,

    /// A time step has failed (terminal)
    Failed,
}

/// Advances the coupled state over fixed time increments
///
/// The number of steps is `n = ⌈T/Δt⌉` and the time at step `k` (1 to n) is `t = k·Δt`.
/// The converged state of a step becomes the previous-step state of the next one.
pub struct TimeStepper<'a> {
    /// Holds the FEM mesh
    fem: &'a FemMesh<'a>,

    /// Holds configuration parameters
    config: &'a Config,

    /// Holds the nonlinear solver
    pub solver: SolverNewton<'a>,

    /// Holds the status
    status: StepperStatus,

    /// Holds the summary of each converged time step
    pub summaries: Vec<StepSummary>,
}

impl<'a> TimeStepper<'a> {
    /// Allocates a new instance
    pub fn new(fem: &'a FemMesh<'a>, config: &'a Config, policy: &BoundaryPolicy) -> Result<Self, SimError> {
        let solver = SolverNewton::new(fem, config, policy)?;
        Ok(TimeStepper {
            fem,
            config,
            solver,
            status: StepperStatus::Idle,
            summaries: Vec::new(),
        })
    }

    /// Returns the status
    pub fn status(&self) -> StepperStatus {
        self.status
    }

    /// Runs all time steps
    ///
    /// The state must hold the initial condition (see `FemState::new`). The exporter receives the
    /// fields of each converged time step and its `finish` is called after the last step.
    ///
    /// On error, the status becomes `Failed` and the snapshots already exported remain valid.
    pub fn run(&mut self, state: &mut FemState, exporter: &mut dyn FieldExporter) -> Result<(), SimError> {
        if self.status != StepperStatus::Idle {
            return Err(SimError::Configuration(
                "the time stepper can only run once".to_string(),
            ));
        }
        let n_equation = self.fem.layout.n_equation;
        if state.uu.dim() != n_equation || state.uu_old.dim() != n_equation {
            return Err(SimError::Configuration(format!(
                "the state must have {} equations",
                n_equation
            )));
        }
        match self.steps(state, exporter) {
            Ok(_) => {
                self.status = StepperStatus::Completed;
                Ok(())
            }
            Err(e) => {
                self.status = StepperStatus::Failed;
                Err(e)
            }
        }
    }

    /// Runs the time loop
    fn steps(&mut self, state: &mut FemState, exporter: &mut dyn FieldExporter) -> Result<(), SimError> {
        let dt = self.config.dt;
        let n_time_steps = self.config.n_time_steps();
        self.solver.control.print_header();
        for timestep in 1..=n_time_steps {
            // update time
            state.t = (timestep as f64) * dt;
            state.dt = dt;
            self.solver.control.print_timestep(timestep, state.t, state.dt);

            // solve the nonlinear system; the initial guess is the previous state
            self.status = StepperStatus::Stepping;
            let summary = self.solver.solve(state, timestep)?;
            self.summaries.push(summary);

            // accept the converged state
            vec_copy(&mut state.uu_old, &state.uu).map_err(|e| SimError::Configuration(e.to_string()))?;
            self.status = StepperStatus::Idle;

            // output
            exporter.export(Snapshot::new(self.fem, state, timestep))?;
        }
        exporter.finish()?;
        self.solver.control.print_footer();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{StepperStatus, TimeStepper};
    use crate::base::{Bc, BoundaryPolicy, Config, SampleMeshes, Segment, SimError};
    use crate::fem::{FemMesh, FemState, FieldExporter, PostProc, Snapshot, SnapshotRecorder};

    struct FailingExporter {
        count: usize,
    }

    impl FieldExporter for FailingExporter {
        fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
            self.count += 1;
            if self.count == 2 {
                return Err(SimError::Export {
                    timestep: snapshot.index,
                    reason: "disk is full".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn new_captures_errors() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut config = Config::new();
        config.set_mu_rel(0.0);
        let policy = BoundaryPolicy::reference();
        assert_eq!(
            TimeStepper::new(&fem, &config, &policy).err(),
            Some(SimError::Configuration(
                "mu_rel = 0.0 is incorrect; it must be > 0.0".to_string()
            ))
        );
    }

    #[test]
    fn run_works() {
        let mesh = SampleMeshes::unit_square(4, 4);
        let mut config = Config::new();
        config.set_dt(0.01).set_t_fin(0.05);
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let policy = BoundaryPolicy::reference();
        let mut stepper = TimeStepper::new(&fem, &config, &policy).unwrap();
        assert_eq!(stepper.status(), StepperStatus::Idle);
        let mut state = FemState::new(&fem);
        let mut recorder = SnapshotRecorder::new();
        stepper.run(&mut state, &mut recorder).unwrap();
        assert_eq!(stepper.status(), StepperStatus::Completed);

        // steps and times
        assert_eq!(stepper.summaries.len(), 5);
        assert_eq!(recorder.all.len(), 5);
        assert!(recorder.finished);
        for (k, (summary, snapshot)) in stepper.summaries.iter().zip(&recorder.all).enumerate() {
            assert_eq!(summary.timestep, k + 1);
            assert_eq!(snapshot.index, k + 1);
            assert_eq!(summary.t, ((k + 1) as f64) * 0.01);
            assert_eq!(snapshot.t, summary.t);
        }
        assert_eq!(state.t, 5.0 * 0.01);

        // the previous state equals the converged one
        assert_eq!(state.uu.as_data(), state.uu_old.as_data());

        // the water enters through the left side
        let post = PostProc::new(&fem);
        assert!(post.boundary_flux(&state, Segment::Left) < 0.0);
        let (_, s_max) = post.saturation_range(&state);
        assert!(s_max > 0.0);

        // cannot run twice
        assert_eq!(
            stepper.run(&mut state, &mut recorder).err(),
            Some(SimError::Configuration(
                "the time stepper can only run once".to_string()
            ))
        );
    }

    #[test]
    fn run_captures_state_errors() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let policy = BoundaryPolicy::reference();
        let mut stepper = TimeStepper::new(&fem, &config, &policy).unwrap();
        let other_mesh = SampleMeshes::unit_square(2, 2);
        let other_fem = FemMesh::new(&other_mesh, &config).unwrap();
        let mut state = FemState::new(&other_fem);
        let mut recorder = SnapshotRecorder::new();
        assert_eq!(
            stepper.run(&mut state, &mut recorder).err().map(|e| e.kind()),
            Some("ConfigurationError")
        );
        assert_eq!(stepper.status(), StepperStatus::Idle);
    }

    #[test]
    fn run_stops_at_the_failing_step() {
        let mesh = SampleMeshes::unit_square(2, 2);
        let mut config = Config::new();
        config.set_dt(0.01).set_t_fin(0.05);
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let policy = BoundaryPolicy::reference();
        let mut stepper = TimeStepper::new(&fem, &config, &policy).unwrap();
        let mut state = FemState::new(&fem);
        let mut exporter = FailingExporter { count: 0 };
        let err = stepper.run(&mut state, &mut exporter).err().unwrap();
        assert_eq!(stepper.status(), StepperStatus::Failed);
        assert_eq!(
            err,
            SimError::Export {
                timestep: 2,
                reason: "disk is full".to_string()
            }
        );
        assert_eq!(stepper.summaries.len(), 2);
    }

    #[test]
    fn run_reports_nonconvergence() {
        let mesh = SampleMeshes::unit_square(2, 2);
        let mut config = Config::new();
        config.set_dt(0.01).set_t_fin(0.03).set_n_max_iterations(1).set_tol_rr(1e-15, 1e-15);
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut policy = BoundaryPolicy::reference();
        policy.on(Segment::Left, Bc::Saturation(|_| 1.0));
        let mut stepper = TimeStepper::new(&fem, &config, &policy).unwrap();
        let mut state = FemState::new(&fem);
        let mut recorder = SnapshotRecorder::new();
        let err = stepper.run(&mut state, &mut recorder).err().unwrap();
        assert_eq!(err.kind(), "NonconvergenceError");
        assert_eq!(err.timestep(), Some(1));
        assert_eq!(stepper.status(), StepperStatus::Failed);
        assert_eq!(recorder.all.len(), 0);
        assert!(!recorder.finished);
    }
}
