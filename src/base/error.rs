use thiserror::Error;

/// Defines the errors reported by the simulation
///
/// None of these errors is recovered automatically; they propagate to the time stepper and
/// abort the run at the current time step. Files already written remain valid.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimError {
    /// Invalid physical or numerical parameters, or unknown boundary segment
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The Newton iterations exhausted the allowed number of iterations
    #[error("Newton-Raphson did not converge at timestep {timestep} (t = {t:?}) after {iterations} iterations (‖R‖∞ = {norm_rr:e})")]
    Nonconvergence {
        timestep: usize,
        t: f64,
        iterations: usize,
        norm_rr: f64,
    },

    /// The linear solve within a Newton iteration did not produce a finite update
    #[error("singular Jacobian at timestep {timestep} (t = {t:?}): {reason}")]
    SingularJacobian { timestep: usize, t: f64, reason: String },

    /// Inconsistent mesh or boundary tagging
    #[error("geometry error: {0}")]
    Geometry(String),

    /// The field exporter could not persist the results
    #[error("export error at timestep {timestep}: {reason}")]
    Export { timestep: usize, reason: String },
}

impl SimError {
    /// Returns the index of the failing time step, if the error is associated with one
    pub fn timestep(&self) -> Option<usize> {
        match self {
            SimError::Nonconvergence { timestep, .. } => Some(*timestep),
            SimError::SingularJacobian { timestep, .. } => Some(*timestep),
            SimError::Export { timestep, .. } => Some(*timestep),
            _ => None,
        }
    }

    /// Returns a short name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::Configuration(..) => "ConfigurationError",
            SimError::Nonconvergence { .. } => "NonconvergenceError",
            SimError::SingularJacobian { .. } => "SingularJacobianError",
            SimError::Geometry(..) => "GeometryError",
            SimError::Export { .. } => "ExportError",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
