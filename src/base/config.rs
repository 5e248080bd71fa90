use super::{InflowMode, LinSolKind, Permeability, Stabilization, STEP_COUNT_TOLERANCE};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds configuration parameters
///
/// The default values correspond to the reference problem: `μ_rel = 0.2`, `Δt = 0.01`,
/// `T = 200 Δt`, polynomial degree 1, and diffusive stabilization with `ε = 0.01`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Viscosity ratio μ_rel = μ_water / μ_oil (> 0)
    pub mu_rel: f64,

    /// Time increment Δt (> 0)
    pub dt: f64,

    /// Total simulated time T (≥ Δt)
    pub t_fin: f64,

    /// Polynomial degree of the flux and saturation spaces (the pressure space is one degree lower)
    pub degree: usize,

    /// Stabilization of the saturation transport equation
    pub stabilization: Stabilization,

    /// Treatment of the inflow saturation boundary term
    pub inflow: InflowMode,

    /// Permeability field
    pub permeability: Permeability,

    /// Max number of Newton iterations per time step
    pub n_max_iterations: usize,

    /// Absolute tolerance for the norm of the residual ‖R‖∞
    pub tol_rr_abs: f64,

    /// Relative tolerance for the norm of the residual ‖R‖∞ / ‖R₀‖∞
    pub tol_rr_rel: f64,

    /// Sparse linear solver
    pub lin_sol_kind: LinSolKind,

    /// Computes the element contributions in parallel
    pub parallel_assembly: bool,

    /// Shows messages for each time step
    pub verbose_timesteps: bool,

    /// Shows messages for each iteration
    pub verbose_iterations: bool,

    /// Shows the linear solver messages
    pub verbose_lin_sys_solve: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        Config {
            mu_rel: 0.2,
            dt: 0.01,
            t_fin: 2.0,
            degree: 1,
            stabilization: Stabilization::default(),
            inflow: InflowMode::Marked,
            permeability: Permeability::Channel,
            n_max_iterations: 20,
            tol_rr_abs: 1e-10,
            tol_rr_rel: 1e-9,
            lin_sol_kind: LinSolKind::Umfpack,
            parallel_assembly: false,
            verbose_timesteps: false,
            verbose_iterations: false,
            verbose_lin_sys_solve: false,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if !(self.mu_rel > 0.0) || !self.mu_rel.is_finite() {
            return Some(format!("mu_rel = {:?} is incorrect; it must be > 0.0", self.mu_rel));
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Some(format!("dt = {:?} is incorrect; it must be > 0.0", self.dt));
        }
        if !(self.t_fin >= self.dt) || !self.t_fin.is_finite() {
            return Some(format!("t_fin = {:?} is incorrect; it must be ≥ dt = {:?}", self.t_fin, self.dt));
        }
        if self.degree < 1 {
            return Some(format!("degree = {} is incorrect; it must be ≥ 1", self.degree));
        }
        if let Stabilization::Diffusive { epsilon } = self.stabilization {
            if !(epsilon >= 0.0) || !epsilon.is_finite() {
                return Some(format!("epsilon = {:?} is incorrect; it must be ≥ 0.0", epsilon));
            }
        }
        if let Some(msg) = self.permeability.validate() {
            return Some(msg);
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if !(self.tol_rr_abs > 0.0) {
            return Some(format!("tol_rr_abs = {:?} is incorrect; it must be > 0.0", self.tol_rr_abs));
        }
        if !(self.tol_rr_rel > 0.0) {
            return Some(format!("tol_rr_rel = {:?} is incorrect; it must be > 0.0", self.tol_rr_rel));
        }
        None // all good
    }

    /// Returns the number of time steps ⌈T/Δt⌉
    ///
    /// A small tolerance absorbs the round-off in T/Δt; e.g., T = 2.0 and Δt = 0.01 yield 200 steps.
    pub fn n_time_steps(&self) -> usize {
        let ratio = self.t_fin / self.dt;
        f64::ceil(ratio - STEP_COUNT_TOLERANCE * f64::max(1.0, ratio)) as usize
    }

    /// Sets the viscosity ratio
    pub fn set_mu_rel(&mut self, value: f64) -> &mut Self {
        self.mu_rel = value;
        self
    }

    /// Sets the time increment
    pub fn set_dt(&mut self, value: f64) -> &mut Self {
        self.dt = value;
        self
    }

    /// Sets the total simulated time
    pub fn set_t_fin(&mut self, value: f64) -> &mut Self {
        self.t_fin = value;
        self
    }

    /// Sets the polynomial degree
    pub fn set_degree(&mut self, value: usize) -> &mut Self {
        self.degree = value;
        self
    }

    /// Sets the diffusive stabilization with a given coefficient ε
    pub fn set_epsilon(&mut self, value: f64) -> &mut Self {
        self.stabilization = Stabilization::Diffusive { epsilon: value };
        self
    }

    /// Sets the stabilization strategy
    pub fn set_stabilization(&mut self, value: Stabilization) -> &mut Self {
        self.stabilization = value;
        self
    }

    /// Sets the treatment of the inflow boundary term
    pub fn set_inflow(&mut self, value: InflowMode) -> &mut Self {
        self.inflow = value;
        self
    }

    /// Sets the permeability field
    pub fn set_permeability(&mut self, value: Permeability) -> &mut Self {
        self.permeability = value;
        self
    }

    /// Sets the max number of Newton iterations
    pub fn set_n_max_iterations(&mut self, value: usize) -> &mut Self {
        self.n_max_iterations = value;
        self
    }

    /// Sets the absolute and relative tolerances for the residual
    pub fn set_tol_rr(&mut self, abs: f64, rel: f64) -> &mut Self {
        self.tol_rr_abs = abs;
        self.tol_rr_rel = rel;
        self
    }

    /// Sets the sparse linear solver
    pub fn set_lin_sol_kind(&mut self, value: LinSolKind) -> &mut Self {
        self.lin_sol_kind = value;
        self
    }

    /// Enables or disables the parallel computation of element contributions
    pub fn set_parallel_assembly(&mut self, flag: bool) -> &mut Self {
        self.parallel_assembly = flag;
        self
    }

    /// Enables or disables the messages for time steps and iterations
    pub fn set_verbose(&mut self, timesteps: bool, iterations: bool, lin_sys_solve: bool) -> &mut Self {
        self.verbose_timesteps = timesteps;
        self.verbose_iterations = iterations;
        self.verbose_lin_sys_solve = lin_sys_solve;
        self
    }

    /// Reads a JSON file containing the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(file);
        let config = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(config)
    }

    /// Writes a JSON file with the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n")?;
        write!(f, "==================\n")?;
        write!(f, "mu_rel = {:?}\n", self.mu_rel)?;
        write!(f, "dt = {:?}\n", self.dt)?;
        write!(f, "t_fin = {:?}\n", self.t_fin)?;
        write!(f, "n_time_steps = {:?}\n", self.n_time_steps())?;
        write!(f, "degree = {:?}\n", self.degree)?;
        write!(f, "stabilization = {:?}\n", self.stabilization)?;
        write!(f, "inflow = {:?}\n", self.inflow)?;
        write!(f, "permeability = {:?}\n", self.permeability)?;
        write!(f, "\nNewton-Raphson parameters\n")?;
        write!(f, "=========================\n")?;
        write!(f, "n_max_iterations = {:?}\n", self.n_max_iterations)?;
        write!(f, "tol_rr_abs = {:?}\n", self.tol_rr_abs)?;
        write!(f, "tol_rr_rel = {:?}\n", self.tol_rr_rel)?;
        write!(f, "lin_sol_kind = {:?}\n", self.lin_sol_kind)?;
        write!(f, "parallel_assembly = {:?}\n", self.parallel_assembly)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
