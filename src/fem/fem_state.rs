use super::FemMesh;
use crate::base::Field;
use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of a simulation
///
/// The coupled unknown vector `uu` is ordered as `[u | p | s]` (see `FieldLayout`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FemState {
    /// Time at the current step
    pub t: f64,

    /// Time increment
    pub dt: f64,

    /// Coupled unknowns at the current step (Newton iterate)
    ///
    /// (n_equation)
    pub uu: Vector,

    /// Coupled unknowns at the previous step (converged)
    ///
    /// (n_equation)
    pub uu_old: Vector,
}

impl FemState {
    /// Allocates a new instance with all unknowns equal to zero (the initial condition)
    pub fn new(fem: &FemMesh) -> Self {
        let n_equation = fem.layout.n_equation;
        FemState {
            t: 0.0,
            dt: 0.0,
            uu: Vector::new(n_equation),
            uu_old: Vector::new(n_equation),
        }
    }

    /// Returns the current values of a sub-field
    pub fn field<'b>(&'b self, fem: &FemMesh, field: Field) -> &'b [f64] {
        &self.uu.as_data()[fem.layout.range(field)]
    }

    /// Reads a JSON file containing the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(state)
    }

    /// Writes a JSON file with the state data
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
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FemState;
    use crate::base::{Config, Field, SampleMeshes, DEFAULT_TEST_DIR};
    use crate::fem::FemMesh;

    #[test]
    fn new_and_field_work() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut state = FemState::new(&fem);
        assert_eq!(state.uu.dim(), 16);
        assert_eq!(state.uu_old.dim(), 16);
        state.uu[11] = 2.0;
        state.uu[15] = 0.5;
        assert_eq!(state.field(&fem, Field::Velocity).len(), 10);
        assert_eq!(state.field(&fem, Field::Pressure), &[0.0, 2.0]);
        assert_eq!(state.field(&fem, Field::Saturation), &[0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn read_and_write_json_work() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut state = FemState::new(&fem);
        state.t = 0.25;
        state.dt = 0.01;
        state.uu[3] = -1.5;
        let full_path = format!("{}/read_and_write_json_work.json", DEFAULT_TEST_DIR);
        state.write_json(&full_path).unwrap();
        let read = FemState::read_json(&full_path).unwrap();
        assert_eq!(read.t, 0.25);
        assert_eq!(read.dt, 0.01);
        assert_eq!(read.uu.as_data(), state.uu.as_data());
        assert_eq!(
            FemState::read_json("/tmp/tpflow/__not_found__.json").err(),
            Some("cannot open file")
        );
    }
}
