use super::{FemMesh, FieldExporter, Snapshot, StepSummary};
use crate::base::{Field, SimError, DEFAULT_OUT_DIR};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Assists in generating output files
///
/// Each field is written to its own series of VTU files (one file per exported time step)
/// and to one PVD collection file referencing the series. A JSON summary lists the exported
/// indices and times.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileIo {
    /// Holds a flag to enable/disable the file generation
    enabled: bool,

    /// Defines the output directory
    output_dir: String,

    /// Defines the filename stem
    filename_stem: String,

    /// Holds the indices of the exported time steps
    pub indices: Vec<usize>,

    /// Holds the simulation times corresponding to each exported time step
    pub times: Vec<f64>,

    /// Holds the convergence summary of each time step (if given)
    pub steps: Vec<StepSummary>,

    /// Holds the coordinates of the points
    #[serde(skip)]
    pub(crate) coords: Vec<[f64; 2]>,

    /// Holds the connectivity of the cells
    #[serde(skip)]
    pub(crate) cells: Vec<[usize; 3]>,

    /// Holds the VTK type of the cells
    #[serde(skip)]
    pub(crate) vtk_type: usize,
}

impl FileIo {
    /// Allocates a new instance with deactivated generation of files
    pub fn new() -> Self {
        FileIo {
            enabled: false,
            output_dir: String::new(),
            filename_stem: String::new(),
            indices: Vec::new(),
            times: Vec::new(),
            steps: Vec::new(),
            coords: Vec::new(),
            cells: Vec::new(),
            vtk_type: 0,
        }
    }

    /// Allocates a new instance given a FemMesh
    ///
    /// # Input
    ///
    /// * `fem` -- the FEM mesh
    /// * `filename_stem` -- the last part of the filename without extension, e.g., "my_simulation"
    /// * `output_directory` -- the directory to save the output files.
    ///   None means that the default directory will be used; see [DEFAULT_OUT_DIR]
    pub fn new_enabled(fem: &FemMesh, filename_stem: &str, output_directory: Option<&str>) -> Result<Self, StrError> {
        // output directory
        let out_dir = match output_directory {
            Some(d) => d,
            None => DEFAULT_OUT_DIR,
        };

        // create directory
        fs::create_dir_all(out_dir).map_err(|_| "cannot create output directory")?;

        // write the mesh
        let path = format!("{}/{}-mesh.json", out_dir, filename_stem);
        fem.mesh.write_json(&path)?;

        // geometry
        let vtk_type = match fem.mesh.cells[0].kind.vtk_type() {
            Some(vtk) => vtk,
            None => return Err("cannot generate VTU file because VTK cell type is not available"),
        };
        let coords = fem.mesh.points.iter().map(|p| [p.coords[0], p.coords[1]]).collect();
        let cells = fem
            .mesh
            .cells
            .iter()
            .map(|c| [c.points[0], c.points[1], c.points[2]])
            .collect();

        // new structure
        Ok(FileIo {
            enabled: true,
            output_dir: out_dir.to_string(),
            filename_stem: filename_stem.to_string(),
            indices: Vec::new(),
            times: Vec::new(),
            steps: Vec::new(),
            coords,
            cells,
            vtk_type,
        })
    }

    /// Returns whether the generation of files is enabled or not
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Generates the filename path for the mesh file
    pub fn path_mesh(&self) -> String {
        if self.enabled {
            format!("{}/{}-mesh.json", self.output_dir, self.filename_stem)
        } else {
            "".to_string()
        }
    }

    /// Generates the filename path for the summary file
    pub fn path_summary(&self) -> String {
        if self.enabled {
            format!("{}/{}-summary.json", self.output_dir, self.filename_stem)
        } else {
            "".to_string()
        }
    }

    /// Generates the filename (without directory) of the VTU file of a field at a time step
    pub fn filename_vtu(&self, field: Field, index: usize) -> String {
        format!("{}-{}-{:0>6}.vtu", self.filename_stem, field.name(), index)
    }

    /// Generates the filename path for the VTU file of a field at a time step
    pub fn path_vtu(&self, field: Field, index: usize) -> String {
        if self.enabled {
            format!("{}/{}", self.output_dir, self.filename_vtu(field, index))
        } else {
            "".to_string()
        }
    }

    /// Generates the filename path for the PVD file of a field
    pub fn path_pvd(&self, field: Field) -> String {
        if self.enabled {
            format!("{}/{}-{}.pvd", self.output_dir, self.filename_stem, field.name())
        } else {
            "".to_string()
        }
    }

    /// Reads a JSON file containing this struct
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
        let summary = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(summary)
    }

    /// Writes a JSON file with this struct
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

    /// Writes this struct to the summary file
    pub fn write_self(&self) -> Result<(), StrError> {
        if self.enabled {
            let path = self.path_summary();
            self.write_json(&path)?;
        }
        Ok(())
    }
}

impl FieldExporter for FileIo {
    /// Writes one VTU file per field
    ///
    /// **Note:** No output is generated if the instance is not enabled.
    fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
        if self.enabled {
            for field in Field::ALL {
                self.write_vtu(&snapshot, field).map_err(|e| SimError::Export {
                    timestep: snapshot.index,
                    reason: e.to_string(),
                })?;
            }
            self.indices.push(snapshot.index);
            self.times.push(snapshot.t);
        }
        Ok(())
    }

    /// Writes the PVD files and the summary
    ///
    /// Only the snapshots exported successfully are listed in the PVD files.
    fn finish(&mut self) -> Result<(), SimError> {
        if self.enabled {
            let timestep = self.indices.last().copied().unwrap_or(0);
            let error = |e: StrError| SimError::Export {
                timestep,
                reason: e.to_string(),
            };
            for field in Field::ALL {
                self.write_pvd(field).map_err(error)?;
            }
            self.write_self().map_err(error)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FileIo;
    use crate::base::{Config, Field, SampleMeshes, DEFAULT_TEST_DIR};
    use crate::fem::{FemMesh, FemState, FieldExporter, Snapshot};

    #[test]
    fn new_works() {
        let file_io = FileIo::new();
        assert_eq!(file_io.enabled(), false);
        assert_eq!(file_io.path_mesh(), "");
        assert_eq!(file_io.path_summary(), "");
        assert_eq!(file_io.path_vtu(Field::Pressure, 0), "");
        assert_eq!(file_io.path_pvd(Field::Pressure), "");
    }

    #[test]
    fn disabled_exporter_does_nothing() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let state = FemState::new(&fem);
        let mut file_io = FileIo::new();
        file_io.export(Snapshot::new(&fem, &state, 1)).unwrap();
        file_io.finish().unwrap();
        assert_eq!(file_io.indices.len(), 0);
    }

    #[test]
    fn new_enabled_works() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let file_io = FileIo::new_enabled(&fem, "test_file_io_new_enabled", Some(DEFAULT_TEST_DIR)).unwrap();
        assert_eq!(
            file_io.path_mesh(),
            "/tmp/tpflow/test/test_file_io_new_enabled-mesh.json"
        );
        assert_eq!(
            file_io.path_summary(),
            "/tmp/tpflow/test/test_file_io_new_enabled-summary.json"
        );
        assert_eq!(
            file_io.path_vtu(Field::Saturation, 12),
            "/tmp/tpflow/test/test_file_io_new_enabled-saturation-000012.vtu"
        );
        assert_eq!(
            file_io.path_pvd(Field::Velocity),
            "/tmp/tpflow/test/test_file_io_new_enabled-velocity.pvd"
        );
        assert_eq!(file_io.coords.len(), 4);
        assert_eq!(file_io.cells, &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(file_io.vtk_type, 5);
    }
}
