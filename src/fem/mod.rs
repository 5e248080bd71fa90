//! Implements the finite element method

mod assembly;
mod bc_prescribed;
mod boundaries;
mod boundary_two_phase;
mod cell_geometry;
mod control_convergence;
mod element_trait;
mod element_two_phase;
mod elements;
mod fem_mesh;
mod fem_state;
mod field_exporter;
mod field_layout;
mod file_io;
mod file_io_write_vtu;
mod linear_system;
mod post_processing;
mod solver_newton;
mod time_stepper;
pub use crate::fem::assembly::*;
pub use crate::fem::bc_prescribed::*;
pub use crate::fem::boundaries::*;
pub use crate::fem::boundary_two_phase::*;
pub use crate::fem::cell_geometry::*;
pub use crate::fem::control_convergence::*;
pub use crate::fem::element_trait::*;
pub use crate::fem::element_two_phase::*;
pub use crate::fem::elements::*;
pub use crate::fem::fem_mesh::*;
pub use crate::fem::fem_state::*;
pub use crate::fem::field_exporter::*;
pub use crate::fem::field_layout::*;
pub use crate::fem::file_io::*;
pub use crate::fem::linear_system::*;
pub use crate::fem::post_processing::*;
pub use crate::fem::solver_newton::*;
pub use crate::fem::time_stepper::*;
