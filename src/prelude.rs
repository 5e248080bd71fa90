//! Makes available common structures needed to run a simulation
//!
//! You may write `use tpflow::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Bc, BcKind, BoundaryPolicy, Config, Field, InflowMode, LinSolKind, Permeability};
pub use crate::base::{Mobility, SampleMeshes, Segment, SimError, Stabilization};
pub use crate::base::{DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::fem::{FemMesh, FemState, FieldExporter, FileIo, PostProc, QueuedExporter};
pub use crate::fem::{Snapshot, SnapshotRecorder, SolverNewton, StepSummary, StepperStatus, TimeStepper};
