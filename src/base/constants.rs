/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/tpflow/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/tpflow/test";

/// Defines the default coefficient of the diffusive stabilization
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Defines the tolerance to decide whether a point lies on a boundary segment of the unit square
pub const SEGMENT_TOLERANCE: f64 = 1e-10;

/// Defines the tolerance used when computing the number of time steps from T/Δt
pub const STEP_COUNT_TOLERANCE: f64 = 1e-9;
