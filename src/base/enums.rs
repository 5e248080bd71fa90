use crate::base::DEFAULT_EPSILON;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the boundary segments of the unit-square model problem
///
/// ```text
///  |----4----|
///  |         |
///  1         2
///  |         |
///  |----3----|
/// ```
///
/// Note: The fixed numbering scheme assists in sorting the segments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Segment {
    /// The x = 0 side
    Left = 1,

    /// The x = 1 side
    Right = 2,

    /// The y = 0 side
    Bottom = 3,

    /// The y = 1 side
    Top = 4,
}

impl Segment {
    /// Returns all segments in ascending order of identifier
    pub const ALL: [Segment; 4] = [Segment::Left, Segment::Right, Segment::Bottom, Segment::Top];

    /// Returns the segment corresponding to a numeric identifier (1 to 4)
    pub fn from_id(id: usize) -> Result<Self, StrError> {
        match id {
            1 => Ok(Segment::Left),
            2 => Ok(Segment::Right),
            3 => Ok(Segment::Bottom),
            4 => Ok(Segment::Top),
            _ => Err("boundary segment identifier must be 1, 2, 3, or 4"),
        }
    }

    /// Returns the numeric identifier of this segment
    pub fn id(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Left => "left",
            Segment::Right => "right",
            Segment::Bottom => "bottom",
            Segment::Top => "top",
        };
        write!(f, "{}({})", name, self.id())
    }
}

/// Defines the fields of the coupled mixed problem
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Field {
    /// Total velocity (flux); divergence-conforming vector field
    Velocity,

    /// Pressure; discontinuous scalar field
    Pressure,

    /// Saturation of the wetting phase; continuous scalar field
    Saturation,
}

impl Field {
    /// Returns all fields
    pub const ALL: [Field; 3] = [Field::Velocity, Field::Pressure, Field::Saturation];

    /// Returns the name used in output files
    pub fn name(&self) -> &'static str {
        match self {
            Field::Velocity => "velocity",
            Field::Pressure => "pressure",
            Field::Saturation => "saturation",
        }
    }
}

/// Defines the stabilization strategy for the saturation transport equation
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum Stabilization {
    /// Isotropic diffusion `ε Δt ∫ ∇r·∇s_mid dΩ`
    Diffusive { epsilon: f64 },

    /// Streamline upwind diffusion `Δt ∫ τ (u₀·∇r)(u₀·∇s_mid) dΩ` with `τ = h / (2 |u₀|)`
    ///
    /// The velocity `u₀` is taken from the previous time step.
    StreamlineUpwind,
}

impl Default for Stabilization {
    fn default() -> Self {
        Stabilization::Diffusive {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Defines how the inflow saturation boundary term is applied
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum InflowMode {
    /// Applies `Δt ∫ r F(s̄) u·n dΓ` on every segment with a saturation condition, regardless of the flow direction
    Marked,

    /// Selects the boundary flux by the sign of `u₀·n` (previous velocity)
    ///
    /// Inflow uses `F(s̄)` where a saturation condition exists (zero otherwise);
    /// outflow uses `F(s_mid)` from the interior.
    Upwind,
}

/// Defines the sparse linear solver used within the Newton iterations
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum LinSolKind {
    /// UMFPACK (unsymmetric multifrontal)
    Umfpack,

    /// MUMPS (multifrontal massively parallel)
    Mumps,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
