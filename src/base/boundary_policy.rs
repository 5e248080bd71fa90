use super::{Segment, SimError};
use std::collections::HashMap;
use std::fmt;

/// Defines a function of space x
pub type FnSpace = fn(&[f64]) -> f64;

/// Defines the kinds of boundary conditions
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum BcKind {
    /// Prescribed pressure (weak; natural term in the Darcy equation)
    Pressure,

    /// Prescribed inflow saturation (weak; boundary flux in the transport equation)
    Saturation,

    /// Prescribed normal velocity u·n
    NormalVelocity,
}

/// Defines a boundary condition holding a pure evaluation function
#[derive(Clone, Copy, Debug)]
pub enum Bc {
    /// Pressure p̄(x)
    Pressure(FnSpace),

    /// Saturation s̄(x) used where the flow enters the domain
    Saturation(FnSpace),

    /// Normal velocity ū·n(x)
    NormalVelocity(FnSpace),
}

impl Bc {
    /// Returns the kind of this boundary condition
    pub fn kind(&self) -> BcKind {
        match self {
            Bc::Pressure(..) => BcKind::Pressure,
            Bc::Saturation(..) => BcKind::Saturation,
            Bc::NormalVelocity(..) => BcKind::NormalVelocity,
        }
    }

    /// Evaluates the prescribed value at x
    pub fn value(&self, x: &[f64]) -> f64 {
        match self {
            Bc::Pressure(f) => f(x),
            Bc::Saturation(f) => f(x),
            Bc::NormalVelocity(f) => f(x),
        }
    }
}

impl fmt::Display for Bc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, func) = match self {
            Bc::Pressure(func) => ("p", func),
            Bc::Saturation(func) => ("s", func),
            Bc::NormalVelocity(func) => ("un", func),
        };
        write!(
            f,
            "{}(0,0) = {:?}, {}(1,1) = {:?}",
            name,
            func(&[0.0, 0.0]),
            name,
            func(&[1.0, 1.0])
        )
    }
}

/// Holds the boundary conditions keyed by boundary segment
pub struct BoundaryPolicy {
    pub all: HashMap<(Segment, BcKind), Bc>,
}

impl BoundaryPolicy {
    /// Allocates a new instance without conditions
    pub fn new() -> Self {
        BoundaryPolicy { all: HashMap::new() }
    }

    /// Allocates the boundary conditions of the reference problem
    ///
    /// * Pressure `p̄ = 1 - x₀` on all segments
    /// * Saturation `s̄ = 1 - x₀` on the left segment
    /// * Normal velocity `ū·n = 0` on all segments
    pub fn reference() -> Self {
        let mut policy = BoundaryPolicy::new();
        for segment in Segment::ALL {
            policy
                .on(segment, Bc::Pressure(|x| 1.0 - x[0]))
                .on(segment, Bc::NormalVelocity(|_| 0.0));
        }
        policy.on(Segment::Left, Bc::Saturation(|x| 1.0 - x[0]));
        policy
    }

    /// Sets a boundary condition on a segment (replaces a previous condition of the same kind)
    pub fn on(&mut self, segment: Segment, bc: Bc) -> &mut Self {
        self.all.insert((segment, bc.kind()), bc);
        self
    }

    /// Returns the boundary condition of a given kind on a segment, if any
    pub fn get(&self, segment: Segment, kind: BcKind) -> Option<&Bc> {
        self.all.get(&(segment, kind))
    }

    /// Returns the prescribed value on a segment given by its numeric identifier
    ///
    /// Returns `Ok(None)` if the segment has no condition of the requested kind.
    pub fn prescribed(&self, segment_id: usize, kind: BcKind, x: &[f64]) -> Result<Option<f64>, SimError> {
        let segment = Segment::from_id(segment_id).map_err(|e| SimError::Configuration(e.to_string()))?;
        Ok(self.get(segment, kind).map(|bc| bc.value(x)))
    }

    /// Returns the segments with a given kind of boundary condition (sorted)
    pub fn segments_with(&self, kind: BcKind) -> Vec<Segment> {
        let mut segments: Vec<_> = self
            .all
            .keys()
            .filter(|(_, k)| *k == kind)
            .map(|(segment, _)| *segment)
            .collect();
        segments.sort();
        segments
    }
}

impl fmt::Display for BoundaryPolicy {
    /// Prints a formatted summary of Boundary Conditions
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Boundary conditions\n")?;
        write!(f, "===================\n")?;
        let mut keys: Vec<_> = self.all.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(bc) = self.all.get(key) {
                write!(f, "{} : {}\n", key.0, bc)?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Bc, BcKind, BoundaryPolicy};
    use crate::base::{Segment, SimError};

    #[test]
    fn reference_works() {
        let policy = BoundaryPolicy::reference();
        assert_eq!(
            format!("{}", policy),
            "Boundary conditions\n\
             ===================\n\
             left(1) : p(0,0) = 1.0, p(1,1) = 0.0\n\
             left(1) : s(0,0) = 1.0, s(1,1) = 0.0\n\
             left(1) : un(0,0) = 0.0, un(1,1) = 0.0\n\
             right(2) : p(0,0) = 1.0, p(1,1) = 0.0\n\
             right(2) : un(0,0) = 0.0, un(1,1) = 0.0\n\
             bottom(3) : p(0,0) = 1.0, p(1,1) = 0.0\n\
             bottom(3) : un(0,0) = 0.0, un(1,1) = 0.0\n\
             top(4) : p(0,0) = 1.0, p(1,1) = 0.0\n\
             top(4) : un(0,0) = 0.0, un(1,1) = 0.0\n"
        );
        assert_eq!(policy.segments_with(BcKind::Pressure), &Segment::ALL);
        assert_eq!(policy.segments_with(BcKind::Saturation), &[Segment::Left]);
    }

    #[test]
    fn prescribed_works() {
        let policy = BoundaryPolicy::reference();
        let x = [0.25, 0.5];
        assert_eq!(policy.prescribed(1, BcKind::Pressure, &x), Ok(Some(0.75)));
        assert_eq!(policy.prescribed(2, BcKind::Pressure, &x), Ok(Some(0.75)));
        assert_eq!(policy.prescribed(1, BcKind::Saturation, &x), Ok(Some(0.75)));
        assert_eq!(policy.prescribed(2, BcKind::Saturation, &x), Ok(None));
        assert_eq!(policy.prescribed(4, BcKind::NormalVelocity, &x), Ok(Some(0.0)));
        assert_eq!(
            policy.prescribed(5, BcKind::Pressure, &x).err(),
            Some(SimError::Configuration(
                "boundary segment identifier must be 1, 2, 3, or 4".to_string()
            ))
        );
    }

    #[test]
    fn on_replaces_previous_condition() {
        let mut policy = BoundaryPolicy::new();
        policy
            .on(Segment::Top, Bc::Pressure(|_| 1.0))
            .on(Segment::Top, Bc::Pressure(|x| 2.0 * x[1]));
        assert_eq!(policy.all.len(), 1);
        let bc = policy.get(Segment::Top, BcKind::Pressure).unwrap();
        assert_eq!(bc.value(&[0.0, 1.0]), 2.0);
        assert!(policy.get(Segment::Top, BcKind::Saturation).is_none());
    }
}
