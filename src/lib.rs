//! Tpflow -- Two-phase flow in porous media
//!
//! This crate simulates the incompressible and immiscible flow of two fluid phases (e.g., water and
//! oil) through a heterogeneous porous medium. The velocity (total flux), pressure, and saturation
//! fields are discretized by a mixed finite element method (BDM₁ × DG₀ × CG₁) and the coupled
//! nonlinear system is solved by the Newton-Raphson method at every time step.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod fem;
pub mod prelude;
