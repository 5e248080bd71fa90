//! Implements the base structures for a two-phase flow simulation

mod boundary_policy;
mod config;
mod constants;
mod enums;
mod error;
mod mobility;
mod permeability;
mod sample_meshes;
pub use crate::base::boundary_policy::*;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::error::*;
pub use crate::base::mobility::*;
pub use crate::base::permeability::*;
pub use crate::base::sample_meshes::*;
