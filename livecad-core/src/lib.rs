//! Core data structures for livecad
//!
//! This crate provides the part model that flows from a parametric CAD
//! modeling session into a live 3D viewer:
//! - Parts with tessellated meshes, placement, appearance and visibility
//! - Bounding volumes over packed position buffers
//! - Snapshot and event messages exchanged with the modeling side
//! - Viewer configuration

pub mod bounds;
pub mod color;
pub mod config;
pub mod error;
pub mod mesh;
pub mod message;
pub mod part;
pub mod transform;

pub use bounds::*;
pub use color::*;
pub use config::*;
pub use error::*;
pub use mesh::*;
pub use message::*;
pub use part::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, UnitQuaternion, Vector3};
