//! Retained scene graph for livecad
//!
//! This crate holds everything the viewer mutates when a new part list
//! arrives:
//! - Attribute buffers that keep their allocation on same-size writes
//! - Mesh and edge-overlay geometry with bounding volumes
//! - The geometry buffer updater
//! - A reference-counted material cache
//! - A node arena with a single assembly root
//!
//! With the `gpu` feature, [`gpu::GpuMirror`] uploads dirty buffers to wgpu.

pub mod buffer;
pub mod geometry;
pub mod graph;
pub mod material;
pub mod updater;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use buffer::*;
pub use geometry::*;
pub use graph::*;
pub use material::*;
pub use updater::*;

#[cfg(feature = "gpu")]
pub use gpu::{GpuContext, GpuMirror, MirrorStats};
