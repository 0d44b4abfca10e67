//! Rendering module
//!
//! The simulation draws into a [`Canvas`]; [`DrawList`] records those calls
//! and the WebGPU [`RenderState`] turns them into textured triangles sampled
//! from a single sprite atlas.

pub mod atlas;
pub mod canvas;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use atlas::Atlas;
pub use canvas::{Canvas, Color, DrawCommand, DrawList};
pub use pipeline::{RenderState, Viewport};
