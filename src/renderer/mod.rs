//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into flat-colored triangles in world
//! space, then mapped to NDC by the current `View` and drawn in one pass.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{VIEW_HEIGHT, View};
pub use vertex::Vertex;
