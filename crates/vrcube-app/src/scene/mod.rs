//! Scene data shared by every rendering context.
//!
//! [`SceneState`] is built once, advanced once per frame on the coordinating
//! thread and read concurrently by render threads between updates.

mod animation;
mod cube;
mod fps;
mod geometry;
mod lights;
mod state;

pub use animation::{instance_grid, model_transform};
pub use cube::CubeGeometry;
pub use fps::FpsCounter;
pub use geometry::{Geometry, GeometrySource, MeshGeometry};
pub use lights::{LightSet, MAX_LIGHTS, PointLight};
pub use state::SceneState;
