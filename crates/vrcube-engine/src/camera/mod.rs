//! Camera capability exposed to applications.
//!
//! Applications only see [`CameraView`]: a view matrix and a projection matrix.
//! Which concrete camera produced them (a plain perspective camera or one tile
//! of an off-axis display wall) is decided by the runtime and never inspected
//! by application code.

mod off_axis;
mod perspective;
mod rig;
mod wall;

pub use off_axis::{OffAxisCamera, ScreenCorners};
pub use perspective::PerspectiveCamera;
pub use rig::CameraRig;
pub use wall::WallLayout;

use glam::Mat4;

/// View and projection matrices for one rendering context.
///
/// Projections use wgpu clip space: right-handed view space, depth in `0..=1`.
pub trait CameraView {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
}
