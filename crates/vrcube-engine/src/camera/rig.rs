use glam::Mat4;

use super::{CameraView, OffAxisCamera, PerspectiveCamera};

/// Camera owned by the runtime for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraRig {
    /// Free-standing window; aspect follows the drawable size.
    Perspective(PerspectiveCamera),
    /// One tile of a display wall; the frustum follows the physical screen.
    OffAxis(OffAxisCamera),
}

impl CameraRig {
    /// Notifies the rig of a new drawable size.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self {
            CameraRig::Perspective(cam) => cam.set_viewport(width, height),
            // Screen geometry is physical; window size does not change it.
            CameraRig::OffAxis(_) => {}
        }
    }
}

impl CameraView for CameraRig {
    fn view_matrix(&self) -> Mat4 {
        match self {
            CameraRig::Perspective(cam) => cam.view_matrix(),
            CameraRig::OffAxis(cam) => cam.view_matrix(),
        }
    }

    fn projection_matrix(&self) -> Mat4 {
        match self {
            CameraRig::Perspective(cam) => cam.projection_matrix(),
            CameraRig::OffAxis(cam) => cam.projection_matrix(),
        }
    }
}
