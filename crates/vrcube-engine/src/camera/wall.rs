use glam::Vec3;

use super::{CameraRig, OffAxisCamera, PerspectiveCamera, ScreenCorners};

/// Horizontal row of equally sized screens viewed from one eye position.
///
/// Tile `0` is the leftmost screen. Screens lie in the plane
/// `z = eye.z - screen_distance`, centered horizontally on the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLayout {
    pub columns: u32,
    /// Physical width of one screen, in world units.
    pub tile_width: f32,
    /// Physical height of one screen, in world units.
    pub tile_height: f32,
    pub eye: Vec3,
    pub screen_distance: f32,
}

impl Default for WallLayout {
    fn default() -> Self {
        Self {
            columns: 1,
            tile_width: 0.32,
            tile_height: 0.18,
            eye: Vec3::new(0.0, 0.0, 0.5),
            screen_distance: 0.25,
        }
    }
}

impl WallLayout {
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Physical corners of tile `column`.
    pub fn screen(&self, column: u32) -> ScreenCorners {
        let total = self.tile_width * self.columns as f32;
        let left = self.eye.x - total * 0.5 + self.tile_width * column as f32;
        let center = Vec3::new(
            left + self.tile_width * 0.5,
            self.eye.y,
            self.eye.z - self.screen_distance,
        );
        ScreenCorners::facing_z(center, self.tile_width, self.tile_height)
    }

    /// Camera for tile `column`.
    ///
    /// A single-column wall gets a perspective camera with the same vertical
    /// field of view, so a lone window can be resized freely.
    pub fn rig(&self, column: u32) -> CameraRig {
        if self.columns <= 1 {
            let fov_y = 2.0 * (self.tile_height * 0.5 / self.screen_distance).atan();
            let target = self.eye - Vec3::Z * self.screen_distance;
            return CameraRig::Perspective(PerspectiveCamera {
                fov_y,
                aspect: self.tile_width / self.tile_height,
                ..PerspectiveCamera::new(self.eye, target)
            });
        }
        CameraRig::OffAxis(OffAxisCamera::new(self.eye, self.screen(column)))
    }
}
