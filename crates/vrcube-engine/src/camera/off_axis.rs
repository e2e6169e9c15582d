use glam::{Mat4, Vec3, Vec4};

use super::CameraView;

/// Physical placement of a display surface in world space.
///
/// Corners are the lower-left, lower-right and upper-left points of the
/// visible screen area. They must span a non-degenerate rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenCorners {
    pub lower_left: Vec3,
    pub lower_right: Vec3,
    pub upper_left: Vec3,
}

impl ScreenCorners {
    /// Screen of `width` x `height` centered on `center`, facing +Z.
    pub fn facing_z(center: Vec3, width: f32, height: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self {
            lower_left: center + Vec3::new(-hw, -hh, 0.0),
            lower_right: center + Vec3::new(hw, -hh, 0.0),
            upper_left: center + Vec3::new(-hw, hh, 0.0),
        }
    }

    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let right = (self.lower_right - self.lower_left).normalize();
        let up = (self.upper_left - self.lower_left).normalize();
        let normal = right.cross(up).normalize();
        (right, up, normal)
    }
}

/// Generalized perspective projection for a tracked eye in front of a fixed
/// screen.
///
/// Used for display walls: every tile shares the eye position and gets its own
/// asymmetric frustum, so geometry lines up across tile borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffAxisCamera {
    pub eye: Vec3,
    pub screen: ScreenCorners,
    pub near: f32,
    pub far: f32,
}

impl OffAxisCamera {
    pub fn new(eye: Vec3, screen: ScreenCorners) -> Self {
        Self {
            eye,
            screen,
            near: 0.01,
            far: 100.0,
        }
    }

    /// Frustum extents `(left, right, bottom, top)` on the near plane.
    pub fn frustum_extents(&self) -> (f32, f32, f32, f32) {
        let (right, up, normal) = self.screen.basis();

        let to_ll = self.screen.lower_left - self.eye;
        let to_lr = self.screen.lower_right - self.eye;
        let to_ul = self.screen.upper_left - self.eye;

        // Distance from the eye to the screen plane.
        let dist = -to_ll.dot(normal);
        let scale = self.near / dist;

        (
            right.dot(to_ll) * scale,
            right.dot(to_lr) * scale,
            up.dot(to_ll) * scale,
            up.dot(to_ul) * scale,
        )
    }
}

/// Right-handed frustum with depth mapped to `0..=1`.
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let w = right - left;
    let h = top - bottom;
    let depth = near - far;

    Mat4::from_cols(
        Vec4::new(2.0 * near / w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / h, 0.0, 0.0),
        Vec4::new((right + left) / w, (top + bottom) / h, far / depth, -1.0),
        Vec4::new(0.0, 0.0, near * far / depth, 0.0),
    )
}

impl CameraView for OffAxisCamera {
    fn view_matrix(&self) -> Mat4 {
        let (right, up, normal) = self.screen.basis();
        let rotation = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            normal.extend(0.0),
            Vec4::W,
        )
        .transpose();

        rotation * Mat4::from_translation(-self.eye)
    }

    fn projection_matrix(&self) -> Mat4 {
        let (l, r, b, t) = self.frustum_extents();
        frustum_rh(l, r, b, t, self.near, self.far)
    }
}
