use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::{Mat4, Vec3};

use crate::config::RenderMode;
use crate::error::SceneError;

const MODEL_SCALE: f32 = 0.1;

/// Model transform at simulation time `t` (seconds):
/// `S(0.1) · Ry(π/2·t·1.5) · Rx(π/2·t) · Ry(π/4)`.
///
/// Angles are computed in `f64` and reduced before narrowing, so long
/// sessions don't lose rotation precision.
pub fn model_transform(t: f64) -> Mat4 {
    let yaw = angle(FRAC_PI_2 * t * 1.5);
    let pitch = angle(FRAC_PI_2 * t);

    Mat4::from_scale(Vec3::splat(MODEL_SCALE))
        * Mat4::from_rotation_y(yaw)
        * Mat4::from_rotation_x(pitch)
        * Mat4::from_rotation_y(FRAC_PI_4 as f32)
}

fn angle(radians: f64) -> f32 {
    radians.rem_euclid(TAU) as f32
}

/// Per-instance transforms for a render mode.
///
/// `Single` yields one identity transform. `Instanced` lays out a grid in the
/// XZ plane centered on the origin.
pub fn instance_grid(mode: RenderMode) -> Result<Vec<Mat4>, SceneError> {
    match mode {
        RenderMode::Single => Ok(vec![Mat4::IDENTITY]),
        RenderMode::Instanced {
            columns,
            rows,
            spacing,
        } => {
            if columns == 0 || rows == 0 {
                return Err(SceneError::NoInstances);
            }

            let offset = |i: u32, n: u32| (i as f32 - (n - 1) as f32 * 0.5) * spacing;

            Ok((0..rows)
                .flat_map(|row| {
                    (0..columns).map(move |col| {
                        Mat4::from_translation(Vec3::new(
                            offset(col, columns),
                            0.0,
                            offset(row, rows),
                        ))
                    })
                })
                .collect())
        }
    }
}
