use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::scene::{LightSet, MAX_LIGHTS, SceneState};

/// Uniform block shared by both cube shader stages.
///
/// Layout matches `Uniforms` in `shaders/cube.*.wgsl` (592 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_count: u32,
    pub _pad: [u32; 3], // 16-byte alignment
    pub light_positions: [[f32; 4]; MAX_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_LIGHTS],
}

impl FrameUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Packs matrices and lights. Lights past [`MAX_LIGHTS`] are dropped.
    pub fn new(model: Mat4, view: Mat4, proj: Mat4, lights: &LightSet) -> Self {
        let mut u = Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            light_count: 0,
            _pad: [0; 3],
            light_positions: [[0.0; 4]; MAX_LIGHTS],
            light_colors: [[0.0; 4]; MAX_LIGHTS],
        };

        for (i, light) in lights.iter().take(MAX_LIGHTS).enumerate() {
            u.light_positions[i] = point(light.position);
            u.light_colors[i] = point(light.color);
            u.light_count += 1;
        }
        u
    }

    /// Snapshot of `scene` as seen through one camera.
    pub fn from_scene(scene: &SceneState, view: Mat4, proj: Mat4) -> Self {
        Self::new(scene.model_transform(), view, proj, scene.lights())
    }
}

fn point(v: Vec3) -> [f32; 4] {
    v.extend(1.0).to_array()
}
