//! Application configuration.
//!
//! Every knob that distinguished one cube demo from another (color scheme,
//! instancing, light animation constants) is a plain value here.

use glam::Vec3;

/// Per-vertex color assignment for the built-in cube.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ColorScheme {
    /// Each cube corner gets its own color; faces blend between them.
    Corner,
    /// Each face is a single flat color.
    #[default]
    Face,
    /// Every vertex is white.
    Uniform,
}

/// How many copies of the geometry one draw produces.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum RenderMode {
    /// One draw of one object at the origin.
    #[default]
    Single,
    /// One instanced draw of a `columns` x `rows` grid in the XZ plane.
    Instanced {
        columns: u32,
        rows: u32,
        /// Distance between neighboring instance origins.
        spacing: f32,
    },
}

/// Circular motion of one light around the vertical axis.
///
/// Position at time `t`: `(r·cos(ω·t), height, r·sin(ω·t))`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightOrbit {
    /// Index of the animated light.
    pub light: usize,
    pub radius: f32,
    /// Angular speed in radians per second.
    pub angular_speed: f32,
    pub height: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            light: 2,
            radius: 0.2,
            angular_speed: 20.0,
            height: -0.1,
        }
    }
}

impl LightOrbit {
    pub fn position_at(&self, t: f64) -> Vec3 {
        let angle = f64::from(self.angular_speed) * t;
        Vec3::new(
            self.radius * angle.cos() as f32,
            self.height,
            self.radius * angle.sin() as f32,
        )
    }
}

/// Scene construction and animation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub color_scheme: ColorScheme,
    pub render_mode: RenderMode,
    /// `None` keeps every light where it was seeded.
    pub light_orbit: Option<LightOrbit>,
    /// Length of one frames-per-second reporting window, in simulated seconds.
    pub fps_delay: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::default(),
            render_mode: RenderMode::default(),
            light_orbit: Some(LightOrbit::default()),
            fps_delay: 3.0,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub scene: SceneConfig,
    /// Color the frame is cleared to before the scene is drawn.
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
        }
    }
}
