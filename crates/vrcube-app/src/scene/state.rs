use glam::{Mat4, Vec3};

use crate::config::SceneConfig;
use crate::error::SceneError;

use super::animation::{instance_grid, model_transform};
use super::fps::FpsCounter;
use super::geometry::{Geometry, GeometrySource};
use super::lights::{LightSet, MAX_LIGHTS, PointLight};

/// The single authoritative scene snapshot.
///
/// Geometry and instances are fixed at [`SceneState::initialize`]. The model
/// transform and animated lights are recomputed by [`SceneState::update`]
/// from the simulation time alone; calling `update` with the same time always
/// produces the same snapshot regardless of earlier calls.
///
/// Render threads only read a `SceneState`. The host guarantees no `update`
/// runs while any of them does.
#[derive(Debug, Clone)]
pub struct SceneState {
    config: SceneConfig,
    source: String,

    geometry: Geometry,
    instances: Vec<Mat4>,
    lights: LightSet,

    simulation_time: f64,
    model: Mat4,

    fps: FpsCounter,
}

impl SceneState {
    pub fn initialize(config: &SceneConfig, source: &dyn GeometrySource) -> Result<Self, SceneError> {
        let geometry = source.build()?;
        let instances = instance_grid(config.render_mode)?;
        let lights = LightSet::seeded();

        if let Some(orbit) = config.light_orbit
            && orbit.light >= lights.len()
        {
            return Err(SceneError::LightIndexOutOfRange {
                index: orbit.light,
                count: lights.len(),
            });
        }

        let state = Self {
            config: config.clone(),
            source: source.name().to_string(),
            geometry,
            instances,
            lights,
            simulation_time: 0.0,
            model: model_transform(0.0),
            fps: FpsCounter::new(config.fps_delay),
        };
        state.check_invariants()?;

        log::info!(
            "scene initialized from {}: {} vertices, {} indices, {} lights, {} instance(s)",
            state.source,
            state.geometry.vertex_count(),
            state.geometry.index_count(),
            state.lights.len(),
            state.instances.len(),
        );
        Ok(state)
    }

    /// Advances the animated parts of the scene to `simulation_time`.
    pub fn update(&mut self, simulation_time: f64) -> Result<(), SceneError> {
        self.simulation_time = simulation_time;
        self.model = model_transform(simulation_time);

        if let Some(orbit) = self.config.light_orbit {
            self.lights
                .set_position(orbit.light, orbit.position_at(simulation_time))?;
        }

        if let Some(fps) = self.fps.tick(simulation_time) {
            log::info!("{fps:.1} fps");
        }
        Ok(())
    }

    /// Re-checks geometry, light and instance invariants.
    pub fn check_invariants(&self) -> Result<(), SceneError> {
        self.geometry.validate()?;
        if self.lights.len() > MAX_LIGHTS {
            return Err(SceneError::TooManyLights { max: MAX_LIGHTS });
        }
        if self.instances.is_empty() {
            return Err(SceneError::NoInstances);
        }
        Ok(())
    }

    // ── lights ───────────────────────────────────────────────────────────

    /// Adds a light. Fails once [`MAX_LIGHTS`] are present.
    pub fn push_light(&mut self, light: PointLight) -> Result<usize, SceneError> {
        self.lights.push(light)
    }

    /// Replaces the light at `index`.
    ///
    /// An orbiting light's position is overwritten again by the next `update`.
    pub fn set_light(&mut self, index: usize, position: Vec3, color: Vec3) -> Result<(), SceneError> {
        self.lights.set_position(index, position)?;
        self.lights.set_color(index, color)
    }

    // ── read accessors ───────────────────────────────────────────────────

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn model_transform(&self) -> Mat4 {
        self.model
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn instances(&self) -> &[Mat4] {
        &self.instances
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Name of the geometry source this scene was built from.
    pub fn source_name(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorScheme, LightOrbit, RenderMode};
    use crate::scene::CubeGeometry;

    fn white_cube() -> SceneState {
        let config = SceneConfig {
            color_scheme: ColorScheme::Uniform,
            ..SceneConfig::default()
        };
        SceneState::initialize(&config, &CubeGeometry::new(config.color_scheme)).unwrap()
    }

    fn light_positions(scene: &SceneState) -> Vec<Vec3> {
        scene.lights().positions().collect()
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn white_cube_scene_shape() {
        let scene = white_cube();
        assert_eq!(scene.geometry().vertex_count(), 24);
        assert_eq!(scene.geometry().index_count(), 36);
        assert_eq!(scene.lights().len(), 3);
        assert_eq!(scene.instances(), &[Mat4::IDENTITY]);
        assert!(scene.geometry().colors.iter().all(|c| *c == Vec3::ONE));
    }

    #[test]
    fn update_at_zero_is_scaled_quarter_turn() {
        let mut scene = white_cube();
        scene.update(0.0).unwrap();

        let expected =
            Mat4::from_scale(Vec3::splat(0.1)) * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(scene.model_transform().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn update_moves_only_the_orbiting_light() {
        let mut scene = white_cube();
        scene.update(0.0).unwrap();
        let before = light_positions(&scene);
        let model_before = scene.model_transform();

        scene.update(3.0).unwrap();
        let after = light_positions(&scene);

        assert_ne!(scene.model_transform(), model_before);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_ne!(after[2], before[2]);
        assert_eq!(after[2], LightOrbit::default().position_at(3.0));
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn update_depends_only_on_time() {
        let mut scene = white_cube();
        scene.update(1.25).unwrap();
        let model = scene.model_transform();
        let lights = light_positions(&scene);

        scene.update(7.5).unwrap();
        scene.update(1.25).unwrap();

        assert_eq!(scene.model_transform(), model);
        assert_eq!(light_positions(&scene), lights);
        assert_eq!(scene.simulation_time(), 1.25);
    }

    #[test]
    fn update_never_touches_geometry() {
        let mut scene = white_cube();
        let geometry = scene.geometry().clone();
        for i in 0..50 {
            scene.update(f64::from(i) * 0.37).unwrap();
        }
        assert_eq!(scene.geometry(), &geometry);
        assert_eq!(scene.check_invariants(), Ok(()));
    }

    #[test]
    fn without_orbit_lights_stay_put() {
        let config = SceneConfig {
            light_orbit: None,
            ..SceneConfig::default()
        };
        let mut scene = SceneState::initialize(&config, &CubeGeometry::default()).unwrap();
        let seeded = light_positions(&scene);
        scene.update(2.0).unwrap();
        assert_eq!(light_positions(&scene), seeded);
    }

    // ── invariants ────────────────────────────────────────────────────────

    #[test]
    fn eleventh_light_is_rejected() {
        let mut scene = white_cube();
        for _ in scene.lights().len()..MAX_LIGHTS {
            scene.push_light(PointLight::new(Vec3::ZERO, Vec3::ONE)).unwrap();
        }
        assert_eq!(
            scene.push_light(PointLight::new(Vec3::ZERO, Vec3::ONE)),
            Err(SceneError::TooManyLights { max: MAX_LIGHTS })
        );
        assert_eq!(scene.lights().len(), MAX_LIGHTS);
    }

    #[test]
    fn orbit_of_missing_light_fails_initialization() {
        let config = SceneConfig {
            light_orbit: Some(LightOrbit {
                light: 7,
                ..LightOrbit::default()
            }),
            ..SceneConfig::default()
        };
        let err = SceneState::initialize(&config, &CubeGeometry::default()).unwrap_err();
        assert_eq!(err, SceneError::LightIndexOutOfRange { index: 7, count: 3 });
    }

    #[test]
    fn set_light_rejects_missing_index() {
        let mut scene = white_cube();
        assert!(scene.set_light(3, Vec3::X, Vec3::ONE).is_err());
        scene.set_light(0, Vec3::X, Vec3::Z).unwrap();
        assert_eq!(scene.lights().get(0), Some(&PointLight::new(Vec3::X, Vec3::Z)));
    }

    #[test]
    fn instanced_mode_builds_grid() {
        let config = SceneConfig {
            render_mode: RenderMode::Instanced {
                columns: 4,
                rows: 3,
                spacing: 3.0,
            },
            ..SceneConfig::default()
        };
        let scene = SceneState::initialize(&config, &CubeGeometry::default()).unwrap();
        assert_eq!(scene.instances().len(), 12);
    }
}
