use glam::Vec3;

use crate::error::SceneError;

/// Upper bound on lights, shared with the shader's fixed-size arrays.
pub const MAX_LIGHTS: usize = 10;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl PointLight {
    pub const fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Ordered list of at most [`MAX_LIGHTS`] point lights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSet {
    lights: Vec<PointLight>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three lights every scene starts with: white above, white below and
    /// a dim one at the origin that usually orbits.
    pub fn seeded() -> Self {
        Self {
            lights: vec![
                PointLight::new(Vec3::Y, Vec3::ONE),
                PointLight::new(Vec3::NEG_Y, Vec3::ONE),
                PointLight::new(Vec3::ZERO, Vec3::splat(0.1)),
            ],
        }
    }

    /// Appends a light and returns its index.
    pub fn push(&mut self, light: PointLight) -> Result<usize, SceneError> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(SceneError::TooManyLights { max: MAX_LIGHTS });
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<(), SceneError> {
        let count = self.lights.len();
        let light = self
            .lights
            .get_mut(index)
            .ok_or(SceneError::LightIndexOutOfRange { index, count })?;
        light.position = position;
        Ok(())
    }

    pub fn set_color(&mut self, index: usize, color: Vec3) -> Result<(), SceneError> {
        let count = self.lights.len();
        let light = self
            .lights
            .get_mut(index)
            .ok_or(SceneError::LightIndexOutOfRange { index, count })?;
        light.color = color;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&PointLight> {
        self.lights.get(index)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.lights.iter().map(|l| l.position)
    }

    pub fn colors(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.lights.iter().map(|l| l.color)
    }
}
