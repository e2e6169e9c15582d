use glam::Vec3;

use crate::config::ColorScheme;
use crate::error::SceneError;

use super::geometry::{Geometry, GeometrySource};

const CORNERS: [Vec3; 8] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, -1.0),
];

/// Outward normal of each face, in face order.
const FACE_NORMALS: [Vec3; 6] = [
    Vec3::Z,
    Vec3::X,
    Vec3::Y,
    Vec3::NEG_X,
    Vec3::NEG_Y,
    Vec3::NEG_Z,
];

const PALETTE: [Vec3; 8] = [
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(0.5, 0.5, 1.0),
    Vec3::new(0.5, 0.6, 0.5),
    Vec3::new(0.5, 0.75, 1.0),
    Vec3::new(1.0, 0.6, 0.5),
    Vec3::new(1.0, 0.5, 1.0),
    Vec3::new(1.0, 0.6, 0.5),
    Vec3::new(1.0, 0.6, 1.0),
];

/// Corner indices of each face, counter-clockwise seen from outside.
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // +Z
    [0, 3, 4, 5], // +X
    [0, 5, 6, 1], // +Y
    [1, 6, 7, 2], // -X
    [7, 4, 3, 2], // -Y
    [4, 7, 6, 5], // -Z
];

/// Axis-aligned cube spanning `[-1, 1]` on every axis.
///
/// Corners are duplicated per face so each face carries its own normal:
/// 24 vertices and 36 indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubeGeometry {
    scheme: ColorScheme,
}

impl CubeGeometry {
    pub const VERTEX_COUNT: usize = 24;
    pub const INDEX_COUNT: usize = 36;

    pub fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    fn color(&self, face: usize, corner: usize) -> Vec3 {
        match self.scheme {
            ColorScheme::Corner => PALETTE[corner],
            ColorScheme::Face => PALETTE[face],
            ColorScheme::Uniform => Vec3::ONE,
        }
    }
}

impl GeometrySource for CubeGeometry {
    fn name(&self) -> &str {
        match self.scheme {
            ColorScheme::Corner => "cube (corner colors)",
            ColorScheme::Face => "cube (face colors)",
            ColorScheme::Uniform => "cube (white)",
        }
    }

    fn build(&self) -> Result<Geometry, SceneError> {
        let mut g = Geometry {
            vertices: Vec::with_capacity(Self::VERTEX_COUNT),
            normals: Vec::with_capacity(Self::VERTEX_COUNT),
            colors: Vec::with_capacity(Self::VERTEX_COUNT),
            indices: Vec::with_capacity(Self::INDEX_COUNT),
        };

        for (face, corners) in FACES.iter().enumerate() {
            let base = g.vertices.len() as u32;
            for &corner in corners {
                g.vertices.push(CORNERS[corner]);
                g.normals.push(FACE_NORMALS[face]);
                g.colors.push(self.color(face, corner));
            }
            g.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        g.validate()?;
        Ok(g)
    }
}
