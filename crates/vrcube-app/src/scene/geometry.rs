use glam::Vec3;

use crate::error::SceneError;

/// Indexed triangle geometry with one normal and one color per vertex.
///
/// Attributes are stored as separate arrays, matching the non-interleaved
/// vertex buffer layout used on the GPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Checks the invariants every consumer relies on.
    ///
    /// - at least one vertex
    /// - `normals` and `colors` have exactly one entry per vertex
    /// - every index refers to an existing vertex
    /// - indices form whole triangles
    pub fn validate(&self) -> Result<(), SceneError> {
        let vertex_count = self.vertices.len();
        if vertex_count == 0 {
            return Err(SceneError::EmptyGeometry);
        }

        if self.normals.len() != vertex_count || self.colors.len() != vertex_count {
            return Err(SceneError::AttributeLengthMismatch {
                vertices: vertex_count,
                normals: self.normals.len(),
                colors: self.colors.len(),
            });
        }

        if let Some((position, &value)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(SceneError::IndexOutOfRange {
                position,
                value,
                vertex_count,
            });
        }

        if self.indices.len() % 3 != 0 {
            return Err(SceneError::IncompleteTriangle(self.indices.len()));
        }

        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Provider of the static geometry a scene is built from.
pub trait GeometrySource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produces the geometry. Called once, during scene initialization.
    fn build(&self) -> Result<Geometry, SceneError>;
}

/// Geometry supplied directly by the caller, e.g. a mesh loaded elsewhere.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    name: String,
    geometry: Geometry,
}

impl MeshGeometry {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}

impl GeometrySource for MeshGeometry {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self) -> Result<Geometry, SceneError> {
        self.geometry.validate()?;
        Ok(self.geometry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Geometry {
        Geometry {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            colors: vec![Vec3::ONE; 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn valid_triangle_passes() {
        assert_eq!(triangle().validate(), Ok(()));
    }

    #[test]
    fn empty_geometry_is_rejected() {
        assert_eq!(Geometry::default().validate(), Err(SceneError::EmptyGeometry));
    }

    #[test]
    fn out_of_range_index_is_reported_with_position() {
        let mut g = triangle();
        g.indices = vec![0, 1, 2, 2, 1, 3];
        assert_eq!(
            g.validate(),
            Err(SceneError::IndexOutOfRange {
                position: 5,
                value: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn missing_color_is_rejected() {
        let mut g = triangle();
        g.colors.pop();
        assert!(matches!(g.validate(), Err(SceneError::AttributeLengthMismatch { colors: 2, .. })));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let mut g = triangle();
        g.indices.push(0);
        assert_eq!(g.validate(), Err(SceneError::IncompleteTriangle(4)));
    }

    #[test]
    fn mesh_source_validates_before_returning() {
        let mut bad = triangle();
        bad.normals.clear();
        assert!(MeshGeometry::new("bad", bad).build().is_err());
        assert_eq!(MeshGeometry::new("tri", triangle()).build(), Ok(triangle()));
    }
}
