//! Indexed triangle mesh geometry.
//!
//! Vertex, normal and UV buffers are shared by index between polygons, the
//! way mesh importers hand them over. Each polygon carries a material slot
//! that resolves through the mesh's own material table, or through an
//! instance's override table when one is bound.

use cinder_math::{Aabb, Vec2, Vec3};

use crate::scene::MaterialId;

/// One triangle of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polygon {
    /// Indices into `Mesh::positions`
    pub vertex: [u32; 3],
    /// Indices into `Mesh::normals`, absent for flat-shaded faces
    pub normal: Option<[u32; 3]>,
    /// Indices into `Mesh::uvs`
    pub uv: Option<[u32; 3]>,
    /// Material slot, see [`Mesh::materials`]
    pub material: u32,
}

impl Polygon {
    /// Flat polygon sharing the same index for every buffer it has.
    pub fn new(vertex: [u32; 3], material: u32) -> Self {
        Self {
            vertex,
            normal: None,
            uv: None,
            material,
        }
    }
}

/// A triangle mesh with shared indexed buffers.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Mesh name, used in logs
    pub name: String,

    /// Vertex positions
    pub positions: Vec<Vec3>,

    /// Vertex normals, indexed by `Polygon::normal`
    pub normals: Vec<Vec3>,

    /// Texture coordinates, indexed by `Polygon::uv`
    pub uvs: Vec<Vec2>,

    /// Triangles
    pub polygons: Vec<Polygon>,

    /// Material table for polygon slots
    pub materials: Vec<MaterialId>,
}

impl Mesh {
    /// Create a mesh from positions and a flat triangle index list.
    ///
    /// Every polygon uses material slot 0. Trailing indices that do not
    /// make up a full triangle are dropped.
    pub fn from_triangles(name: impl Into<String>, positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let polygons = indices
            .chunks_exact(3)
            .map(|c| Polygon::new([c[0], c[1], c[2]], 0))
            .collect();
        Self::new(name, positions, polygons)
    }

    /// Create a mesh from positions and polygons.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: Vec::new(),
            uvs: Vec::new(),
            polygons,
            materials: Vec::new(),
        }
    }

    /// Set the material table.
    pub fn with_materials(mut self, materials: Vec<MaterialId>) -> Self {
        self.materials = materials;
        self
    }

    /// Set per-vertex UVs, indexed the same way as positions.
    pub fn with_vertex_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        for polygon in &mut self.polygons {
            polygon.uv = Some(polygon.vertex);
        }
        self
    }

    /// Axis-aligned bounding box of the current positions.
    pub fn bounds(&self) -> Aabb {
        if self.positions.is_empty() {
            return Aabb::empty();
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for pos in &self.positions {
            min = min.min(*pos);
            max = max.max(*pos);
        }

        Aabb::from_points(min, max)
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Replaces any existing normals and points every polygon's normal
    /// indices at its vertex indices. Counter-clockwise winding faces the
    /// normal toward the viewer.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for polygon in &self.polygons {
            let [i0, i1, i2] = polygon.vertex.map(|i| i as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y; // Default up normal for degenerate cases
            }
        }

        self.normals = normals;
        for polygon in &mut self.polygons {
            polygon.normal = Some(polygon.vertex);
        }
    }

    /// Corner positions of a polygon.
    #[inline]
    pub fn triangle(&self, polygon: &Polygon) -> [Vec3; 3] {
        polygon.vertex.map(|i| self.positions[i as usize])
    }

    /// Bounding box of one polygon, used to build the mesh BVH.
    pub fn polygon_bounds(&self, polygon: &Polygon) -> Aabb {
        let [a, b, c] = self.triangle(polygon);
        Aabb::from_points(a.min(b).min(c), a.max(b).max(c))
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.polygons.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        Mesh::from_triangles("quad", positions, &[0, 1, 2, 1, 3, 2])
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.normals.is_empty());
        assert!(mesh.polygons.iter().all(|p| p.material == 0));
    }

    #[test]
    fn test_partial_triangle_dropped() {
        let mesh = Mesh::from_triangles("bad", vec![Vec3::ZERO; 3], &[0, 1, 2, 0]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_compute_normals_ccw_faces_plus_z() {
        let mut mesh = quad();
        mesh.compute_normals();

        assert_eq!(mesh.normals.len(), 4);
        for normal in &mesh.normals {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
        assert_eq!(mesh.polygons[1].normal, Some([1, 3, 2]));
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::from_triangles("tri", positions, &[0, 1, 2]);

        assert_eq!(mesh.bounds().min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds().max(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_bounds_follow_positions() {
        let mut mesh = quad();
        mesh.positions[3] = Vec3::new(3.0, 1.0, 0.0);
        assert_eq!(mesh.bounds().x.max, 3.0);
    }

    #[test]
    fn test_default_mesh_is_empty() {
        let mesh = Mesh::default();
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_empty());
    }

    #[test]
    fn test_polygon_bounds() {
        let mesh = quad();
        let b = mesh.polygon_bounds(&mesh.polygons[1]);
        assert_eq!(b.x.max, 1.0);
        assert_eq!(b.y.min, 0.0);
        // Flat in Z, padded
        assert!(b.z.size() > 0.0);
    }
}
