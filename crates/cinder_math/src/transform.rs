// Affine transforms for instances.
//
// A Transform keeps its matrix and inverse together so ray traversal never
// inverts a matrix per ray.

use glam::{Mat3, Mat4, Vec3};

use crate::{Aabb, Ray};

/// Extension trait for Mat4 with the bounds and normal helpers glam lacks.
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }

        let lo = aabb.min();
        let hi = aabb.max();
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];

        let first = self.transform_point3(corners[0]);
        let (min, max) = corners[1..]
            .iter()
            .map(|&c| self.transform_point3(c))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

        Aabb::from_points(min, max)
    }
}

/// One primitive step of an instance transform, as listed by a scene loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(Vec3),
    /// Rotation around X, in degrees.
    RotateX(f32),
    /// Rotation around Y, in degrees.
    RotateY(f32),
    /// Rotation around Z, in degrees.
    RotateZ(f32),
    Scale(Vec3),
    ScaleUniform(f32),
}

/// A 4x4 affine matrix and its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    /// Inverse-transpose of the upper 3x3, for normals.
    normal_matrix: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        normal_matrix: Mat3::IDENTITY,
    };

    /// Build from a matrix. Returns `None` if the matrix is singular.
    pub fn from_matrix(matrix: Mat4) -> Option<Self> {
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = matrix.inverse();
        if !inverse.is_finite() {
            return None;
        }
        Some(Self {
            matrix,
            inverse,
            normal_matrix: Mat3::from_mat4(inverse).transpose(),
        })
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_ops(&[TransformOp::Translate(translation)])
    }

    /// Compose primitive steps into one transform.
    ///
    /// Steps are grouped by kind and always applied as
    /// translate * rotate * scale, whatever order they were listed in.
    /// Steps of the same kind compose in list order. Degenerate scales
    /// (a zero axis) are replaced by identity.
    pub fn from_ops(ops: &[TransformOp]) -> Self {
        let mut translate = Mat4::IDENTITY;
        let mut rotate = Mat4::IDENTITY;
        let mut scale = Mat4::IDENTITY;

        for op in ops {
            match *op {
                TransformOp::Translate(t) => translate *= Mat4::from_translation(t),
                TransformOp::RotateX(deg) => rotate *= Mat4::from_rotation_x(deg.to_radians()),
                TransformOp::RotateY(deg) => rotate *= Mat4::from_rotation_y(deg.to_radians()),
                TransformOp::RotateZ(deg) => rotate *= Mat4::from_rotation_z(deg.to_radians()),
                TransformOp::Scale(s) => scale *= Mat4::from_scale(s),
                TransformOp::ScaleUniform(s) => scale *= Mat4::from_scale(Vec3::splat(s)),
            }
        }

        Self::from_matrix(translate * rotate * scale)
            .or_else(|| Self::from_matrix(translate * rotate))
            .unwrap_or(Self::IDENTITY)
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn inverse(&self) -> Mat4 {
        self.inverse
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Mat4::IDENTITY
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// Object-space normal to world space (not normalized).
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        self.normal_matrix * n
    }

    /// World-space ray into object space.
    ///
    /// The direction is deliberately left unnormalized so hit distances
    /// found in object space are valid in world space.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point3(ray.origin),
            self.inverse.transform_vector3(ray.direction),
        )
    }

    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        self.matrix.transform_aabb(aabb)
    }
}
