//! Vector math nodes.

use cinder_math::Vec3;

use super::Value;
use crate::sampling::reflect;

/// Operation of a [`Node::VecMath`](super::Node::VecMath) node.
///
/// Inputs are `a`, `b`, `c` (vectors) and `f` (scalar). Missing vector
/// inputs read as zero, a missing `f` reads as one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VecOp {
    Add,
    Subtract,
    Multiply,
    Average,
    /// Scalar result
    Dot,
    Cross,
    Normalize,
    /// Reflect `a` about the normal `b`
    Reflect,
    /// Scalar result
    Length,
    Abs,
    Min,
    Max,
    Floor,
    Ceil,
    Modulo,
    /// Wrap `a` into the range between `c` and `b`
    Wrap,
    Sin,
    Cos,
    Tan,
    /// `a` scaled by `f`
    Scale,
}

impl VecOp {
    pub fn apply(self, a: Vec3, b: Vec3, c: Vec3, f: f32) -> Value {
        let v = match self {
            VecOp::Add => a + b,
            VecOp::Subtract => a - b,
            VecOp::Multiply => a * b,
            VecOp::Average => (a + b) * 0.5,
            VecOp::Dot => return Value::Scalar(a.dot(b)),
            VecOp::Cross => a.cross(b),
            VecOp::Normalize => a.normalize_or_zero(),
            VecOp::Reflect => reflect(a, b),
            VecOp::Length => return Value::Scalar(a.length()),
            VecOp::Abs => a.abs(),
            VecOp::Min => a.min(b),
            VecOp::Max => a.max(b),
            VecOp::Floor => a.floor(),
            VecOp::Ceil => a.ceil(),
            VecOp::Modulo => Vec3::new(a.x % b.x, a.y % b.y, a.z % b.z),
            VecOp::Wrap => Vec3::new(wrap(a.x, b.x, c.x), wrap(a.y, b.y, c.y), wrap(a.z, b.z, c.z)),
            VecOp::Sin => Vec3::new(a.x.sin(), a.y.sin(), a.z.sin()),
            VecOp::Cos => Vec3::new(a.x.cos(), a.y.cos(), a.z.cos()),
            VecOp::Tan => Vec3::new(a.x.tan(), a.y.tan(), a.z.tan()),
            VecOp::Scale => a * f,
        };
        Value::Vector(v)
    }
}

fn wrap(value: f32, max: f32, min: f32) -> f32 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }
    value - range * ((value - min) / range).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec(value: Value) -> Vec3 {
        match value {
            Value::Vector(v) => v,
            other => panic!("expected vector, got {other:?}"),
        }
    }

    fn scalar(value: Value) -> f32 {
        match value {
            Value::Scalar(f) => f,
            other => panic!("expected scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_componentwise() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(vec(VecOp::Add.apply(a, a, Vec3::ZERO, 1.0)), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(vec(VecOp::Subtract.apply(a, a, Vec3::ZERO, 1.0)), Vec3::ZERO);
        assert_eq!(vec(VecOp::Multiply.apply(a, a, Vec3::ZERO, 1.0)), Vec3::new(1.0, 4.0, 9.0));
        assert_eq!(
            vec(VecOp::Abs.apply(Vec3::new(-10.0, 2.0, -3.0), Vec3::ZERO, Vec3::ZERO, 1.0)),
            Vec3::new(10.0, 2.0, 3.0)
        );
        assert_eq!(vec(VecOp::Scale.apply(a, Vec3::ZERO, Vec3::ZERO, 2.0)), a * 2.0);
    }

    #[test]
    fn test_dot_and_length_are_scalar() {
        assert_eq!(scalar(VecOp::Dot.apply(Vec3::Y, Vec3::X, Vec3::ZERO, 1.0)), 0.0);
        assert_eq!(scalar(VecOp::Dot.apply(Vec3::Y, -Vec3::Y, Vec3::ZERO, 1.0)), -1.0);
        assert_eq!(scalar(VecOp::Length.apply(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, Vec3::ZERO, 1.0)), 2.0);
    }

    #[test]
    fn test_cross_normalize_reflect() {
        assert_eq!(vec(VecOp::Cross.apply(Vec3::X, Vec3::Y, Vec3::ZERO, 1.0)), Vec3::Z);

        let n = vec(VecOp::Normalize.apply(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ZERO, 1.0));
        assert!((n.length() - 1.0).abs() < 1e-5);

        let incoming = Vec3::new(1.0, 1.0, 0.0).normalize();
        let reflected = vec(VecOp::Reflect.apply(incoming, -Vec3::Y, Vec3::ZERO, 1.0));
        assert!((reflected - Vec3::new(1.0, -1.0, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_wrap() {
        assert!((wrap(1.25, 1.0, 0.0) - 0.25).abs() < 1e-5);
        assert!((wrap(-0.25, 1.0, 0.0) - 0.75).abs() < 1e-5);
        assert_eq!(wrap(5.0, 2.0, 2.0), 2.0);
    }
}
