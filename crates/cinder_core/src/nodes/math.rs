//! Scalar math nodes.

/// Operation of a [`Node::Math`](super::Node::Math) node.
///
/// Unary operations ignore the second input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    /// Logarithm of `a` in base `b`, base 10 without a second input
    Log,
    SquareRoot,
    InvSquareRoot,
    Absolute,
    Min,
    Max,
    LessThan,
    GreaterThan,
    Sign,
    /// 1 when `a` and `b` are equal within a few ulps, else 0
    Compare,
    Round,
    Floor,
    Ceil,
    Truncate,
    Fraction,
    Modulo,
    Sine,
    Cosine,
    Tangent,
    ToRadians,
    ToDegrees,
}

const COMPARE_EPSILON: f32 = 4.0 * f32::EPSILON;

impl MathOp {
    /// Apply the operation. `b` is `None` when the node has no second input.
    pub fn apply(self, a: f32, b: Option<f32>) -> f32 {
        let rhs = b.unwrap_or(0.0);
        match self {
            MathOp::Add => a + rhs,
            MathOp::Subtract => a - rhs,
            MathOp::Multiply => a * rhs,
            MathOp::Divide => a / rhs,
            MathOp::Power => a.powf(rhs),
            MathOp::Log => match b {
                Some(base) => a.log(base),
                None => a.log10(),
            },
            MathOp::SquareRoot => a.sqrt(),
            MathOp::InvSquareRoot => 1.0 / a.sqrt(),
            MathOp::Absolute => a.abs(),
            MathOp::Min => a.min(rhs),
            MathOp::Max => a.max(rhs),
            MathOp::LessThan => bool_value(a < rhs),
            MathOp::GreaterThan => bool_value(a > rhs),
            MathOp::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            MathOp::Compare => bool_value((a - rhs).abs() <= COMPARE_EPSILON),
            MathOp::Round => a.round(),
            MathOp::Floor => a.floor(),
            MathOp::Ceil => a.ceil(),
            MathOp::Truncate => a.trunc(),
            MathOp::Fraction => a - a.floor(),
            MathOp::Modulo => a % rhs,
            MathOp::Sine => a.sin(),
            MathOp::Cosine => a.cos(),
            MathOp::Tangent => a.tan(),
            MathOp::ToRadians => a.to_radians(),
            MathOp::ToDegrees => a.to_degrees(),
        }
    }
}

#[inline]
fn bool_value(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Linearly remap `value` from one range to another, clamped to the target.
///
/// Either range may be reversed. An empty source range maps to `to_min`.
pub fn map_range(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span == 0.0 {
        return to_min;
    }
    let mapped = to_min + (value - from_min) / span * (to_max - to_min);
    mapped.clamp(to_min.min(to_max), to_min.max(to_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(MathOp::Add.apply(-128.0, Some(128.0)), 0.0);
        assert_eq!(MathOp::Subtract.apply(-128.0, Some(128.0)), -256.0);
        assert_eq!(MathOp::Multiply.apply(128.0, Some(128.0)), 16384.0);
        assert_eq!(MathOp::Divide.apply(-128.0, Some(1.0)), -128.0);
        assert_eq!(MathOp::Power.apply(2.0, Some(16.0)), 65536.0);
        assert_eq!(MathOp::Power.apply(128.0, Some(0.0)), 1.0);
    }

    #[test]
    fn test_log_defaults_to_base_ten() {
        for (input, expected) in [(1.0, 0.0), (10.0, 1.0), (100.0, 2.0), (10000.0, 4.0)] {
            assert!(close(MathOp::Log.apply(input, None), expected));
        }
        assert!(close(MathOp::Log.apply(8.0, Some(2.0)), 3.0));
    }

    #[test]
    fn test_roots_and_sign() {
        assert_eq!(MathOp::SquareRoot.apply(9.0, None), 3.0);
        assert!(close(MathOp::InvSquareRoot.apply(9.0, None), 1.0 / 3.0));
        assert_eq!(MathOp::Sign.apply(-5.0, None), -1.0);
        assert_eq!(MathOp::Sign.apply(0.0, None), 0.0);
        assert_eq!(MathOp::Absolute.apply(-128.0, None), 128.0);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(MathOp::LessThan.apply(10.0, Some(10.0)), 0.0);
        assert_eq!(MathOp::LessThan.apply(5.0, Some(10.0)), 1.0);
        assert_eq!(MathOp::GreaterThan.apply(15.0, Some(10.0)), 1.0);
        assert_eq!(MathOp::Min.apply(128.0, Some(42.0)), 42.0);
        assert_eq!(MathOp::Max.apply(-128.0, Some(128.0)), 128.0);

        assert_eq!(MathOp::Compare.apply(1.0, Some(1.0000005)), 1.0);
        assert_eq!(MathOp::Compare.apply(1.0, Some(1.0000006)), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(MathOp::Round.apply(0.4, None), 0.0);
        assert_eq!(MathOp::Round.apply(0.5, None), 1.0);
        assert_eq!(MathOp::Floor.apply(4.9, None), 4.0);
        assert_eq!(MathOp::Ceil.apply(4.1, None), 5.0);
        assert_eq!(MathOp::Truncate.apply(9.7, None), 9.0);
        assert!(close(MathOp::Fraction.apply(6.01, None), 0.01));
        assert!(close(MathOp::Modulo.apply(4.0, Some(3.0)), 1.0));
        assert!(close(MathOp::Modulo.apply(4.0, Some(5.0)), 4.0));
    }

    #[test]
    fn test_trig() {
        assert!(close(MathOp::Sine.apply(PI, None), 0.0));
        assert!(close(MathOp::Cosine.apply(PI, None), -1.0));
        assert!(close(MathOp::ToRadians.apply(180.0, None), PI));
        assert!(close(MathOp::ToDegrees.apply(PI, None), 180.0));
    }

    #[test]
    fn test_map_range_clamps() {
        assert_eq!(map_range(0.5, 0.0, 1.0, 0.0, 30.0), 15.0);
        assert_eq!(map_range(0.5, 0.0, 1.0, -15.0, 15.0), 0.0);
        assert_eq!(map_range(-1.0, 0.0, 1.0, 0.0, 1.0), 0.0);
        assert_eq!(map_range(2.0, 0.0, 1.0, 0.0, 1.0), 1.0);
        assert_eq!(map_range(0.5, 0.0, 1.0, 0.0, -5.0), -2.5);
        assert_eq!(map_range(1.0, 0.0, 1.0, 0.0, -5.0), -5.0);
        assert_eq!(map_range(-2.5, 0.0, -5.0, 0.0, 1.0), 0.5);
        assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }
}
