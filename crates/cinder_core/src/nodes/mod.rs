//! Shader node graph.
//!
//! Nodes live in a [`NodeStore`] arena and refer to their inputs by
//! [`NodeId`]. Every node is interned: building a node that is
//! structurally identical to one already in the store (same variant, same
//! parameters, same input handles) returns the existing handle instead of
//! allocating. Because inputs are interned first, whole identical subgraphs
//! collapse to one set of nodes no matter how many materials build them.
//!
//! Evaluation is lazy and recursive. Nothing is cached between hits, so
//! evaluation is pure and can run from any number of threads at once.

mod bsdf;
mod color;
mod math;
mod vector;

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use cinder_math::{Color, Vec2, Vec3};

use crate::scene::Material;
use crate::texture::{Texture, TextureId};

pub use bsdf::BsdfSample;
pub use color::{checkerboard, WARNING_DARK, WARNING_LIGHT, WARNING_SCALE};
pub use math::{map_range, MathOp};
pub use vector::VecOp;

/// Handle to a node in a [`NodeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An `f32` node parameter that hashes and compares by bit pattern.
///
/// Two constants are the same node only if they are bit-identical, so
/// `0.0` and `-0.0` stay distinct and a NaN constant still interns.
#[derive(Clone, Copy, Debug)]
pub struct Param(pub f32);

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f32> for Param {
    fn from(v: f32) -> Self {
        Param(v)
    }
}

/// Per-hit quantities a graph can read directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitInput {
    /// Scalar texture coordinate U
    U,
    /// Scalar texture coordinate V
    V,
    /// Vector: shading normal, facing the incoming ray
    Normal,
    /// Vector: world-space hit position
    Position,
    /// Vector: incoming ray direction
    Incoming,
    /// Vector: (u, v, 0)
    Uv,
}

/// A shader graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    // Constants and hit inputs
    Value(Param),
    Vector([Param; 3]),
    Color([Param; 4]),
    Input(HitInput),

    // Scalar converters
    Math {
        a: NodeId,
        b: Option<NodeId>,
        op: MathOp,
    },
    MapRange {
        input: NodeId,
        from_min: NodeId,
        from_max: NodeId,
        to_min: NodeId,
        to_max: NodeId,
    },
    /// Luminance of a color
    Grayscale(NodeId),

    VecMath {
        a: NodeId,
        b: Option<NodeId>,
        c: Option<NodeId>,
        f: Option<NodeId>,
        op: VecOp,
    },

    // Color sources
    Checkerboard {
        a: NodeId,
        b: NodeId,
        scale: NodeId,
    },
    Image(TextureId),
    ColorMix {
        a: NodeId,
        b: NodeId,
        factor: NodeId,
    },
    CombineRgb {
        r: NodeId,
        g: NodeId,
        b: NodeId,
    },

    // BSDFs
    Diffuse {
        color: NodeId,
    },
    Metal {
        color: NodeId,
        roughness: NodeId,
    },
    Glass {
        color: NodeId,
        roughness: NodeId,
        ior: NodeId,
    },
    /// Roughness and IOR fall back to the material's own values
    Plastic {
        color: NodeId,
        roughness: Option<NodeId>,
        ior: Option<NodeId>,
    },
    Emissive {
        color: NodeId,
        strength: NodeId,
    },
    /// Picks `b` with probability `factor`, else `a`
    MixBsdf {
        a: NodeId,
        b: NodeId,
        factor: NodeId,
    },
    /// Fallback for materials without a usable BSDF
    Warning,
}

impl Node {
    pub fn is_bsdf(&self) -> bool {
        matches!(
            self,
            Node::Diffuse { .. }
                | Node::Metal { .. }
                | Node::Glass { .. }
                | Node::Plastic { .. }
                | Node::Emissive { .. }
                | Node::MixBsdf { .. }
                | Node::Warning
        )
    }

    /// Handles of every input this node reads.
    pub fn inputs(&self) -> Vec<NodeId> {
        match *self {
            Node::Value(_) | Node::Vector(_) | Node::Color(_) | Node::Input(_) => Vec::new(),
            Node::Image(_) | Node::Warning => Vec::new(),
            Node::Math { a, b, .. } => std::iter::once(a).chain(b).collect(),
            Node::MapRange {
                input,
                from_min,
                from_max,
                to_min,
                to_max,
            } => vec![input, from_min, from_max, to_min, to_max],
            Node::Grayscale(c) => vec![c],
            Node::VecMath { a, b, c, f, .. } => std::iter::once(a).chain(b).chain(c).chain(f).collect(),
            Node::Checkerboard { a, b, scale } => vec![a, b, scale],
            Node::ColorMix { a, b, factor } | Node::MixBsdf { a, b, factor } => vec![a, b, factor],
            Node::CombineRgb { r, g, b } => vec![r, g, b],
            Node::Diffuse { color } => vec![color],
            Node::Metal { color, roughness } => vec![color, roughness],
            Node::Glass {
                color,
                roughness,
                ior,
            } => vec![color, roughness, ior],
            Node::Plastic {
                color,
                roughness,
                ior,
            } => std::iter::once(color).chain(roughness).chain(ior).collect(),
            Node::Emissive { color, strength } => vec![color, strength],
        }
    }
}

/// Result of evaluating a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vector(Vec3),
    Color(Color),
}

impl Value {
    /// Scalar view. Vectors give their length, colors their luminance.
    pub fn as_scalar(self) -> f32 {
        match self {
            Value::Scalar(f) => f,
            Value::Vector(v) => v.length(),
            Value::Color(c) => c.luminance(),
        }
    }

    /// Vector view. Scalars splat, colors map RGB to XYZ.
    pub fn as_vector(self) -> Vec3 {
        match self {
            Value::Scalar(f) => Vec3::splat(f),
            Value::Vector(v) => v,
            Value::Color(c) => c.to_vec3(),
        }
    }

    /// Color view. Scalars become opaque gray, vectors map XYZ to RGB.
    pub fn as_color(self) -> Color {
        match self {
            Value::Scalar(f) => Color::gray(f),
            Value::Vector(v) => Color::from_vec3(v),
            Value::Color(c) => c,
        }
    }
}

/// Everything a graph may read about the surface point being shaded.
#[derive(Clone, Copy)]
pub struct HitContext<'a> {
    pub position: Vec3,
    /// Shading normal, unit length, flipped to face against `incoming`
    pub normal: Vec3,
    pub uv: Vec2,
    /// Unit direction of the ray that hit the surface
    pub incoming: Vec3,
    /// True when the ray hit the outside of the surface
    pub front_face: bool,
    pub material: &'a Material,
    pub textures: &'a [Arc<Texture>],
}

/// Arena of interned shader nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    lookup: HashMap<Node, NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Return the handle of an identical node, or store this one.
    pub fn intern(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.lookup.get(&node) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.lookup.insert(node, id);
        id
    }

    pub fn value(&mut self, v: f32) -> NodeId {
        self.intern(Node::Value(Param(v)))
    }

    pub fn vector(&mut self, v: Vec3) -> NodeId {
        self.intern(Node::Vector([Param(v.x), Param(v.y), Param(v.z)]))
    }

    pub fn color(&mut self, c: Color) -> NodeId {
        self.intern(Node::Color([Param(c.r), Param(c.g), Param(c.b), Param(c.a)]))
    }

    pub fn input(&mut self, input: HitInput) -> NodeId {
        self.intern(Node::Input(input))
    }

    pub fn math(&mut self, a: NodeId, b: Option<NodeId>, op: MathOp) -> NodeId {
        self.intern(Node::Math { a, b, op })
    }

    pub fn map_range(
        &mut self,
        input: NodeId,
        from_min: NodeId,
        from_max: NodeId,
        to_min: NodeId,
        to_max: NodeId,
    ) -> NodeId {
        self.intern(Node::MapRange {
            input,
            from_min,
            from_max,
            to_min,
            to_max,
        })
    }

    pub fn grayscale(&mut self, color: NodeId) -> NodeId {
        self.intern(Node::Grayscale(color))
    }

    pub fn vec_math(
        &mut self,
        a: NodeId,
        b: Option<NodeId>,
        c: Option<NodeId>,
        f: Option<NodeId>,
        op: VecOp,
    ) -> NodeId {
        self.intern(Node::VecMath { a, b, c, f, op })
    }

    pub fn checkerboard(&mut self, a: NodeId, b: NodeId, scale: NodeId) -> NodeId {
        self.intern(Node::Checkerboard { a, b, scale })
    }

    pub fn image(&mut self, texture: TextureId) -> NodeId {
        self.intern(Node::Image(texture))
    }

    pub fn color_mix(&mut self, a: NodeId, b: NodeId, factor: NodeId) -> NodeId {
        self.intern(Node::ColorMix { a, b, factor })
    }

    pub fn combine_rgb(&mut self, r: NodeId, g: NodeId, b: NodeId) -> NodeId {
        self.intern(Node::CombineRgb { r, g, b })
    }

    pub fn diffuse(&mut self, color: NodeId) -> NodeId {
        self.intern(Node::Diffuse { color })
    }

    pub fn metal(&mut self, color: NodeId, roughness: NodeId) -> NodeId {
        self.intern(Node::Metal { color, roughness })
    }

    pub fn glass(&mut self, color: NodeId, roughness: NodeId, ior: NodeId) -> NodeId {
        self.intern(Node::Glass {
            color,
            roughness,
            ior,
        })
    }

    pub fn plastic(&mut self, color: NodeId, roughness: Option<NodeId>, ior: Option<NodeId>) -> NodeId {
        self.intern(Node::Plastic {
            color,
            roughness,
            ior,
        })
    }

    pub fn emissive(&mut self, color: NodeId, strength: NodeId) -> NodeId {
        self.intern(Node::Emissive { color, strength })
    }

    pub fn mix_bsdf(&mut self, a: NodeId, b: NodeId, factor: NodeId) -> NodeId {
        self.intern(Node::MixBsdf { a, b, factor })
    }

    pub fn warning(&mut self) -> NodeId {
        self.intern(Node::Warning)
    }

    /// Evaluate a node at a hit.
    ///
    /// BSDF nodes evaluate to their diffuse response color. A dangling
    /// handle evaluates to zero; `Scene::validate` rules those out.
    pub fn eval(&self, id: NodeId, hit: &HitContext) -> Value {
        let Some(node) = self.get(id) else {
            return Value::Scalar(0.0);
        };

        match *node {
            Node::Value(Param(v)) => Value::Scalar(v),
            Node::Vector([x, y, z]) => Value::Vector(Vec3::new(x.0, y.0, z.0)),
            Node::Color([r, g, b, a]) => Value::Color(Color::rgba(r.0, g.0, b.0, a.0)),
            Node::Input(input) => match input {
                HitInput::U => Value::Scalar(hit.uv.x),
                HitInput::V => Value::Scalar(hit.uv.y),
                HitInput::Normal => Value::Vector(hit.normal),
                HitInput::Position => Value::Vector(hit.position),
                HitInput::Incoming => Value::Vector(hit.incoming),
                HitInput::Uv => Value::Vector(hit.uv.extend(0.0)),
            },
            Node::Math { a, b, op } => {
                let a = self.scalar(a, hit);
                let b = b.map(|b| self.scalar(b, hit));
                Value::Scalar(op.apply(a, b))
            }
            Node::MapRange {
                input,
                from_min,
                from_max,
                to_min,
                to_max,
            } => Value::Scalar(map_range(
                self.scalar(input, hit),
                self.scalar(from_min, hit),
                self.scalar(from_max, hit),
                self.scalar(to_min, hit),
                self.scalar(to_max, hit),
            )),
            Node::Grayscale(c) => Value::Scalar(self.color_of(c, hit).luminance()),
            Node::VecMath { a, b, c, f, op } => {
                let a = self.vector_of(a, hit);
                let b = b.map_or(Vec3::ZERO, |b| self.vector_of(b, hit));
                let c = c.map_or(Vec3::ZERO, |c| self.vector_of(c, hit));
                let f = f.map_or(1.0, |f| self.scalar(f, hit));
                op.apply(a, b, c, f)
            }
            Node::Checkerboard { a, b, scale } => {
                let pick_b = checkerboard(hit.uv, self.scalar(scale, hit));
                Value::Color(self.color_of(if pick_b { b } else { a }, hit))
            }
            Node::Image(texture) => Value::Color(
                hit.textures
                    .get(texture.index())
                    .map_or(Color::BLACK, |t| t.sample(hit.uv.x, hit.uv.y)),
            ),
            Node::ColorMix { a, b, factor } => {
                let t = self.scalar(factor, hit).clamp(0.0, 1.0);
                Value::Color(self.color_of(a, hit).lerp(self.color_of(b, hit), t))
            }
            Node::CombineRgb { r, g, b } => Value::Color(Color::new(
                self.scalar(r, hit),
                self.scalar(g, hit),
                self.scalar(b, hit),
            )),
            _ => Value::Color(self.albedo(id, hit)),
        }
    }

    #[inline]
    pub fn scalar(&self, id: NodeId, hit: &HitContext) -> f32 {
        self.eval(id, hit).as_scalar()
    }

    #[inline]
    pub fn vector_of(&self, id: NodeId, hit: &HitContext) -> Vec3 {
        self.eval(id, hit).as_vector()
    }

    #[inline]
    pub fn color_of(&self, id: NodeId, hit: &HitContext) -> Color {
        self.eval(id, hit).as_color()
    }
}
