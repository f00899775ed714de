use serde::{Deserialize, Serialize};
use std::fmt;

/// A point or direction in scene space. Positions are scene units,
/// rotations are degrees per axis, scales are per-axis multipliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Linear interpolation, `t` in 0..=1
    pub fn lerp(self, to: Vec3, t: f64) -> Vec3 {
        self.add(to.sub(self).scale(t))
    }

    /// Component-wise rounding, as shown in the inspector
    pub fn rounded(self) -> [i64; 3] {
        [
            self.x.round() as i64,
            self.y.round() as i64,
            self.z.round() as i64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Display-only metadata value attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// A node placed in the scene.
///
/// `content` is the caller's render payload. The engine stores and hands
/// it back but never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialNode<C> {
    pub id: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    pub content: C,
    /// Outgoing edges by target id, in declaration order
    #[serde(default)]
    pub connections: Vec<String>,
    /// Insertion-ordered key/value pairs
    #[serde(default)]
    pub metadata: Vec<(String, MetadataValue)>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl<C> SpatialNode<C> {
    pub fn new(id: impl Into<String>, position: Vec3, content: C) -> Self {
        Self {
            id: id.into(),
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            content,
            connections: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn connect(mut self, target: impl Into<String>) -> Self {
        self.connections.push(target.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_lerp() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 12.0);
        assert_eq!(b.sub(a).length(), 13.0);
        assert_eq!(a.lerp(b, 0.5), Vec3::new(1.5, 2.0, 6.0));
    }

    #[test]
    fn test_rounded() {
        assert_eq!(Vec3::new(1.4, -1.6, 2.5).rounded(), [1, -2, 3]);
    }

    #[test]
    fn test_builder_keeps_order() {
        let node = SpatialNode::new("a", Vec3::ZERO, ())
            .connect("b")
            .connect("c")
            .with_meta("zeta", 1.0)
            .with_meta("alpha", "x");
        assert_eq!(node.connections, vec!["b", "c"]);
        assert_eq!(node.metadata[0].0, "zeta");
        assert_eq!(node.metadata[1].0, "alpha");
        assert_eq!(node.scale, Vec3::ONE);
    }
}
