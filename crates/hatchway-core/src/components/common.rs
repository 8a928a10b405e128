//! Common types shared by interiors, hatches and the vessel graph.

use serde::{Deserialize, Serialize};

/// Identifies one physical part of a vessel
pub type PartId = u32;
/// Identifies one vessel (a connected assembly of parts)
pub type VesselId = u32;
/// Identifies one interior model instance (registry key)
pub type ModelId = u32;
/// Identifies a named scene object or mesh inside an interior model
pub type ObjectId = u32;
/// Identifies a crew member
pub type CrewId = u32;

/// 3D position vector (vessel frame or model-local, depending on use)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// True when `other` lies within `tolerance` of this point
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}
