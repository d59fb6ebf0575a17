//! Part definitions as supplied by a catalog

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::QUALIFIED_NAME_SEPARATOR;
use crate::transform::Transform;

/// Shared, immutable handle to a loaded definition
pub type DefinitionHandle = Arc<PartDefinition>;

/// Reference to a definition by catalog and part name, resolved lazily
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartRef {
    pub catalog: String,
    pub name: String,
}

impl PartRef {
    pub fn new(catalog: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            name: name.into(),
        }
    }

    /// A descriptor is usable only when both names are present
    pub fn is_well_formed(&self) -> bool {
        !self.catalog.trim().is_empty() && !self.name.trim().is_empty()
    }

    pub fn qualified_name(&self) -> String {
        format!("{}{}{}", self.catalog, QUALIFIED_NAME_SEPARATOR, self.name)
    }
}

impl fmt::Display for PartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.catalog, QUALIFIED_NAME_SEPARATOR, self.name)
    }
}

/// Axis-aligned bounds in the definition's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: DVec3::ZERO,
            max: DVec3::ZERO,
        }
    }
}

impl Bounds {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounds spanning a list of points; `None` for an empty list
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// The eight corners
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }

    /// World-aligned bounds of these bounds after `transform`
    pub fn transformed(&self, transform: &Transform) -> Bounds {
        // eight corners always yield Some
        Self::from_points(self.corners().map(|c| transform.apply_point(c))).unwrap_or(*self)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// The designated edge of an interface component nested in a definition.
///
/// `start` and `end` are in the interface component's own frame; `placement`
/// positions that component inside the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceEdge {
    #[serde(default)]
    pub placement: Transform,
    pub start: DVec3,
    pub end: DVec3,
}

impl InterfaceEdge {
    pub fn new(placement: Transform, start: DVec3, end: DVec3) -> Self {
        Self {
            placement,
            start,
            end,
        }
    }

    /// Interface of `height` standing on `origin`, pointing along `normal`
    /// (definition frame). The placement's Z axis follows the normal so that
    /// fasteners stack outward.
    pub fn pointing(origin: DVec3, normal: DVec3, height: f64) -> Self {
        let z = normal.normalize();
        let x = z.any_orthonormal_vector();
        let y = z.cross(x);
        Self {
            placement: Transform::from_axes(x, y, z, origin),
            start: DVec3::ZERO,
            end: DVec3::new(0.0, 0.0, height),
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).length()
    }
}

/// A reusable part definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub catalog: String,
    pub name: String,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub interfaces: Vec<InterfaceEdge>,
}

impl PartDefinition {
    pub fn new(catalog: impl Into<String>, name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            catalog: catalog.into(),
            name: name.into(),
            bounds,
            interfaces: Vec::new(),
        }
    }

    pub fn with_interface(mut self, edge: InterfaceEdge) -> Self {
        self.interfaces.push(edge);
        self
    }

    pub fn part_ref(&self) -> PartRef {
        PartRef::new(self.catalog.clone(), self.name.clone())
    }

    /// `"<catalog>::<name>"`
    pub fn qualified_name(&self) -> String {
        self.part_ref().qualified_name()
    }

    pub fn into_handle(self) -> DefinitionHandle {
        Arc::new(self)
    }
}
