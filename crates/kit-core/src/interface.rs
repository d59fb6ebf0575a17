//! Connection interfaces read from part definitions

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::definition::InterfaceEdge;
use crate::precision::{snap_vec, vec_approx_eq};
use crate::scene::NodeId;
use crate::transform::Transform;

/// Points at one interface of one part instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceRef {
    pub part: NodeId,
    pub index: usize,
}

/// A directional attachment point on a part.
///
/// `origin` and `normal` are in the definition's local frame and snapped to
/// the crate precision when read. `attached_to` is the only field that ever
/// changes, and only from `None` to `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub origin: DVec3,
    pub normal: DVec3,
    /// Edge length, the distance fasteners are stacked out from the placement
    pub height: f64,
    /// Placement of the interface component inside the definition
    pub placement: Transform,
    pub attached_to: Option<InterfaceRef>,
}

impl Interface {
    pub fn from_edge(edge: &InterfaceEdge) -> Self {
        let direction = (edge.end - edge.start).normalize_or_zero();
        Self {
            origin: snap_vec(edge.placement.apply_point(edge.start)),
            normal: snap_vec(edge.placement.apply_vector(direction)),
            height: edge.length(),
            placement: edge.placement,
            attached_to: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }

    /// Origin in world space for a part placed at `world`
    pub fn world_origin(&self, world: &Transform) -> DVec3 {
        snap_vec(world.apply_point(self.origin))
    }

    /// Normal in world space for a part placed at `world`
    pub fn world_normal(&self, world: &Transform) -> DVec3 {
        snap_vec(world.apply_vector(self.normal))
    }

    /// Whether this interface, on a part at `world`, faces `other` on a part
    /// at `other_world`: opposite normals and coincident origins
    pub fn mates_with(&self, world: &Transform, other: &Interface, other_world: &Transform) -> bool {
        vec_approx_eq(self.world_normal(world), -other.world_normal(other_world))
            && vec_approx_eq(self.world_origin(world), other.world_origin(other_world))
    }
}
