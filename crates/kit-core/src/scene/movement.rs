//! Translation and rotation of parts and assemblies
//!
//! A move is expressed as a delta in the node's parent frame, converted to a
//! world delta `W = P ∘ D ∘ P⁻¹`, prepended to the cached world transform and,
//! for assemblies, propagated to every descendant.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;
use crate::host::GeometryHost;
use crate::transform::Transform;

use super::{NodeData, NodeId, Scene, SceneError};

/// Point a rotation turns about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pivot {
    /// The node's own origin
    Origin,
    /// Center of the node's bounding box
    #[default]
    BoundsCenter,
}

impl<H: GeometryHost> Scene<H> {
    /// World transform of the node's parent, identity at top level
    pub(crate) fn parent_world(&self, id: NodeId) -> Result<Transform, SceneError> {
        match self.node(id)?.parent {
            Some(parent) => Ok(self.node(parent)?.world_transform),
            None => Ok(Transform::IDENTITY),
        }
    }

    /// Apply a world-space delta to a node: update its cache, move its host
    /// entity, and propagate to descendants.
    pub(crate) fn commit_world_delta(&mut self, id: NodeId, delta: &Transform) -> Result<(), SceneError> {
        let parent_world = self.parent_world(id)?;
        let node = self.live_node_mut(id)?;
        node.world_transform = *delta * node.world_transform;
        let entity = node.entity();
        let is_assembly = matches!(node.data, NodeData::Assembly(_));

        // host entities are positioned relative to their group
        let local_delta = parent_world.inverse() * *delta * parent_world;
        self.host.apply_transform(entity, &local_delta)?;
        if is_assembly {
            self.propagate(id, delta)?;
        }
        Ok(())
    }

    /// Translate along the parent's axes
    pub fn translate(&mut self, id: NodeId, offset: DVec3) -> Result<(), SceneError> {
        let parent_world = self.parent_world(id)?;
        let delta = parent_world * Transform::from_translation(offset) * parent_world.inverse();
        self.commit_world_delta(id, &delta)?;
        tracing::debug!("{} translated: {:?}", self.live_node(id)?.label(), offset.to_array());
        Ok(())
    }

    /// Translate by a world-space vector, whatever the parent's frame
    pub fn translate_world(&mut self, id: NodeId, offset: DVec3) -> Result<(), SceneError> {
        self.commit_world_delta(id, &Transform::from_translation(offset))?;
        tracing::debug!("{} translated in world: {:?}", self.live_node(id)?.label(), offset.to_array());
        Ok(())
    }

    /// Move so the node's origin sits at `position` in its parent frame
    pub fn origin(&mut self, id: NodeId, position: DVec3) -> Result<(), SceneError> {
        let current = self.host.transform(self.live_node(id)?.entity())?.origin();
        self.translate(id, position - current)
    }

    pub fn x(&mut self, id: NodeId, distance: f64) -> Result<(), SceneError> {
        self.translate(id, DVec3::new(distance, 0.0, 0.0))
    }

    pub fn y(&mut self, id: NodeId, distance: f64) -> Result<(), SceneError> {
        self.translate(id, DVec3::new(0.0, distance, 0.0))
    }

    pub fn z(&mut self, id: NodeId, distance: f64) -> Result<(), SceneError> {
        self.translate(id, DVec3::new(0.0, 0.0, distance))
    }

    /// World position of a pivot
    pub(crate) fn pivot_point(&self, id: NodeId, pivot: Pivot) -> Result<DVec3, SceneError> {
        let node = self.live_node(id)?;
        match pivot {
            Pivot::Origin => Ok(node.world_transform.origin()),
            Pivot::BoundsCenter => Ok(self.host.bounds_center(node.entity())?),
        }
    }

    /// Rotate by `degrees` about the parent's X, then Y, then Z axis.
    ///
    /// The pivot is re-evaluated before each of the three turns; zero angles
    /// are skipped.
    pub fn rotate(&mut self, id: NodeId, degrees: [f64; 3], pivot: Pivot) -> Result<(), SceneError> {
        let parent_world = self.parent_world(id)?;
        for (index, angle) in degrees.into_iter().enumerate() {
            if angle == 0.0 {
                continue;
            }
            let axis = parent_world.axis(index);
            let point = self.pivot_point(id, pivot)?;
            tracing::debug!("Rotating around point: {:?}", point.to_array());
            self.rotate_about(id, point, axis, angle)?;
        }
        tracing::debug!("{} rotated: {:?}", self.live_node(id)?.label(), degrees);
        Ok(())
    }

    /// Rotate by `degrees` about a world-space `axis` through world `point`
    pub fn rotate_about(&mut self, id: NodeId, point: DVec3, axis: DVec3, degrees: f64) -> Result<(), SceneError> {
        if axis.length() < EPSILON {
            return Err(SceneError::ZeroAxis);
        }
        let delta = Transform::rotation(point, axis, degrees.to_radians());
        self.commit_world_delta(id, &delta)
    }
}
