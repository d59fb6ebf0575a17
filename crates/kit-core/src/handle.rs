//! Chainable access to one node

use glam::DVec3;

use crate::cell::Cell;
use crate::host::GeometryHost;
use crate::scene::{AppliedRotation, Direction, Face, NodeId, Pivot, Scene, SceneError};

/// Mutable handle on one node. Every step returns the handle so calls chain:
/// `scene.at(id).rotate([90.0, 0.0, 0.0])?.translate([0.0, 4.0, 0.0])?`.
pub struct NodeMut<'a, H: GeometryHost> {
    scene: &'a mut Scene<H>,
    id: NodeId,
}

impl<H: GeometryHost> Scene<H> {
    pub fn at(&mut self, id: NodeId) -> NodeMut<'_, H> {
        NodeMut { scene: self, id }
    }
}

impl<'a, H: GeometryHost> NodeMut<'a, H> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn translate(self, offset: impl Into<DVec3>) -> Result<Self, SceneError> {
        self.scene.translate(self.id, offset.into())?;
        Ok(self)
    }

    pub fn origin(self, position: impl Into<DVec3>) -> Result<Self, SceneError> {
        self.scene.origin(self.id, position.into())?;
        Ok(self)
    }

    pub fn x(self, distance: f64) -> Result<Self, SceneError> {
        self.scene.x(self.id, distance)?;
        Ok(self)
    }

    pub fn y(self, distance: f64) -> Result<Self, SceneError> {
        self.scene.y(self.id, distance)?;
        Ok(self)
    }

    pub fn z(self, distance: f64) -> Result<Self, SceneError> {
        self.scene.z(self.id, distance)?;
        Ok(self)
    }

    /// Rotate about the node's origin
    pub fn rotate(self, degrees: [f64; 3]) -> Result<Self, SceneError> {
        self.scene.rotate(self.id, degrees, Pivot::Origin)?;
        Ok(self)
    }

    pub fn rotate_around(self, degrees: [f64; 3], pivot: Pivot) -> Result<Self, SceneError> {
        self.scene.rotate(self.id, degrees, pivot)?;
        Ok(self)
    }

    pub fn orient(self, requests: &[(Face, Direction)]) -> Result<Self, SceneError> {
        self.scene.orient(self.id, requests)?;
        Ok(self)
    }

    /// Orient and hand back the rotations that were applied
    pub fn orient_applied(self, requests: &[(Face, Direction)]) -> Result<(Self, Vec<AppliedRotation>), SceneError> {
        let applied = self.scene.orient(self.id, requests)?;
        Ok((self, applied))
    }

    pub fn occupy(self, target: &Cell) -> Result<Self, SceneError> {
        self.scene.occupy(self.id, target)?;
        Ok(self)
    }

    pub fn show(self) -> Self {
        self.scene.show(self.id);
        self
    }

    pub fn hide(self) -> Self {
        self.scene.hide(self.id);
        self
    }

    pub fn layer(self, layer: &str) -> Result<Self, SceneError> {
        self.scene.set_layer(self.id, layer)?;
        Ok(self)
    }

    /// Give the scene back
    pub fn done(self) -> &'a mut Scene<H> {
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSet, MemoryCatalog};
    use crate::definition::{Bounds, PartDefinition};
    use crate::precision::vec_approx_eq;

    #[test]
    fn test_chained_moves() {
        let angle = PartDefinition::new("", "angle-6", Bounds::new(DVec3::ZERO, DVec3::new(6.0, 1.0, 1.0)));
        let mut scene = Scene::in_memory(CatalogSet::new().with(MemoryCatalog::new("Contraptor").with(angle)));
        let id = scene.new_part("Contraptor", "angle-6").unwrap();
        scene
            .at(id)
            .rotate([90.0, 0.0, 0.0])
            .unwrap()
            .translate([0.0, 4.0, 0.0])
            .unwrap()
            .z(1.0)
            .unwrap()
            .hide();
        let world = scene.world_transform(id).unwrap();
        assert!(vec_approx_eq(world.origin(), DVec3::new(0.0, 4.0, 1.0)));
        assert!(vec_approx_eq(world.z_axis(), DVec3::NEG_Y));
        assert!(scene.host().is_hidden(scene.entity(id).unwrap()).unwrap());
    }

    #[test]
    fn test_orient_applied_and_pivoted_rotation() {
        let block = PartDefinition::new("", "block", Bounds::new(DVec3::ZERO, DVec3::new(2.0, 2.0, 2.0)));
        let mut scene = Scene::in_memory(CatalogSet::new().with(MemoryCatalog::new("Kit").with(block)));
        let id = scene.new_part("Kit", "block").unwrap();

        let (handle, applied) = scene
            .at(id)
            .orient_applied(&[(Face::Top, Direction::Down)])
            .unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].degrees, 180.0);

        handle.rotate_around([0.0, 0.0, 90.0], Pivot::BoundsCenter).unwrap();
        let entity = scene.entity(id).unwrap();
        assert!(vec_approx_eq(
            scene.host().bounds_center(entity).unwrap(),
            DVec3::new(1.0, 1.0, 1.0)
        ));
    }
}
