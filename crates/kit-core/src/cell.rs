//! Grid addressing in a node's own axis units

use glam::DVec3;

use crate::host::GeometryHost;
use crate::precision::snap_vec;
use crate::scene::{NodeId, Scene, SceneError};
use crate::transform::Transform;

/// Cell offset, missing trailing components default to zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellOffset(pub DVec3);

impl From<f64> for CellOffset {
    fn from(x: f64) -> Self {
        Self(DVec3::new(x, 0.0, 0.0))
    }
}

impl From<[f64; 2]> for CellOffset {
    fn from([x, y]: [f64; 2]) -> Self {
        Self(DVec3::new(x, y, 0.0))
    }
}

impl From<[f64; 3]> for CellOffset {
    fn from(xyz: [f64; 3]) -> Self {
        Self(DVec3::from_array(xyz))
    }
}

impl From<DVec3> for CellOffset {
    fn from(v: DVec3) -> Self {
        Self(v)
    }
}

/// A position expressed relative to a node's local axes.
///
/// One unit along an axis is one full length of that axis vector of the
/// owner's world transform. Owner-less cells are plain world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub owner: Option<NodeId>,
    /// Offset from the owner's origin, world-aligned
    pub offset: DVec3,
    /// Offset plus the owner's origin in its parent frame
    pub coord: DVec3,
    pub world_coord: DVec3,
}

impl Cell {
    /// A raw world-space coordinate
    pub fn world(offset: impl Into<CellOffset>) -> Self {
        let xyz = offset.into().0;
        Self {
            owner: None,
            offset: xyz,
            coord: xyz,
            world_coord: xyz,
        }
    }

    /// Resolve `offset` against a node placed at `world`, whose local
    /// origin within its parent is `local_origin`
    pub(crate) fn resolve(owner: NodeId, world: &Transform, local_origin: DVec3, offset: DVec3) -> Self {
        let mut local = DVec3::ZERO;
        for index in 0..3 {
            local += snap_vec(world.axis(index) * offset[index]);
        }
        // mirrored instances count cells from the nominal positive face
        let inverse = world.inverse();
        for index in 0..3 {
            if inverse.axis_points_negative(index) {
                local -= DVec3::AXES[index];
            }
        }
        let local = snap_vec(local);
        Self {
            owner: Some(owner),
            offset: local,
            coord: local_origin + local,
            world_coord: world.origin() + local,
        }
    }

    /// Translate the owner so this cell lands on `target`.
    ///
    /// Returns `Ok(false)` for owner-less cells, which have nothing to move.
    pub fn occupy<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        let Some(owner) = self.owner else {
            return Ok(false);
        };
        let translation = snap_vec(target.world_coord - self.world_coord);
        scene.translate_world(owner, translation)?;
        Ok(true)
    }

    fn occupy_then<H: GeometryHost>(
        &self,
        scene: &mut Scene<H>,
        target: &Cell,
        step: DVec3,
    ) -> Result<bool, SceneError> {
        if !self.occupy(scene, target)? {
            return Ok(false);
        }
        if let Some(owner) = self.owner {
            scene.translate(owner, step)?;
        }
        Ok(true)
    }

    /// Occupy `target`, then step one unit along +X
    pub fn to_right<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::X)
    }

    pub fn to_left<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::NEG_X)
    }

    /// Occupy `target`, then step one unit along +Y
    pub fn behind<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::Y)
    }

    pub fn in_front<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::NEG_Y)
    }

    pub fn above<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::Z)
    }

    pub fn below<H: GeometryHost>(&self, scene: &mut Scene<H>, target: &Cell) -> Result<bool, SceneError> {
        self.occupy_then(scene, target, DVec3::NEG_Z)
    }
}

impl<H: GeometryHost> Scene<H> {
    /// Cell `offset` units along the node's own axes
    pub fn cell(&self, id: NodeId, offset: impl Into<CellOffset>) -> Result<Cell, SceneError> {
        let node = self.live_node(id)?;
        let local_origin = self.host().transform(node.entity())?.origin();
        Ok(Cell::resolve(id, &node.world_transform(), local_origin, offset.into().0))
    }

    /// Move the node so its origin cell lands on `target`
    pub fn occupy(&mut self, id: NodeId, target: &Cell) -> Result<bool, SceneError> {
        let cell = self.cell(id, DVec3::ZERO)?;
        cell.occupy(self, target)
    }
}
