//! Read-only access to the node arena

use crate::host::{EntityId, GeometryHost};
use crate::transform::Transform;

use super::{Node, NodeId, NodeKind, Scene, SceneError};

impl<H: GeometryHost> Scene<H> {
    pub fn name(&self, id: NodeId) -> Result<&str, SceneError> {
        Ok(&self.node(id)?.name)
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, SceneError> {
        Ok(self.node(id)?.kind())
    }

    /// Containing assembly, `None` for a top-level node
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Children of an assembly in insertion order
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.assembly_node(id)?.children)
    }

    /// Cached world transform
    pub fn world_transform(&self, id: NodeId) -> Result<Transform, SceneError> {
        Ok(self.live_node(id)?.world_transform)
    }

    /// Transform relative to the parent's frame
    pub fn local_transform(&self, id: NodeId) -> Result<Transform, SceneError> {
        let world = self.world_transform(id)?;
        Ok(self.parent_world(id)?.inverse() * world)
    }

    pub fn entity(&self, id: NodeId) -> Result<EntityId, SceneError> {
        Ok(self.live_node(id)?.entity())
    }

    /// Every live node in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|n| !n.deleted)
    }

    /// Live top-level nodes in creation order
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.parent.is_none())
    }

    /// All descendants of an assembly, depth first in insertion order
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out)?;
        Ok(out)
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) -> Result<(), SceneError> {
        if let Some(asm) = self.live_node(id)?.as_assembly() {
            for child in &asm.children {
                out.push(*child);
                self.collect_descendants(*child, out)?;
            }
        }
        Ok(())
    }

    /// Whether `ancestor` is on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> Result<bool, SceneError> {
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return Ok(true);
            }
            current = self.node(parent)?.parent;
        }
        Ok(false)
    }

    /// `id` followed by its ancestors, innermost first
    pub fn ancestry(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut chain = vec![id];
        let mut current = self.live_node(id)?.parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent)?.parent;
        }
        Ok(chain)
    }
}
