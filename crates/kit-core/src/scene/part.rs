//! Part creation and deletion

use crate::definition::PartRef;
use crate::host::GeometryHost;
use crate::interface::Interface;
use crate::transform::Transform;

use super::{Node, NodeData, NodeId, PartNode, Scene, SceneError};

impl<H: GeometryHost> Scene<H> {
    /// Instance `catalog::name` at the world origin as a new top-level part.
    ///
    /// Interfaces are read from the host's edge geometry once, here.
    pub fn new_part(&mut self, catalog: &str, name: &str) -> Result<NodeId, SceneError> {
        let definition = self.catalogs.definition_for(catalog, name)?;
        let component = self.host.instantiate_definition(&definition)?;
        let interfaces = self
            .host
            .interface_edges(component)?
            .iter()
            .map(Interface::from_edge)
            .collect();

        let node = Node {
            id: NodeId::new(),
            name: definition.name.clone(),
            parent: None,
            world_transform: Transform::IDENTITY,
            deleted: false,
            data: NodeData::Part(PartNode {
                definition,
                component,
                interfaces,
            }),
        };
        tracing::info!("{} created", node.label());
        Ok(self.insert_node(node))
    }

    pub fn new_part_from(&mut self, part: &PartRef) -> Result<NodeId, SceneError> {
        self.new_part(&part.catalog, &part.name)
    }

    /// Delete a part or an assembly.
    ///
    /// The node leaves its parent, its host entity is erased and it becomes
    /// inert. Assemblies delete their children first.
    pub fn delete(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.live_node(id)?;
        let label = node.label();
        let parent = node.parent;
        let children = node
            .as_assembly()
            .map(|a| a.children.clone())
            .unwrap_or_default();

        if let Some(parent) = parent {
            self.remove(parent, id)?;
        }
        for child in children {
            self.delete(child)?;
        }
        // leaving a parent re-hosts an assembly under a new group
        let entity = self.node(id)?.entity();
        self.host.erase(entity)?;
        self.node_mut(id)?.deleted = true;
        self.fastener_policies.remove(&id);
        tracing::info!("{} deleted", label);
        Ok(())
    }

    pub fn is_deleted(&self, id: NodeId) -> Result<bool, SceneError> {
        Ok(self.node(id)?.deleted)
    }

    /// Interfaces of a part; empty for assemblies
    pub fn interfaces(&self, id: NodeId) -> Result<&[Interface], SceneError> {
        Ok(self
            .live_node(id)?
            .as_part()
            .map(|p| p.interfaces.as_slice())
            .unwrap_or(&[]))
    }
}
