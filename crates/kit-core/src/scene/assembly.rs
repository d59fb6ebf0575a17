//! Assembly membership and transform propagation

use crate::host::{EntityId, GeometryHost};
use crate::transform::Transform;

use super::{AssemblyNode, Node, NodeData, NodeId, Scene, SceneError};

impl<H: GeometryHost> Scene<H> {
    /// Create an empty top-level assembly at the world origin
    pub fn new_assembly(&mut self, name: impl Into<String>) -> Result<NodeId, SceneError> {
        let name = name.into();
        let group = self.host.create_group(&name, None, Transform::IDENTITY)?;
        let node = Node {
            id: NodeId::new(),
            name,
            parent: None,
            world_transform: Transform::IDENTITY,
            deleted: false,
            data: NodeData::Assembly(AssemblyNode {
                group,
                children: Vec::new(),
            }),
        };
        tracing::info!("{} created", node.label());
        Ok(self.insert_node(node))
    }

    /// Prepend a world delta to every descendant's cached world transform.
    /// Host entities inside the group follow the group and are not touched.
    pub(crate) fn propagate(&mut self, id: NodeId, delta: &Transform) -> Result<(), SceneError> {
        let children = self.assembly_node(id)?.children.clone();
        for child in children {
            let node = self.node_mut(child)?;
            node.world_transform = *delta * node.world_transform;
            if matches!(node.data, NodeData::Assembly(_)) {
                self.propagate(child, delta)?;
            }
        }
        Ok(())
    }

    /// Append a node to an assembly, keeping its world pose
    pub fn add(&mut self, assembly: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_node = self.live_node(assembly)?;
        let parent_world = parent_node.world_transform;
        let parent_name = parent_node.name.clone();
        let group = self.assembly_node(assembly)?.group;

        if child == assembly || self.is_ancestor(child, assembly)? {
            return Err(SceneError::WouldCreateCycle);
        }
        let node = self.live_node(child)?;
        if let Some(existing) = node.parent {
            return Err(SceneError::AlreadyParented {
                node: node.label(),
                parent: self.node(existing)?.name.clone(),
            });
        }
        let label = node.label();
        let local = parent_world.inverse() * node.world_transform;

        match node.as_part().map(|p| p.component) {
            Some(component) => self.host.reparent(component, Some(group), local)?,
            None => self.rehost_assembly(child, Some(group), local)?,
        }

        self.assembly_node_mut(assembly)?.children.push(child);
        self.node_mut(child)?.parent = Some(assembly);
        tracing::info!("{} added to assembly '{}'", label, parent_name);
        Ok(())
    }

    /// Add several nodes in order
    pub fn add_all(&mut self, assembly: NodeId, children: impl IntoIterator<Item = NodeId>) -> Result<(), SceneError> {
        for child in children {
            self.add(assembly, child)?;
        }
        Ok(())
    }

    /// Detach a direct child and re-host it at top level, keeping its world pose
    pub fn remove(&mut self, assembly: NodeId, child: NodeId) -> Result<(), SceneError> {
        let assembly_name = self.live_node(assembly)?.name.clone();
        let node = self.node(child)?;
        if !self.assembly_node(assembly)?.children.contains(&child) {
            return Err(SceneError::NotAChild {
                node: node.label(),
                assembly: assembly_name,
            });
        }
        let label = node.label();
        let world = node.world_transform;

        match node.as_part().map(|p| p.component) {
            Some(component) => self.host.reparent(component, None, world)?,
            None => self.rehost_assembly(child, None, world)?,
        }

        self.assembly_node_mut(assembly)?
            .children
            .retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        tracing::info!("{} removed from assembly '{}'", label, assembly_name);
        Ok(())
    }

    /// Replace an assembly's host group with a fresh one under `parent_group`,
    /// moving every child entity across with its relative placement intact.
    fn rehost_assembly(
        &mut self,
        id: NodeId,
        parent_group: Option<EntityId>,
        local: Transform,
    ) -> Result<(), SceneError> {
        let node = self.live_node(id)?;
        let name = node.name.clone();
        let world = node.world_transform;
        let AssemblyNode {
            group: old_group,
            children,
        } = self.assembly_node(id)?.clone();

        let new_group = self.host.create_group(&name, parent_group, local)?;
        for child in children {
            let child_node = self.node(child)?;
            let entity = child_node.entity();
            let label = child_node.label();
            let relative = world.inverse() * child_node.world_transform;
            self.host.reparent(entity, Some(new_group), relative)?;
            tracing::debug!("{} re-hosted under '{}'", label, name);
        }
        self.host.erase(old_group)?;
        self.assembly_node_mut(id)?.group = new_group;
        Ok(())
    }
}
