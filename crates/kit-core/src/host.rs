//! Geometry host abstraction
//!
//! The scene graph never owns geometry. Every concrete scene entity (an
//! instanced definition or a grouping node) lives in a [`GeometryHost`], and
//! the scene only issues calls against it. [`MemoryHost`] is the in-process
//! implementation used by the CLI and the tests.

use std::collections::HashMap;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_LAYER;
use crate::definition::{Bounds, DefinitionHandle, InterfaceEdge};
use crate::transform::Transform;

/// Identifier of a concrete entity inside a geometry host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry host errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
    #[error("Entity is not a group: {0}")]
    NotAGroup(EntityId),
    #[error("Entity is not a definition instance: {0}")]
    NotAnInstance(EntityId),
    #[error("Entity is locked: {0}")]
    Locked(EntityId),
}

/// The 3-D authoring environment the scene graph drives.
///
/// Local transforms are relative to the containing group, or to the world
/// for top-level entities.
pub trait GeometryHost {
    /// Instance a definition at top level with the identity transform
    fn instantiate_definition(&mut self, definition: &DefinitionHandle) -> Result<EntityId, HostError>;

    /// Create an empty named group under `parent` (top level when `None`)
    fn create_group(
        &mut self,
        name: &str,
        parent: Option<EntityId>,
        local: Transform,
    ) -> Result<EntityId, HostError>;

    /// Pre-multiply the entity's local transform by `transform`
    fn apply_transform(&mut self, entity: EntityId, transform: &Transform) -> Result<(), HostError>;

    /// Replace the entity's local transform
    fn set_transform(&mut self, entity: EntityId, transform: &Transform) -> Result<(), HostError>;

    /// Current local transform
    fn transform(&self, entity: EntityId) -> Result<Transform, HostError>;

    /// Center of the entity's bounding box, world space
    fn bounds_center(&self, entity: EntityId) -> Result<DVec3, HostError>;

    /// Remove the entity (and, for groups, everything inside it)
    fn erase(&mut self, entity: EntityId) -> Result<(), HostError>;

    /// Move the entity under `group` (top level when `None`) with a new local transform
    fn reparent(
        &mut self,
        entity: EntityId,
        group: Option<EntityId>,
        local: Transform,
    ) -> Result<(), HostError>;

    /// Designated interface edges of an instanced definition
    fn interface_edges(&self, entity: EntityId) -> Result<Vec<InterfaceEdge>, HostError>;

    fn set_hidden(&mut self, entity: EntityId, hidden: bool) -> Result<(), HostError>;

    fn set_layer(&mut self, entity: EntityId, layer: &str) -> Result<(), HostError>;

    fn layer(&self, entity: EntityId) -> Result<String, HostError>;
}

#[derive(Debug, Clone)]
enum EntityKind {
    Instance(DefinitionHandle),
    Group(String),
}

#[derive(Debug, Clone)]
struct HostEntity {
    kind: EntityKind,
    parent: Option<EntityId>,
    local: Transform,
    hidden: bool,
    locked: bool,
    layer: String,
}

impl HostEntity {
    fn new(kind: EntityKind, parent: Option<EntityId>, local: Transform) -> Self {
        Self {
            kind,
            parent,
            local,
            hidden: false,
            locked: false,
            layer: DEFAULT_LAYER.to_string(),
        }
    }
}

/// In-process geometry host
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    entities: HashMap<EntityId, HostEntity>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, entity: EntityId) -> Result<&HostEntity, HostError> {
        self.entities
            .get(&entity)
            .ok_or(HostError::EntityNotFound(entity))
    }

    fn get_mut(&mut self, entity: EntityId) -> Result<&mut HostEntity, HostError> {
        self.entities
            .get_mut(&entity)
            .ok_or(HostError::EntityNotFound(entity))
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Containing group, `None` at top level
    pub fn parent_of(&self, entity: EntityId) -> Result<Option<EntityId>, HostError> {
        Ok(self.get(entity)?.parent)
    }

    /// Entities directly inside `group`
    pub fn children_of(&self, group: EntityId) -> Vec<EntityId> {
        let mut children: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.parent == Some(group))
            .map(|(id, _)| *id)
            .collect();
        children.sort();
        children
    }

    pub fn is_hidden(&self, entity: EntityId) -> Result<bool, HostError> {
        Ok(self.get(entity)?.hidden)
    }

    /// Locked entities refuse visibility changes
    pub fn set_locked(&mut self, entity: EntityId, locked: bool) -> Result<(), HostError> {
        self.get_mut(entity)?.locked = locked;
        Ok(())
    }

    /// Group name, or the qualified definition name for instances
    pub fn entity_name(&self, entity: EntityId) -> Result<String, HostError> {
        Ok(match &self.get(entity)?.kind {
            EntityKind::Instance(def) => def.qualified_name(),
            EntityKind::Group(name) => name.clone(),
        })
    }

    /// Composition of local transforms up the group chain
    pub fn world_transform(&self, entity: EntityId) -> Result<Transform, HostError> {
        let mut transform = Transform::IDENTITY;
        let mut current = Some(entity);
        while let Some(id) = current {
            let e = self.get(id)?;
            transform = e.local * transform;
            current = e.parent;
        }
        Ok(transform)
    }

    /// World-aligned bounds; `None` for a group with no instances inside
    pub fn world_bounds(&self, entity: EntityId) -> Result<Option<Bounds>, HostError> {
        match &self.get(entity)?.kind {
            EntityKind::Instance(def) => {
                Ok(Some(def.bounds.transformed(&self.world_transform(entity)?)))
            }
            EntityKind::Group(_) => {
                let mut bounds: Option<Bounds> = None;
                for child in self.children_of(entity) {
                    if let Some(b) = self.world_bounds(child)? {
                        bounds = Some(match bounds {
                            Some(acc) => acc.union(&b),
                            None => b,
                        });
                    }
                }
                Ok(bounds)
            }
        }
    }

    fn is_inside(&self, entity: EntityId, ancestor: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.entities.get(&id).and_then(|e| e.parent);
        }
        false
    }
}

impl GeometryHost for MemoryHost {
    fn instantiate_definition(&mut self, definition: &DefinitionHandle) -> Result<EntityId, HostError> {
        let id = EntityId::new();
        self.entities.insert(
            id,
            HostEntity::new(EntityKind::Instance(definition.clone()), None, Transform::IDENTITY),
        );
        Ok(id)
    }

    fn create_group(
        &mut self,
        name: &str,
        parent: Option<EntityId>,
        local: Transform,
    ) -> Result<EntityId, HostError> {
        if let Some(group) = parent
            && !matches!(self.get(group)?.kind, EntityKind::Group(_))
        {
            return Err(HostError::NotAGroup(group));
        }
        let id = EntityId::new();
        self.entities.insert(
            id,
            HostEntity::new(EntityKind::Group(name.to_string()), parent, local),
        );
        Ok(id)
    }

    fn apply_transform(&mut self, entity: EntityId, transform: &Transform) -> Result<(), HostError> {
        let e = self.get_mut(entity)?;
        e.local = *transform * e.local;
        Ok(())
    }

    fn set_transform(&mut self, entity: EntityId, transform: &Transform) -> Result<(), HostError> {
        self.get_mut(entity)?.local = *transform;
        Ok(())
    }

    fn transform(&self, entity: EntityId) -> Result<Transform, HostError> {
        Ok(self.get(entity)?.local)
    }

    fn bounds_center(&self, entity: EntityId) -> Result<DVec3, HostError> {
        match self.world_bounds(entity)? {
            Some(bounds) => Ok(bounds.center()),
            None => Ok(self.world_transform(entity)?.origin()),
        }
    }

    fn erase(&mut self, entity: EntityId) -> Result<(), HostError> {
        self.get(entity)?;
        let doomed: Vec<EntityId> = self
            .entities
            .keys()
            .copied()
            .filter(|id| self.is_inside(*id, entity))
            .collect();
        for id in doomed {
            self.entities.remove(&id);
        }
        Ok(())
    }

    fn reparent(
        &mut self,
        entity: EntityId,
        group: Option<EntityId>,
        local: Transform,
    ) -> Result<(), HostError> {
        self.get(entity)?;
        if let Some(group) = group
            && (!matches!(self.get(group)?.kind, EntityKind::Group(_)) || self.is_inside(group, entity))
        {
            return Err(HostError::NotAGroup(group));
        }
        let e = self.get_mut(entity)?;
        e.parent = group;
        e.local = local;
        Ok(())
    }

    fn interface_edges(&self, entity: EntityId) -> Result<Vec<InterfaceEdge>, HostError> {
        match &self.get(entity)?.kind {
            EntityKind::Instance(def) => Ok(def.interfaces.clone()),
            EntityKind::Group(_) => Err(HostError::NotAnInstance(entity)),
        }
    }

    fn set_hidden(&mut self, entity: EntityId, hidden: bool) -> Result<(), HostError> {
        let e = self.get_mut(entity)?;
        if e.locked {
            return Err(HostError::Locked(entity));
        }
        e.hidden = hidden;
        Ok(())
    }

    fn set_layer(&mut self, entity: EntityId, layer: &str) -> Result<(), HostError> {
        self.get_mut(entity)?.layer = layer.to_string();
        Ok(())
    }

    fn layer(&self, entity: EntityId) -> Result<String, HostError> {
        Ok(self.get(entity)?.layer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PartDefinition;
    use crate::precision::vec_approx_eq;

    fn cube() -> DefinitionHandle {
        PartDefinition::new("Test", "cube", Bounds::new(DVec3::ZERO, DVec3::ONE)).into_handle()
    }

    #[test]
    fn test_group_nesting_composes_world_transform() {
        let mut host = MemoryHost::new();
        let group = host
            .create_group("g", None, Transform::from_translation(DVec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        let part = host.instantiate_definition(&cube()).unwrap();
        host.reparent(part, Some(group), Transform::from_translation(DVec3::Y))
            .unwrap();
        let world = host.world_transform(part).unwrap();
        assert!(vec_approx_eq(world.origin(), DVec3::new(10.0, 1.0, 0.0)));
        assert!(vec_approx_eq(
            host.bounds_center(part).unwrap(),
            DVec3::new(10.5, 1.5, 0.5)
        ));
        assert!(vec_approx_eq(
            host.bounds_center(group).unwrap(),
            DVec3::new(10.5, 1.5, 0.5)
        ));
    }

    #[test]
    fn test_erase_group_removes_contents() {
        let mut host = MemoryHost::new();
        let group = host.create_group("g", None, Transform::IDENTITY).unwrap();
        let part = host.instantiate_definition(&cube()).unwrap();
        host.reparent(part, Some(group), Transform::IDENTITY).unwrap();
        host.erase(group).unwrap();
        assert!(!host.contains(part));
        assert_eq!(host.entity_count(), 0);
    }

    #[test]
    fn test_reparent_into_instance_fails() {
        let mut host = MemoryHost::new();
        let a = host.instantiate_definition(&cube()).unwrap();
        let b = host.instantiate_definition(&cube()).unwrap();
        assert!(matches!(
            host.reparent(a, Some(b), Transform::IDENTITY),
            Err(HostError::NotAGroup(_))
        ));
    }

    #[test]
    fn test_locked_entity_refuses_visibility() {
        let mut host = MemoryHost::new();
        let a = host.instantiate_definition(&cube()).unwrap();
        host.set_locked(a, true).unwrap();
        assert!(matches!(host.set_hidden(a, true), Err(HostError::Locked(_))));
        assert!(!host.is_hidden(a).unwrap());
    }
}
