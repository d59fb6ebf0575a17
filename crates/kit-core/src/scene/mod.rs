//! Scene graph of parts and assemblies
//!
//! All nodes live in one arena keyed by [`NodeId`]; parent and child links
//! are ids. Every node caches its world transform. The cache is only written
//! by the node's own movement operations, by its parent's propagation, or
//! when a freshly created fastener is first placed.

mod assembly;
mod attach;
mod bom;
mod movement;
mod orient;
mod part;
mod queries;
mod visibility;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogError, CatalogSet};
use crate::config::KitConfig;
use crate::definition::DefinitionHandle;
use crate::host::{EntityId, GeometryHost, HostError, MemoryHost};
use crate::interface::Interface;
use crate::transform::Transform;

pub use attach::{AttachOptions, FastenerPolicy, FastenerSet, FixedFasteners};
pub use bom::{BillOfMaterials, BomItem};
pub use movement::Pivot;
pub use orient::{AppliedRotation, Direction, Face, ParseOrientError};

/// Identifier of a part or assembly node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant tag for explicit dispatch between the two node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Part,
    Assembly,
}

/// Leaf node: one instanced definition
#[derive(Debug, Clone)]
pub struct PartNode {
    pub definition: DefinitionHandle,
    /// Host entity of the instance
    pub component: EntityId,
    pub interfaces: Vec<Interface>,
}

/// Composite node: ordered children inside one host group
#[derive(Debug, Clone)]
pub struct AssemblyNode {
    pub group: EntityId,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Part(PartNode),
    Assembly(AssemblyNode),
}

/// A movable node of the scene graph
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) world_transform: Transform,
    pub(crate) deleted: bool,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Part(_) => NodeKind::Part,
            NodeData::Assembly(_) => NodeKind::Assembly,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn world_transform(&self) -> Transform {
        self.world_transform
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Host entity backing this node (component or group)
    pub fn entity(&self) -> EntityId {
        match &self.data {
            NodeData::Part(p) => p.component,
            NodeData::Assembly(a) => a.group,
        }
    }

    pub fn as_part(&self) -> Option<&PartNode> {
        match &self.data {
            NodeData::Part(p) => Some(p),
            NodeData::Assembly(_) => None,
        }
    }

    pub fn as_assembly(&self) -> Option<&AssemblyNode> {
        match &self.data {
            NodeData::Assembly(a) => Some(a),
            NodeData::Part(_) => None,
        }
    }

    /// Name used in log lines: `catalog::name` for parts
    pub fn label(&self) -> String {
        match &self.data {
            NodeData::Part(p) => format!("Part '{}'", p.definition.qualified_name()),
            NodeData::Assembly(_) => format!("Assembly '{}'", self.name),
        }
    }
}

/// Scene-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    #[error("Definition unavailable: {0}")]
    DefinitionUnavailable(#[from] CatalogError),
    #[error("Invalid fastener spec: {0}")]
    InvalidFastenerSpec(String),
    #[error("{node} already added to assembly '{parent}'")]
    AlreadyParented { node: String, parent: String },
    #[error("{node} is not in assembly '{assembly}'")]
    NotAChild { node: String, assembly: String },
    #[error("Camera subject must be a live part, a live assembly or nothing: {0}")]
    InvalidCameraSubject(NodeId),
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Node has been deleted: {0}")]
    NodeDeleted(NodeId),
    #[error("Node is not an assembly: {0}")]
    NotAnAssembly(NodeId),
    #[error("Membership change would create a cycle")]
    WouldCreateCycle,
    #[error("Rotation axis has zero length")]
    ZeroAxis,
    #[error("Capture failed: {0}")]
    Capture(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Geometry host error: {0}")]
    Host(#[from] HostError),
}

/// The scene graph together with the collaborators it drives
pub struct Scene<H: GeometryHost = MemoryHost> {
    host: H,
    catalogs: CatalogSet,
    config: KitConfig,
    nodes: HashMap<NodeId, Node>,
    /// Creation order, for deterministic whole-scene enumeration
    order: Vec<NodeId>,
    fastener_policies: HashMap<NodeId, Rc<dyn FastenerPolicy>>,
    default_fastener_policy: Option<Rc<dyn FastenerPolicy>>,
}

impl Scene<MemoryHost> {
    /// Scene over an in-memory host with default configuration
    pub fn in_memory(catalogs: CatalogSet) -> Self {
        Self::new(MemoryHost::new(), catalogs, KitConfig::default())
    }
}

impl<H: GeometryHost> Scene<H> {
    pub fn new(host: H, catalogs: CatalogSet, config: KitConfig) -> Self {
        Self {
            host,
            catalogs,
            config,
            nodes: HashMap::new(),
            order: Vec::new(),
            fastener_policies: HashMap::new(),
            default_fastener_policy: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access. Changes made here bypass the scene's transform cache.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        self.order.push(id);
        id
    }

    /// Any node, deleted or not
    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    /// A node that has not been deleted
    pub fn live_node(&self, id: NodeId) -> Result<&Node, SceneError> {
        let node = self.node(id)?;
        if node.deleted {
            return Err(SceneError::NodeDeleted(id));
        }
        Ok(node)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    pub(crate) fn live_node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        let node = self.node_mut(id)?;
        if node.deleted {
            return Err(SceneError::NodeDeleted(id));
        }
        Ok(node)
    }

    pub(crate) fn assembly_node(&self, id: NodeId) -> Result<&AssemblyNode, SceneError> {
        self.live_node(id)?
            .as_assembly()
            .ok_or(SceneError::NotAnAssembly(id))
    }

    pub(crate) fn assembly_node_mut(&mut self, id: NodeId) -> Result<&mut AssemblyNode, SceneError> {
        match &mut self.live_node_mut(id)?.data {
            NodeData::Assembly(a) => Ok(a),
            NodeData::Part(_) => Err(SceneError::NotAnAssembly(id)),
        }
    }

    /// Register the fastener callback for one part
    pub fn set_fastener_policy(&mut self, part: NodeId, policy: Rc<dyn FastenerPolicy>) {
        self.fastener_policies.insert(part, policy);
    }

    /// Callback used by parts without their own policy
    pub fn set_default_fastener_policy(&mut self, policy: Rc<dyn FastenerPolicy>) {
        self.default_fastener_policy = Some(policy);
    }

    pub(crate) fn fastener_policy(&self, part: NodeId) -> Option<Rc<dyn FastenerPolicy>> {
        self.fastener_policies
            .get(&part)
            .or(self.default_fastener_policy.as_ref())
            .cloned()
    }
}

impl<H: GeometryHost> fmt::Debug for Scene<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("catalogs", &self.catalogs)
            .field("config", &self.config)
            .finish()
    }
}
