//! Visibility and layers

use crate::host::GeometryHost;

use super::{NodeData, NodeId, Scene, SceneError};

impl<H: GeometryHost> Scene<H> {
    /// Make the node visible. Host failures are logged, not returned.
    pub fn show(&mut self, id: NodeId) -> &mut Self {
        self.set_visible(id, true);
        self
    }

    /// Hide the node. Host failures are logged, not returned.
    pub fn hide(&mut self, id: NodeId) -> &mut Self {
        self.set_visible(id, false);
        self
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) {
        let verb = if visible { "showing" } else { "hiding" };
        let node = match self.live_node(id) {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!("Exception while {} node {}: {}", verb, id, e);
                return;
            }
        };
        let label = node.label();
        let parent = node.parent;
        let entity = node.entity();
        match self.host.set_hidden(entity, !visible) {
            Ok(()) => tracing::debug!("{} {}", label, if visible { "visible" } else { "hidden" }),
            Err(e) => tracing::warn!("Exception while {} {} (parent: {:?}): {}", verb, label, parent, e),
        }
    }

    /// Layers in use: the part's own, or the distinct layers of an
    /// assembly's children in first-seen order
    pub fn layers(&self, id: NodeId) -> Result<Vec<String>, SceneError> {
        let node = self.live_node(id)?;
        match &node.data {
            NodeData::Part(p) => Ok(vec![self.host.layer(p.component)?]),
            NodeData::Assembly(a) => {
                let mut layers: Vec<String> = Vec::new();
                for child in &a.children {
                    for layer in self.layers(*child)? {
                        if !layers.contains(&layer) {
                            layers.push(layer);
                        }
                    }
                }
                Ok(layers)
            }
        }
    }

    /// Put a part, or every part below an assembly, on `layer`
    pub fn set_layer(&mut self, id: NodeId, layer: &str) -> Result<(), SceneError> {
        let node = self.live_node(id)?;
        match node.as_part().map(|p| p.component) {
            Some(component) => self.host.set_layer(component, layer)?,
            None => {
                for child in self.children(id)?.to_vec() {
                    self.set_layer(child, layer)?;
                }
            }
        }
        Ok(())
    }
}
