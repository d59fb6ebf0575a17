//! Bill of materials for an assembly

use glam::DVec3;
use serde::Serialize;

use crate::definition::PartRef;
use crate::host::GeometryHost;

use super::{NodeData, NodeId, Scene, SceneError};

/// Parts of an assembly grouped by definition
#[derive(Debug, Clone, Serialize)]
pub struct BillOfMaterials {
    pub assembly_name: String,
    /// First-seen order of a depth-first walk over the children
    pub items: Vec<BomItem>,
}

impl BillOfMaterials {
    pub fn new(assembly_name: impl Into<String>) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            items: Vec::new(),
        }
    }

    /// Sum of all quantities
    pub fn total_parts(&self) -> usize {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Item for a `catalog::name` qualified name
    pub fn get(&self, qualified_name: &str) -> Option<&BomItem> {
        self.items
            .iter()
            .find(|i| i.part.qualified_name() == qualified_name)
    }

    fn count(&mut self, part: PartRef, size: DVec3) {
        match self.items.iter_mut().find(|i| i.part == part) {
            Some(item) => item.quantity += 1,
            None => self.items.push(BomItem {
                part,
                quantity: 1,
                size,
            }),
        }
    }
}

/// A single line of the bill of materials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomItem {
    pub part: PartRef,
    pub quantity: usize,
    /// Extent of the definition's bounds
    pub size: DVec3,
}

impl<H: GeometryHost> Scene<H> {
    pub fn bom(&self, assembly: NodeId) -> Result<BillOfMaterials, SceneError> {
        let mut bom = BillOfMaterials::new(self.live_node(assembly)?.name.clone());
        self.collect_bom(assembly, &mut bom)?;
        tracing::debug!(
            "Bill of materials for '{}': {} items, {} parts",
            bom.assembly_name,
            bom.items.len(),
            bom.total_parts()
        );
        Ok(bom)
    }

    fn collect_bom(&self, assembly: NodeId, bom: &mut BillOfMaterials) -> Result<(), SceneError> {
        for child in &self.assembly_node(assembly)?.children {
            match &self.live_node(*child)?.data {
                NodeData::Part(p) => bom.count(p.definition.part_ref(), p.definition.bounds.size()),
                NodeData::Assembly(_) => self.collect_bom(*child, bom)?,
            }
        }
        Ok(())
    }
}
