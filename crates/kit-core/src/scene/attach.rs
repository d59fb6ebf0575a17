//! Interface matching and fastener insertion

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PATTERN;
use crate::definition::PartRef;
use crate::host::GeometryHost;
use crate::interface::{Interface, InterfaceRef};
use crate::transform::Transform;

use super::{Node, NodeData, NodeId, NodeKind, Scene, SceneError};

/// Fastener definitions for both sides of one interface pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastenerSet {
    /// Stacked out from the A-side interface, last entry nearest the surface
    pub a_side: Vec<PartRef>,
    /// Stacked out from the B-side interface, first entry nearest the surface
    pub b_side: Vec<PartRef>,
}

impl FastenerSet {
    pub fn new(a_side: impl IntoIterator<Item = PartRef>, b_side: impl IntoIterator<Item = PartRef>) -> Self {
        Self {
            a_side: a_side.into_iter().collect(),
            b_side: b_side.into_iter().collect(),
        }
    }

    /// Build from a list that must hold exactly the two sides
    pub fn from_sides(sides: Vec<Vec<PartRef>>) -> Result<Self, SceneError> {
        let count = sides.len();
        let [a_side, b_side]: [Vec<PartRef>; 2] = sides.try_into().map_err(|_| {
            SceneError::InvalidFastenerSpec(format!("expected 2 sides, got {count}"))
        })?;
        let set = Self { a_side, b_side };
        set.validate()?;
        Ok(set)
    }

    /// Every entry must name both a catalog and a part
    pub fn validate(&self) -> Result<(), SceneError> {
        match self.a_side.iter().chain(&self.b_side).find(|r| !r.is_well_formed()) {
            Some(bad) => Err(SceneError::InvalidFastenerSpec(format!(
                "'{bad}' is not a part definition"
            ))),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a_side.is_empty() && self.b_side.is_empty()
    }
}

/// Options for one attach call
#[derive(Debug, Clone, Default)]
pub struct AttachOptions {
    /// `'0'`/`'1'` mask over candidate pairs in distance order, reused
    /// cyclically. `None` or empty uses the configured default.
    ///
    /// The mask runs over every mating pair of the two parts as one list; it
    /// does not restart per face. On a two-leg angle, `"10"` alternates holes
    /// across both legs together rather than within each leg.
    pub pattern: Option<String>,
    /// Explicit fasteners; `None` asks the A-side part's policy
    pub with: Option<FastenerSet>,
}

impl AttachOptions {
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_fasteners(mut self, fasteners: FastenerSet) -> Self {
        self.with = Some(fasteners);
        self
    }
}

/// Per-part fastener logic supplied by the build script
pub trait FastenerPolicy {
    /// Whether part `a` may be fastened to part `b`
    fn can_attach(&self, a: &Node, b: &Node) -> bool;

    /// Fasteners to insert between `a` and `b`
    fn fasteners_for(&self, a: &Node, b: &Node) -> Result<FastenerSet, SceneError>;
}

/// Policy that always answers with the same fastener set
#[derive(Debug, Clone)]
pub struct FixedFasteners(pub FastenerSet);

impl FastenerPolicy for FixedFasteners {
    fn can_attach(&self, _a: &Node, _b: &Node) -> bool {
        true
    }

    fn fasteners_for(&self, _a: &Node, _b: &Node) -> Result<FastenerSet, SceneError> {
        Ok(self.0.clone())
    }
}

/// Matched interface pair, indices into each part's interface list
#[derive(Debug, Clone, Copy)]
struct Candidate {
    a: usize,
    b: usize,
    distance: f64,
}

impl<H: GeometryHost> Scene<H> {
    /// Attach with default options
    pub fn attach(&mut self, node: NodeId, other: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.attach_with(node, other, &AttachOptions::default())
    }

    /// Insert fasteners wherever `node` and `other` present mating
    /// interfaces, returning the new fastener parts.
    ///
    /// Assemblies fan out over their children. An assembly attached to
    /// itself folds the fasteners back into itself, see [`Scene::attach_self`].
    pub fn attach_with(
        &mut self,
        node: NodeId,
        other: NodeId,
        options: &AttachOptions,
    ) -> Result<Vec<NodeId>, SceneError> {
        if node == other && self.live_node(node)?.kind() == NodeKind::Assembly {
            return self.attach_self(node, options);
        }
        self.attach_nodes(node, other, options)
    }

    /// Attach every child of an assembly to every other child, then add the
    /// fasteners to the assembly
    pub fn attach_self(&mut self, assembly: NodeId, options: &AttachOptions) -> Result<Vec<NodeId>, SceneError> {
        self.assembly_node(assembly)?;
        let fasteners = self.attach_nodes(assembly, assembly, options)?;
        self.add_all(assembly, fasteners.iter().copied())?;
        Ok(fasteners)
    }

    fn attach_nodes(&mut self, node: NodeId, other: NodeId, options: &AttachOptions) -> Result<Vec<NodeId>, SceneError> {
        let node_kind = self.live_node(node)?.kind();
        let other_kind = self.live_node(other)?.kind();
        match (node_kind, other_kind) {
            (NodeKind::Part, NodeKind::Part) => self.attach_parts(node, other, options),
            (NodeKind::Part, NodeKind::Assembly) => {
                let mut out = Vec::new();
                for child in self.children(other)?.to_vec() {
                    out.extend(self.attach_nodes(node, child, options)?);
                }
                Ok(out)
            }
            (NodeKind::Assembly, _) => {
                let mut out = Vec::new();
                for child in self.children(node)?.to_vec() {
                    out.extend(self.attach_nodes(child, other, options)?);
                }
                Ok(out)
            }
        }
    }

    fn pattern_mask(&self, options: &AttachOptions) -> Vec<char> {
        [options.pattern.as_deref(), Some(self.config.attach.default_pattern.as_str())]
            .into_iter()
            .flatten()
            .find(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PATTERN)
            .chars()
            .collect()
    }

    fn attach_parts(&mut self, a: NodeId, b: NodeId, options: &AttachOptions) -> Result<Vec<NodeId>, SceneError> {
        if a == b {
            return Ok(Vec::new());
        }
        let a_world = self.world_transform(a)?;
        let b_world = self.world_transform(b)?;
        let a_interfaces = self.interfaces(a)?.to_vec();
        let b_interfaces = self.interfaces(b)?.to_vec();

        let mut candidates = Vec::new();
        for (ai, a_iface) in a_interfaces.iter().enumerate() {
            for (bi, b_iface) in b_interfaces.iter().enumerate() {
                if a_iface.mates_with(&a_world, b_iface, &b_world) {
                    candidates.push(Candidate {
                        a: ai,
                        b: bi,
                        distance: a_iface.world_origin(&a_world).length(),
                    });
                }
            }
        }
        // stable: equal distances keep enumeration order
        candidates.sort_by(|x, y| x.distance.total_cmp(&y.distance));

        let mask = self.pattern_mask(options);
        let mut out = Vec::new();
        for (index, pair) in candidates.iter().enumerate() {
            if mask[index % mask.len()] == '0' {
                continue;
            }
            let fasteners = match &options.with {
                Some(set) => set.clone(),
                None => {
                    let Some(policy) = self.fastener_policy(a) else {
                        continue;
                    };
                    let (a_node, b_node) = (self.live_node(a)?, self.live_node(b)?);
                    if !policy.can_attach(a_node, b_node) {
                        continue;
                    }
                    policy.fasteners_for(a_node, b_node)?
                }
            };
            fasteners.validate()?;

            if !self.interface_at(a, pair.a)?.is_attached() {
                let iface = self.interface_at(a, pair.a)?.clone();
                out.extend(self.stack_fasteners(&a_world, &iface, fasteners.a_side.iter().rev())?);
                self.mark_attached(a, pair.a, InterfaceRef { part: b, index: pair.b })?;
            }
            if !self.interface_at(b, pair.b)?.is_attached() {
                let iface = self.interface_at(b, pair.b)?.clone();
                out.extend(self.stack_fasteners(&b_world, &iface, fasteners.b_side.iter())?);
                self.mark_attached(b, pair.b, InterfaceRef { part: a, index: pair.a })?;
            }
        }

        if !out.is_empty() {
            tracing::info!(
                "{} attached to {}: {} fasteners",
                self.live_node(a)?.label(),
                self.live_node(b)?.label(),
                out.len()
            );
        }
        Ok(out)
    }

    fn interface_at(&self, part: NodeId, index: usize) -> Result<&Interface, SceneError> {
        self.interfaces(part)?
            .get(index)
            .ok_or(SceneError::NodeNotFound(part))
    }

    fn mark_attached(&mut self, part: NodeId, index: usize, to: InterfaceRef) -> Result<(), SceneError> {
        if let NodeData::Part(p) = &mut self.live_node_mut(part)?.data
            && let Some(iface) = p.interfaces.get_mut(index)
            && iface.attached_to.is_none()
        {
            iface.attached_to = Some(to);
        }
        Ok(())
    }

    /// Create fasteners and stack them outward along the interface normal
    fn stack_fasteners<'a>(
        &mut self,
        world: &Transform,
        iface: &Interface,
        fasteners: impl Iterator<Item = &'a PartRef>,
    ) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        let mut offset = iface.height;
        for fastener in fasteners {
            let id = self.new_part_from(fastener)?;
            let placement = *world * iface.placement * Transform::from_translation(DVec3::new(0.0, 0.0, offset));
            self.place_new(id, placement)?;
            offset += self
                .interfaces(id)?
                .first()
                .map(|i| i.height)
                .unwrap_or(0.0);
            tracing::info!("{} inserted", self.live_node(id)?.label());
            out.push(id);
        }
        Ok(out)
    }

    /// First placement of a freshly created top-level part
    fn place_new(&mut self, id: NodeId, placement: Transform) -> Result<(), SceneError> {
        let node = self.live_node_mut(id)?;
        node.world_transform = placement;
        let entity = node.entity();
        self.host.set_transform(entity, &placement)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::{CatalogSet, MemoryCatalog};
    use crate::definition::{Bounds, InterfaceEdge, PartDefinition};
    use crate::precision::vec_approx_eq;

    /// Two plates: `top` has down-facing interfaces at x = 1 and x = 3 on
    /// its underside, `bottom` has up-facing ones at the same spots.
    fn scene() -> Scene {
        let bounds = Bounds::new(DVec3::ZERO, DVec3::new(4.0, 1.0, 1.0));
        let bottom = PartDefinition::new("", "bottom", bounds)
            .with_interface(InterfaceEdge::pointing(DVec3::new(3.0, 0.5, 1.0), DVec3::Z, 0.5))
            .with_interface(InterfaceEdge::pointing(DVec3::new(1.0, 0.5, 1.0), DVec3::Z, 0.5));
        let top = PartDefinition::new("", "top", bounds)
            .with_interface(InterfaceEdge::pointing(DVec3::new(1.0, 0.5, 0.0), DVec3::NEG_Z, 0.25))
            .with_interface(InterfaceEdge::pointing(DVec3::new(3.0, 0.5, 0.0), DVec3::NEG_Z, 0.25));
        let screw = PartDefinition::new("", "screw", Bounds::new(DVec3::ZERO, DVec3::ONE));
        let nut = PartDefinition::new("", "nut", Bounds::new(DVec3::ZERO, DVec3::ONE))
            .with_interface(InterfaceEdge::pointing(DVec3::ZERO, DVec3::Z, 0.125));
        let washer = PartDefinition::new("", "washer", Bounds::new(DVec3::ZERO, DVec3::ONE))
            .with_interface(InterfaceEdge::pointing(DVec3::ZERO, DVec3::Z, 0.0625));
        Scene::in_memory(
            CatalogSet::new()
                .with(MemoryCatalog::new("Kit").with(bottom).with(top))
                .with(MemoryCatalog::new("Fasteners").with(screw).with(nut).with(washer)),
        )
    }

    fn stacked(scene: &mut Scene) -> (NodeId, NodeId) {
        let bottom = scene.new_part("Kit", "bottom").unwrap();
        let top = scene.new_part("Kit", "top").unwrap();
        scene.z(top, 1.0).unwrap();
        (bottom, top)
    }

    fn screw_and_nut() -> FastenerSet {
        FastenerSet::new(
            [PartRef::new("Fasteners", "screw")],
            [PartRef::new("Fasteners", "nut")],
        )
    }

    fn origin(scene: &Scene, id: NodeId) -> DVec3 {
        scene.world_transform(id).unwrap().origin()
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let options = AttachOptions::default().with_fasteners(screw_and_nut());
        let first = scene.attach_with(top, bottom, &options).unwrap();
        assert_eq!(first.len(), 4);
        let second = scene.attach_with(top, bottom, &options).unwrap();
        assert!(second.is_empty());
        assert!(scene.interfaces(top).unwrap().iter().all(Interface::is_attached));
        assert!(scene.interfaces(bottom).unwrap().iter().all(Interface::is_attached));
    }

    #[test]
    fn test_pattern_selects_second_pair() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let options = AttachOptions::default()
            .with_pattern("01")
            .with_fasteners(screw_and_nut());
        let fasteners = scene.attach_with(top, bottom, &options).unwrap();
        assert_eq!(fasteners.len(), 2);
        // x = 3 is farther from the world origin than x = 1
        assert!(!scene.interfaces(top).unwrap()[0].is_attached());
        assert!(scene.interfaces(top).unwrap()[1].is_attached());
        assert!(vec_approx_eq(origin(&scene, fasteners[0]), DVec3::new(3.0, 0.5, 0.75)));
    }

    #[test]
    fn test_pattern_runs_across_faces() {
        // three holes on the top face, two on the +X side
        let holes = [
            (DVec3::new(1.0, 0.5, 1.0), DVec3::Z),
            (DVec3::new(2.0, 0.5, 1.0), DVec3::Z),
            (DVec3::new(3.0, 0.5, 1.0), DVec3::Z),
            (DVec3::new(4.0, 0.5, 0.25), DVec3::X),
            (DVec3::new(4.0, 0.5, 0.75), DVec3::X),
        ];
        let bounds = Bounds::new(DVec3::ZERO, DVec3::new(4.0, 1.0, 1.0));
        let (bracket, cap) = holes.iter().fold(
            (
                PartDefinition::new("", "bracket", bounds),
                PartDefinition::new("", "cap", bounds),
            ),
            |(bracket, cap), (at, normal)| {
                (
                    bracket.with_interface(InterfaceEdge::pointing(*at, *normal, 0.25)),
                    cap.with_interface(InterfaceEdge::pointing(*at, -*normal, 0.25)),
                )
            },
        );
        let screw = PartDefinition::new("", "screw", Bounds::new(DVec3::ZERO, DVec3::ONE));
        let nut = PartDefinition::new("", "nut", Bounds::new(DVec3::ZERO, DVec3::ONE));
        let mut scene = Scene::in_memory(
            CatalogSet::new()
                .with(MemoryCatalog::new("Kit").with(bracket).with(cap))
                .with(MemoryCatalog::new("Fasteners").with(screw).with(nut)),
        );
        let a = scene.new_part("Kit", "bracket").unwrap();
        let b = scene.new_part("Kit", "cap").unwrap();

        let options = AttachOptions::default()
            .with_pattern("10")
            .with_fasteners(screw_and_nut());
        let fasteners = scene.attach_with(a, b, &options).unwrap();
        assert_eq!(fasteners.len(), 6);
        let attached: Vec<bool> = scene
            .interfaces(a)
            .unwrap()
            .iter()
            .map(Interface::is_attached)
            .collect();
        assert_eq!(attached, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_attached_to_points_across() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let options = AttachOptions::default().with_fasteners(screw_and_nut());
        scene.attach_with(top, bottom, &options).unwrap();
        let top_first = scene.interfaces(top).unwrap()[0].attached_to.unwrap();
        assert_eq!(top_first, InterfaceRef { part: bottom, index: 1 });
        let bottom_first = scene.interfaces(bottom).unwrap()[0].attached_to.unwrap();
        assert_eq!(bottom_first, InterfaceRef { part: top, index: 1 });
    }

    #[test]
    fn test_fastener_stacking_offsets() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let fasteners = FastenerSet::new(
            [PartRef::new("Fasteners", "screw")],
            [PartRef::new("Fasteners", "nut"), PartRef::new("Fasteners", "washer")],
        );
        let options = AttachOptions::default()
            .with_pattern("10")
            .with_fasteners(fasteners);
        let out = scene.attach_with(top, bottom, &options).unwrap();
        assert_eq!(out.len(), 3);
        // screw sits on the top plate's underside interface, pointing down
        let screw = scene.world_transform(out[0]).unwrap();
        assert!(vec_approx_eq(screw.origin(), DVec3::new(1.0, 0.5, 0.75)));
        assert!(vec_approx_eq(screw.z_axis(), DVec3::NEG_Z));
        // nut then washer stack up from the bottom plate's top face
        assert!(vec_approx_eq(origin(&scene, out[1]), DVec3::new(1.0, 0.5, 1.5)));
        assert!(vec_approx_eq(origin(&scene, out[2]), DVec3::new(1.0, 0.5, 1.625)));
        let entity = scene.entity(out[2]).unwrap();
        assert!(scene
            .host()
            .world_transform(entity)
            .unwrap()
            .approx_eq(&scene.world_transform(out[2]).unwrap()));
    }

    #[test]
    fn test_a_side_stacks_in_reverse() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let fasteners = FastenerSet::new(
            [PartRef::new("Fasteners", "nut"), PartRef::new("Fasteners", "washer")],
            [],
        );
        let options = AttachOptions::default()
            .with_pattern("10")
            .with_fasteners(fasteners);
        let out = scene.attach_with(top, bottom, &options).unwrap();
        assert_eq!(scene.name(out[0]).unwrap(), "washer");
        assert_eq!(scene.name(out[1]).unwrap(), "nut");
        assert!(vec_approx_eq(origin(&scene, out[0]), DVec3::new(1.0, 0.5, 0.75)));
        assert!(vec_approx_eq(origin(&scene, out[1]), DVec3::new(1.0, 0.5, 0.6875)));
    }

    #[test]
    fn test_no_match_when_apart() {
        let mut scene = scene();
        let bottom = scene.new_part("Kit", "bottom").unwrap();
        let top = scene.new_part("Kit", "top").unwrap();
        scene.z(top, 2.0).unwrap();
        let options = AttachOptions::default().with_fasteners(screw_and_nut());
        assert!(scene.attach_with(top, bottom, &options).unwrap().is_empty());
    }

    #[test]
    fn test_policy_consulted_without_explicit_fasteners() {
        struct Counting(Rc<Cell<usize>>);
        impl FastenerPolicy for Counting {
            fn can_attach(&self, _a: &Node, b: &Node) -> bool {
                b.name == "bottom"
            }
            fn fasteners_for(&self, _a: &Node, _b: &Node) -> Result<FastenerSet, SceneError> {
                self.0.set(self.0.get() + 1);
                Ok(FastenerSet::new([], [PartRef::new("Fasteners", "nut")]))
            }
        }

        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        assert!(scene.attach(top, bottom).unwrap().is_empty());

        let calls = Rc::new(Cell::new(0));
        scene.set_fastener_policy(top, Rc::new(Counting(calls.clone())));
        let out = scene.attach(top, bottom).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(calls.get(), 2);
        // both sides are occupied even though the A side had no fasteners
        assert!(scene.interfaces(top).unwrap().iter().all(Interface::is_attached));
    }

    #[test]
    fn test_invalid_fastener_spec() {
        assert!(matches!(
            FastenerSet::from_sides(vec![vec![PartRef::new("Fasteners", "nut")]]),
            Err(SceneError::InvalidFastenerSpec(_))
        ));
        assert!(matches!(
            FastenerSet::from_sides(vec![vec![PartRef::new("", "nut")], vec![]]),
            Err(SceneError::InvalidFastenerSpec(_))
        ));
        let set = FastenerSet::from_sides(vec![vec![], vec![PartRef::new("Fasteners", "nut")]]).unwrap();
        assert_eq!(set.b_side.len(), 1);
    }

    #[test]
    fn test_self_attach_folds_into_assembly() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let asm = scene.new_assembly("stack").unwrap();
        scene.add_all(asm, [bottom, top]).unwrap();
        scene.set_default_fastener_policy(Rc::new(FixedFasteners(screw_and_nut())));

        let out = scene.attach_self(asm, &AttachOptions::default()).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(scene.children(asm).unwrap().len(), 6);
        for fastener in &out {
            assert_eq!(scene.parent(*fastener).unwrap(), Some(asm));
        }
        assert!(scene.attach_with(asm, asm, &AttachOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_part_to_assembly_fans_out() {
        let mut scene = scene();
        let (bottom, top) = stacked(&mut scene);
        let asm = scene.new_assembly("base").unwrap();
        scene.add(asm, bottom).unwrap();
        let options = AttachOptions::default().with_fasteners(screw_and_nut());
        let out = scene.attach_with(top, asm, &options).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(scene.children(asm).unwrap(), &[bottom]);
    }
}
