//! Sample kit: a Contraptor-style angle catalog, a small fastener catalog and
//! the two-angle gadget built from them.

use std::path::Path;

use anyhow::{Context, Result};
use glam::DVec3;
use kit_core::{
    AttachOptions, Bounds, Camera, CatalogConfig, CatalogSet, DirectoryCatalog, Direction, Face,
    FastenerSet, InterfaceEdge, KitConfig, NodeId, PartDefinition, PartRef, Scene, SceneError,
    ShotLog, Viewport,
};

pub const CONTRAPTOR: &str = "Contraptor";
pub const FASTENERS: &str = "Fasteners";
pub const SCREW: &str = "screw-1024-05(ph)";
pub const NUT: &str = "nut-1024(hex)";

/// Angle stock wall thickness, also the interface height of every hole
const THICKNESS: f64 = 0.125;

/// L-angle `length` cells long with one hole per cell in each leg. Bottom
/// holes face -Z, back holes face +Y.
pub fn angle(length: u32) -> PartDefinition {
    let bounds = Bounds::new(DVec3::ZERO, DVec3::new(f64::from(length), 1.0, 1.0));
    (0..length).fold(
        PartDefinition::new(CONTRAPTOR, format!("angle-{length}"), bounds),
        |def, i| {
            let x = f64::from(i) + 0.5;
            def.with_interface(InterfaceEdge::pointing(DVec3::new(x, 0.5, 0.0), DVec3::NEG_Z, THICKNESS))
                .with_interface(InterfaceEdge::pointing(DVec3::new(x, 1.0, 0.5), DVec3::Y, THICKNESS))
        },
    )
}

pub fn screw() -> PartDefinition {
    PartDefinition::new(FASTENERS, SCREW, Bounds::new(DVec3::new(-0.1, -0.1, 0.0), DVec3::new(0.1, 0.1, 0.3125)))
}

pub fn nut() -> PartDefinition {
    PartDefinition::new(FASTENERS, NUT, Bounds::new(DVec3::new(-0.15, -0.15, 0.0), DVec3::new(0.15, 0.15, 0.09375)))
        .with_interface(InterfaceEdge::pointing(DVec3::ZERO, DVec3::Z, 0.09375))
}

/// Write both catalogs and a `kit.ron` pointing at them into `dir`
pub fn seed(dir: &Path) -> Result<KitConfig> {
    let contraptor = DirectoryCatalog::new(CONTRAPTOR, dir.join(CONTRAPTOR));
    for length in [4, 6] {
        contraptor.save(&angle(length))?;
    }
    let fasteners = DirectoryCatalog::new(FASTENERS, dir.join(FASTENERS));
    fasteners.save(&screw())?;
    fasteners.save(&nut())?;

    let mut config = KitConfig::default();
    config.camera.can_shoot = true;
    config.catalogs = [CONTRAPTOR, FASTENERS]
        .into_iter()
        .map(|name| CatalogConfig {
            name: name.to_string(),
            path: name.into(),
        })
        .collect();
    let path = dir.join("kit.ron");
    config.save(&path)?;
    tracing::info!("Seeded sample kit into {:?}", dir);
    Ok(config)
}

/// Load `kit.ron`, resolving catalog directories next to it
pub fn load_config(path: &Path) -> Result<KitConfig> {
    let mut config = KitConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    if let Some(base) = path.parent() {
        config.resolve_catalog_paths(base);
    }
    Ok(config)
}

pub fn catalogs_from(config: &KitConfig) -> CatalogSet {
    config
        .catalogs
        .iter()
        .fold(CatalogSet::new(), |set, c| set.with(DirectoryCatalog::new(c.name.clone(), c.path.clone())))
}

/// Nodes of the built gadget
pub struct Gadget {
    pub assembly: NodeId,
    pub long_angle: NodeId,
    pub short_angle: NodeId,
    pub fasteners: Vec<NodeId>,
}

/// Stand a 6-hole angle up, lay a 4-hole angle across its top and bolt them
/// together, shooting a step after each stage.
pub fn build_gadget<V: Viewport>(
    scene: &mut Scene,
    camera: &mut Camera,
    viewport: &mut V,
    log: &mut ShotLog,
) -> Result<Gadget, SceneError> {
    let long_angle = scene.new_part(CONTRAPTOR, "angle-6")?;
    scene.at(long_angle).rotate([90.0, 0.0, 0.0])?.translate([0.0, 4.0, 0.0])?;
    camera.set_subject(scene, Some(long_angle))?;
    camera.shoot(scene, viewport, log, Some("Stand the long angle on its edge"))?;

    let short_angle = scene.new_part(CONTRAPTOR, "angle-4")?;
    scene.orient(short_angle, &[(Face::Left, Direction::Front)])?;
    let target = scene.cell(long_angle, 0.0)?;
    scene.cell(short_angle, 3.0)?.above(scene, &target)?;

    let assembly = scene.new_assembly("Gadget")?;
    scene.add_all(assembly, [short_angle, long_angle])?;
    camera.set_subject(scene, Some(assembly))?;
    camera.shoot(scene, viewport, log, Some("Lay the short angle across the top"))?;

    let options = AttachOptions::default().with_fasteners(FastenerSet::new(
        [PartRef::new(FASTENERS, SCREW)],
        [PartRef::new(FASTENERS, NUT)],
    ));
    let fasteners = scene.attach_with(long_angle, short_angle, &options)?;
    scene.add_all(assembly, fasteners.iter().copied())?;
    camera.shoot(scene, viewport, log, Some("Bolt the angles together"))?;

    Ok(Gadget {
        assembly,
        long_angle,
        short_angle,
        fasteners,
    })
}
