//! Builds the two-angle gadget end to end

use approx::assert_abs_diff_eq;
use glam::DVec3;
use kit_core::{
    AttachOptions, Bounds, Camera, CameraConfig, CatalogSet, Direction, Face, FastenerSet,
    InterfaceEdge, MemoryCatalog, MemoryHost, NodeId, PartDefinition, PartRef, Scene, SceneError,
    Shot, ShotLog, Viewport,
};

const THICKNESS: f64 = 0.125;

/// L-angle `length` cells long: holes through the bottom leg (facing -Z)
/// and the back leg (facing +Y), one per cell
fn angle(length: u32) -> PartDefinition {
    let mut def = PartDefinition::new(
        "",
        format!("angle-{length}"),
        Bounds::new(DVec3::ZERO, DVec3::new(f64::from(length), 1.0, 1.0)),
    );
    for i in 0..length {
        let x = f64::from(i) + 0.5;
        def = def
            .with_interface(InterfaceEdge::pointing(DVec3::new(x, 0.5, 0.0), DVec3::NEG_Z, THICKNESS))
            .with_interface(InterfaceEdge::pointing(DVec3::new(x, 1.0, 0.5), DVec3::Y, THICKNESS));
    }
    def
}

fn catalogs() -> CatalogSet {
    let screw = PartDefinition::new("", "screw-1024-05(ph)", Bounds::new(DVec3::ZERO, DVec3::new(0.2, 0.2, 0.5)));
    let nut = PartDefinition::new("", "nut-1024(hex)", Bounds::new(DVec3::ZERO, DVec3::new(0.3, 0.3, 0.1)))
        .with_interface(InterfaceEdge::pointing(DVec3::ZERO, DVec3::Z, 0.1));
    CatalogSet::new()
        .with(MemoryCatalog::new("Contraptor").with(angle(4)).with(angle(6)))
        .with(MemoryCatalog::new("Fasteners").with(screw).with(nut))
}

struct Gadget {
    assembly: NodeId,
    a4: NodeId,
    a6: NodeId,
    fasteners: Vec<NodeId>,
}

fn build(scene: &mut Scene) -> Result<Gadget, SceneError> {
    let a6 = scene.new_part("Contraptor", "angle-6")?;
    scene.at(a6).rotate([90.0, 0.0, 0.0])?.translate([0.0, 4.0, 0.0])?;

    let a4 = scene.new_part("Contraptor", "angle-4")?;
    scene.orient(a4, &[(Face::Left, Direction::Front)])?;
    let target = scene.cell(a6, 0.0)?;
    scene.cell(a4, 3.0)?.above(scene, &target)?;

    let assembly = scene.new_assembly("Gadget")?;
    scene.add_all(assembly, [a4, a6])?;

    let fasteners = FastenerSet::new(
        [PartRef::new("Fasteners", "screw-1024-05(ph)")],
        [PartRef::new("Fasteners", "nut-1024(hex)")],
    );
    let options = AttachOptions::default().with_fasteners(fasteners);
    let fasteners = scene.attach_with(a6, a4, &options)?;
    scene.add_all(assembly, fasteners.iter().copied())?;

    Ok(Gadget {
        assembly,
        a4,
        a6,
        fasteners,
    })
}

fn assert_vec_eq(actual: DVec3, expected: DVec3) {
    assert_abs_diff_eq!(actual.x, expected.x, epsilon = 1e-9);
    assert_abs_diff_eq!(actual.y, expected.y, epsilon = 1e-9);
    assert_abs_diff_eq!(actual.z, expected.z, epsilon = 1e-9);
}

#[test]
fn gadget_parts_land_where_expected() {
    let mut scene = Scene::in_memory(catalogs());
    let gadget = build(&mut scene).unwrap();

    let a6 = scene.world_transform(gadget.a6).unwrap();
    assert_vec_eq(a6.origin(), DVec3::new(0.0, 4.0, 0.0));
    assert_vec_eq(a6.z_axis(), DVec3::NEG_Y);

    let a4 = scene.world_transform(gadget.a4).unwrap();
    assert_vec_eq(a4.origin(), DVec3::new(1.0, 0.0, 1.0));
    assert_vec_eq(a4.x_axis(), DVec3::Y);

    // a4's cell 3 now sits one unit above a6's cell 0
    let a4_cell = scene.cell(gadget.a4, 3.0).unwrap();
    let a6_cell = scene.cell(gadget.a6, 0.0).unwrap();
    assert_vec_eq(a4_cell.world_coord - a6_cell.world_coord, DVec3::Z);
}

#[test]
fn gadget_gets_one_screw_and_one_nut() {
    let mut scene = Scene::in_memory(catalogs());
    let gadget = build(&mut scene).unwrap();
    assert_eq!(gadget.fasteners.len(), 2);

    let screw = scene.world_transform(gadget.fasteners[0]).unwrap();
    assert_eq!(scene.name(gadget.fasteners[0]).unwrap(), "screw-1024-05(ph)");
    assert_vec_eq(screw.origin(), DVec3::new(0.5, 3.5, 1.0 + THICKNESS));
    assert_vec_eq(screw.z_axis(), DVec3::Z);

    let nut = scene.world_transform(gadget.fasteners[1]).unwrap();
    assert_vec_eq(nut.origin(), DVec3::new(0.5, 3.5, 1.0 - THICKNESS));
    assert_vec_eq(nut.z_axis(), DVec3::NEG_Z);

    let again = scene.attach(gadget.a6, gadget.a4).unwrap();
    assert!(again.is_empty());
}

#[test]
fn gadget_bill_of_materials() {
    let mut scene = Scene::in_memory(catalogs());
    let gadget = build(&mut scene).unwrap();
    let bom = scene.bom(gadget.assembly).unwrap();
    assert_eq!(bom.assembly_name, "Gadget");
    assert_eq!(bom.total_parts(), 4);
    let names: Vec<String> = bom.items.iter().map(|i| i.part.qualified_name()).collect();
    assert_eq!(
        names,
        vec![
            "Contraptor::angle-4",
            "Contraptor::angle-6",
            "Fasteners::screw-1024-05(ph)",
            "Fasteners::nut-1024(hex)",
        ]
    );
}

#[test]
fn gadget_placement_dump() {
    let mut scene = Scene::in_memory(catalogs());
    let gadget = build(&mut scene).unwrap();
    let a6 = scene.dump_placement(gadget.a6).unwrap().to_string();
    assert!(a6.ends_with("scene.at(node).rotate([90.0, 0.0, 0.0])?.translate([0.0, 4.0, 0.0])?;"));
    let a4 = scene.dump_placement(gadget.a4).unwrap().to_string();
    assert!(a4.ends_with("scene.at(node).rotate([0.0, 0.0, 90.0])?.translate([1.0, 0.0, 1.0])?;"));
}

#[derive(Default)]
struct Stems(Vec<String>);

impl Viewport for Stems {
    fn capture(&mut self, _host: &MemoryHost, shot: &Shot<'_>) -> Result<(), SceneError> {
        self.0.push(shot.file_stem.to_string());
        Ok(())
    }
}

#[test]
fn gadget_screenshot_step() {
    let mut scene = Scene::in_memory(catalogs());
    let gadget = build(&mut scene).unwrap();
    let config = CameraConfig {
        can_shoot: true,
        ..CameraConfig::default()
    };
    let mut camera = Camera::new("Gadget Assembly", &config);
    let mut viewport = Stems::default();
    let mut log = ShotLog::new();
    camera.set_subject(&scene, Some(gadget.assembly)).unwrap();
    camera
        .shoot(&mut scene, &mut viewport, &mut log, Some("Assemble the gadget"))
        .unwrap();
    assert_eq!(viewport.0, vec!["001-Gadget".to_string()]);
    assert_eq!(log.records()[0].description.as_deref(), Some("Assemble the gadget"));
}
