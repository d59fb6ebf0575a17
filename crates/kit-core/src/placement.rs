//! Source-code dump of node placements
//!
//! Renders a node's local placement as the builder calls that would
//! reproduce it: a rotation looked up from the node's axis orientation and a
//! translation with dyadic fractions written out exactly.

use std::fmt;

use glam::DVec3;

use crate::camera::CameraView;
use crate::host::GeometryHost;
use crate::precision::{round_to, vec_approx_eq};
use crate::scene::{NodeData, NodeId, Scene, SceneError};
use crate::transform::Transform;

/// Euler angles (degrees, applied X then Y then Z) for each axis-aligned
/// orientation, keyed by which local axis now points along world X, Y and Z
pub const ROTATION_TABLE: [(&str, [f64; 3]); 24] = [
    ("X+Y+Z+", [0.0, 0.0, 0.0]),
    ("Y-X+Z+", [0.0, 0.0, 90.0]),
    ("Y+X-Z+", [0.0, 0.0, -90.0]),
    ("X-Y-Z+", [0.0, 0.0, 180.0]),
    ("X-Y+Z-", [0.0, 180.0, 0.0]),
    ("Y-X-Z-", [0.0, 180.0, 90.0]),
    ("Y+X+Z-", [0.0, 180.0, -90.0]),
    ("X+Y-Z-", [0.0, 180.0, 180.0]),
    ("Z+Y+X-", [0.0, 90.0, 0.0]),
    ("Y-Z+X-", [0.0, 90.0, 90.0]),
    ("Y+Z-X-", [0.0, 90.0, -90.0]),
    ("Z-Y-X-", [0.0, 90.0, 180.0]),
    ("Z-Y+X+", [0.0, -90.0, 0.0]),
    ("Y-Z-X+", [0.0, -90.0, 90.0]),
    ("Y+Z+X+", [0.0, -90.0, -90.0]),
    ("Z+Y-X+", [0.0, -90.0, 180.0]),
    ("X+Z-Y+", [90.0, 0.0, 0.0]),
    ("Z+X+Y+", [90.0, 0.0, 90.0]),
    ("Z-X-Y+", [90.0, 0.0, -90.0]),
    ("X-Z+Y+", [90.0, 0.0, 180.0]),
    ("X+Z+Y-", [-90.0, 0.0, 0.0]),
    ("Z-X+Y-", [-90.0, 0.0, 90.0]),
    ("Z+X-Y-", [-90.0, 0.0, -90.0]),
    ("X-Z-Y-", [-90.0, 0.0, 180.0]),
];

/// Which signed local axis points along each world axis, e.g. `"Y-X+Z+"`.
/// `None` unless the basis is axis aligned.
pub fn orientation_key(transform: &Transform) -> Option<String> {
    let signed = [
        ("X+", transform.x_axis()),
        ("X-", -transform.x_axis()),
        ("Y+", transform.y_axis()),
        ("Y-", -transform.y_axis()),
        ("Z+", transform.z_axis()),
        ("Z-", -transform.z_axis()),
    ];
    let mut key = String::new();
    for world in DVec3::AXES {
        let (name, _) = signed.iter().find(|(_, v)| vec_approx_eq(*v, world))?;
        key.push_str(name);
    }
    Some(key)
}

/// Euler rotation reproducing an axis-aligned orientation
pub fn rotation_for(transform: &Transform) -> Option<[f64; 3]> {
    let key = orientation_key(transform)?;
    ROTATION_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, angles)| *angles)
}

fn float(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'i', 'N']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// A coordinate as an `f64` expression, with eighths, sixteenths and
/// thirty-seconds written as exact fractions
pub fn format_coordinate(value: f64) -> String {
    // adding 0.0 turns -0.0 into 0.0
    let x = round_to(value, 6) + 0.0;
    if x.fract() == 0.0 {
        return float(x);
    }
    let whole = x.trunc();
    let rem = x - whole;
    for power in 1..=5 {
        let denominator = f64::from(1u32 << power);
        let numerator = round_to(rem * denominator, 6);
        if numerator.fract() == 0.0 {
            if denominator <= 4.0 {
                break;
            }
            let fraction = format!("{} / {}", float(numerator.abs()), float(denominator));
            return match (whole == 0.0, numerator < 0.0) {
                (true, false) => fraction,
                (true, true) => format!("-{fraction}"),
                (false, false) => format!("{} + {}", float(whole), fraction),
                (false, true) => format!("{} - {}", float(whole), fraction),
            };
        }
    }
    float(x)
}

fn format_vector(values: impl IntoIterator<Item = String>) -> String {
    format!("[{}]", values.into_iter().collect::<Vec<_>>().join(", "))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DumpSource {
    Part { catalog: String, name: String },
    Assembly { name: String },
}

/// Builder calls reproducing one node's local placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDump {
    pub source: DumpSource,
    pub rotation: Option<[f64; 3]>,
    pub origin: DVec3,
}

impl fmt::Display for PlacementDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            DumpSource::Part { catalog, name } => {
                writeln!(f, "let node = scene.new_part({catalog:?}, {name:?})?;")?
            }
            DumpSource::Assembly { name } => writeln!(f, "let node = scene.new_assembly({name:?})?;")?,
        }
        write!(f, "scene.at(node)")?;
        if let Some(angles) = self.rotation {
            write!(f, ".rotate({})?", format_vector(angles.map(float)))?;
        }
        let origin = self.origin.to_array().map(format_coordinate);
        write!(f, ".translate({})?;", format_vector(origin))
    }
}

/// Camera placement as a `Camera::set` call, rounded to two digits
pub fn format_camera(view: &CameraView) -> String {
    let round = |v: DVec3| format_vector(v.to_array().map(|c| float(round_to(c, 2) + 0.0)));
    format!(
        "camera.set({}, {}, {});",
        round(view.eye),
        round(view.target),
        round(view.up)
    )
}

impl<H: GeometryHost> Scene<H> {
    /// Placement dump for one node, relative to its parent
    pub fn dump_placement(&self, id: NodeId) -> Result<PlacementDump, SceneError> {
        let node = self.live_node(id)?;
        let source = match &node.data {
            NodeData::Part(p) => DumpSource::Part {
                catalog: p.definition.catalog.clone(),
                name: p.definition.name.clone(),
            },
            NodeData::Assembly(_) => DumpSource::Assembly {
                name: node.name.clone(),
            },
        };
        let local = self.local_transform(id)?;
        Ok(PlacementDump {
            source,
            rotation: rotation_for(&local),
            origin: local.origin(),
        })
    }
}
