//! Face-to-direction orientation solver
//!
//! Requests are processed in order and every rotation is committed before
//! the next request is read. Satisfied target directions become constraints;
//! a rotation is only attempted while at most one direction is constrained,
//! and only about an axis that leaves that direction in place. Requests that
//! cannot be honoured are skipped and logged.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::host::GeometryHost;
use crate::precision::{approx_eq, is_parallel, snap, snap_vec, snapped_angle, vec_approx_eq};
use crate::transform::Transform;

use super::{NodeId, Pivot, Scene, SceneError};

/// One of a node's six local faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Left,
    Right,
    Front,
    Back,
    Bottom,
    Top,
}

impl Face {
    /// Local axis index and sign the face points along
    fn local_axis(self) -> (usize, f64) {
        match self {
            Face::Left => (0, -1.0),
            Face::Right => (0, 1.0),
            Face::Front => (1, -1.0),
            Face::Back => (1, 1.0),
            Face::Bottom => (2, -1.0),
            Face::Top => (2, 1.0),
        }
    }

    /// World direction of this face for a node placed at `world`
    pub fn direction_in(self, world: &Transform) -> DVec3 {
        let (index, sign) = self.local_axis();
        snap_vec(world.axis(index) * sign)
    }
}

/// One of the six canonical world directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Front,
    Back,
    Down,
    Up,
}

impl Direction {
    pub fn vector(self) -> DVec3 {
        match self {
            Direction::Left => DVec3::NEG_X,
            Direction::Right => DVec3::X,
            Direction::Front => DVec3::NEG_Y,
            Direction::Back => DVec3::Y,
            Direction::Down => DVec3::NEG_Z,
            Direction::Up => DVec3::Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseOrientError {
    #[error("Unknown face: '{0}'")]
    Face(String),
    #[error("Unknown direction: '{0}'")]
    Direction(String),
}

impl FromStr for Face {
    type Err = ParseOrientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "lt" => Ok(Face::Left),
            "right" | "rt" => Ok(Face::Right),
            "front" | "fr" => Ok(Face::Front),
            "back" | "bk" | "rear" | "re" | "rr" => Ok(Face::Back),
            "bottom" | "bm" | "bt" | "dn" => Ok(Face::Bottom),
            "top" | "tp" | "up" => Ok(Face::Top),
            _ => Err(ParseOrientError::Face(s.to_string())),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseOrientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "lt" => Ok(Direction::Left),
            "right" | "rt" => Ok(Direction::Right),
            "front" | "fr" => Ok(Direction::Front),
            "back" | "bk" => Ok(Direction::Back),
            "down" | "dn" => Ok(Direction::Down),
            "up" => Ok(Direction::Up),
            _ => Err(ParseOrientError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::Left => "left",
            Face::Right => "right",
            Face::Front => "front",
            Face::Back => "back",
            Face::Bottom => "bottom",
            Face::Top => "top",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Front => "front",
            Direction::Back => "back",
            Direction::Down => "down",
            Direction::Up => "up",
        };
        f.write_str(name)
    }
}

/// A rotation committed by the solver, about a world axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedRotation {
    pub axis: DVec3,
    pub degrees: f64,
}

fn constrain(constraints: &mut Vec<DVec3>, direction: DVec3) {
    if !constraints.iter().any(|c| vec_approx_eq(*c, direction)) {
        constraints.push(direction);
    }
}

impl<H: GeometryHost> Scene<H> {
    /// Orient with the configured pivot
    pub fn orient(&mut self, id: NodeId, requests: &[(Face, Direction)]) -> Result<Vec<AppliedRotation>, SceneError> {
        let pivot = self.config.orient.pivot;
        self.orient_with(id, requests, pivot)
    }

    /// Turn faces toward world directions, returning the rotations applied
    pub fn orient_with(
        &mut self,
        id: NodeId,
        requests: &[(Face, Direction)],
        pivot: Pivot,
    ) -> Result<Vec<AppliedRotation>, SceneError> {
        let label = self.live_node(id)?.label();
        let mut constraints: Vec<DVec3> = Vec::new();
        let mut applied = Vec::new();

        for &(face, direction) in requests {
            let world = self.world_transform(id)?;
            let from = face.direction_in(&world);
            let to = direction.vector();
            let angle = snapped_angle(from, to);

            let (axis, degrees) = if approx_eq(angle, 0.0) {
                constrain(&mut constraints, to);
                continue;
            } else if approx_eq(angle, snap(FRAC_PI_2)) {
                if constraints.len() > 1 {
                    tracing::warn!("{}: {} -> {} skipped, two directions already fixed", label, face, direction);
                    continue;
                }
                let axis = snap_vec(from.cross(to));
                if let Some(fixed) = constraints.first()
                    && !is_parallel(axis, *fixed)
                {
                    tracing::warn!("{}: {} -> {} skipped, would disturb a fixed direction", label, face, direction);
                    continue;
                }
                (axis, 90.0)
            } else if approx_eq(angle, snap(PI)) {
                if constraints.len() > 1 {
                    tracing::warn!("{}: {} -> {} skipped, two directions already fixed", label, face, direction);
                    continue;
                }
                let axis = match constraints.first() {
                    Some(fixed) => *fixed,
                    None => match (0..3).map(|i| world.axis(i)).find(|a| !is_parallel(*a, from)) {
                        Some(lateral) => snap_vec(lateral.normalize()),
                        None => continue,
                    },
                };
                if is_parallel(axis, from) {
                    tracing::warn!("{}: {} -> {} skipped, cannot flip about a fixed direction", label, face, direction);
                    continue;
                }
                (axis, 180.0)
            } else {
                tracing::warn!("{}: {} -> {} skipped, face is not axis aligned", label, face, direction);
                continue;
            };

            let point = self.pivot_point(id, pivot)?;
            self.rotate_about(id, point, axis, degrees)?;
            constrain(&mut constraints, to);
            tracing::debug!("{} oriented {} -> {}: {} deg about {:?}", label, face, direction, degrees, axis.to_array());
            applied.push(AppliedRotation { axis, degrees });
        }
        Ok(applied)
    }
}
