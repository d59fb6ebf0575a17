//! Screenshot staging for assembly instructions
//!
//! A [`Camera`] decides what is visible and where the eye sits; the image
//! itself is produced by an external [`Viewport`]. Every shot is recorded in
//! a [`ShotLog`], which owns the sequence numbering.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::host::{EntityId, GeometryHost, MemoryHost};
use crate::scene::{NodeId, Scene, SceneError};

/// File listing shot stems in order, one per line
pub const STEPS_FILE: &str = "@steps.txt";

/// Camera defaults, shared by value with every camera built from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Shots are only taken when set
    pub can_shoot: bool,
    pub eye: DVec3,
    pub target: DVec3,
    pub up: DVec3,
    pub perspective: bool,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            can_shoot: false,
            eye: DVec3::new(100.0, -100.0, 100.0),
            target: DVec3::ZERO,
            up: DVec3::Z,
            perspective: true,
            image_width: 720,
            image_height: 480,
        }
    }
}

/// Eye placement handed to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub eye: DVec3,
    pub target: DVec3,
    pub up: DVec3,
    pub perspective: bool,
}

impl From<&CameraConfig> for CameraView {
    fn from(config: &CameraConfig) -> Self {
        Self {
            eye: config.eye,
            target: config.target,
            up: config.up,
            perspective: config.perspective,
        }
    }
}

/// One capture request
#[derive(Debug, Clone, PartialEq)]
pub struct Shot<'a> {
    pub view: CameraView,
    /// Entity to zoom to; `None` frames the whole scene
    pub subject: Option<EntityId>,
    pub file_stem: &'a str,
    pub width: u32,
    pub height: u32,
}

/// Renders and stores an image of the host's current state
pub trait Viewport<H: GeometryHost = MemoryHost> {
    fn capture(&mut self, host: &H, shot: &Shot<'_>) -> Result<(), SceneError>;
}

/// A shot that was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub sequence: u32,
    pub file_stem: String,
    pub subject: Option<String>,
    pub description: Option<String>,
}

/// Ordered record of the shots of one build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotLog {
    records: Vec<ShotRecord>,
}

impl ShotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ShotRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `001`, or `001-Subject-Name` when there is a subject
    fn next_stem(&self, subject: Option<&str>) -> (u32, String) {
        let sequence = self.records.len() as u32 + 1;
        let stem = match subject {
            Some(name) => format!("{:03}-{}", sequence, name.replace(' ', "-")),
            None => format!("{sequence:03}"),
        };
        (sequence, stem)
    }

    fn push(&mut self, record: ShotRecord) {
        self.records.push(record);
    }

    /// File stems in shot order
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.file_stem.as_str())
    }

    /// Write the steps file and a `<stem>.txt` for every described shot
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<(), SceneError> {
        let dir = dir.as_ref();
        let mut steps = String::new();
        for record in &self.records {
            steps.push_str(&record.file_stem);
            steps.push('\n');
            if let Some(description) = &record.description {
                std::fs::write(dir.join(format!("{}.txt", record.file_stem)), format!("{description}\n"))
                    .map_err(|e| SceneError::Io(e.to_string()))?;
            }
        }
        std::fs::write(dir.join(STEPS_FILE), steps).map_err(|e| SceneError::Io(e.to_string()))
    }
}

/// A named camera with its own view and subject
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    config: CameraConfig,
    view: CameraView,
    subject: Option<NodeId>,
}

impl Camera {
    pub fn new(name: impl Into<String>, config: &CameraConfig) -> Self {
        Self {
            name: name.into(),
            config: config.clone(),
            view: CameraView::from(config),
            subject: None,
        }
    }

    pub fn view(&self) -> &CameraView {
        &self.view
    }

    pub fn subject(&self) -> Option<NodeId> {
        self.subject
    }

    /// Point the camera
    pub fn set(&mut self, eye: impl Into<DVec3>, target: impl Into<DVec3>, up: impl Into<DVec3>) -> &mut Self {
        self.view.eye = eye.into();
        self.view.target = target.into();
        self.view.up = up.into();
        self
    }

    /// Projection for the next shot only
    pub fn perspective(&mut self, perspective: bool) -> &mut Self {
        self.view.perspective = perspective;
        self
    }

    /// Choose what the next shot isolates; `None` frames everything
    pub fn set_subject<H: GeometryHost>(
        &mut self,
        scene: &Scene<H>,
        subject: Option<NodeId>,
    ) -> Result<&mut Self, SceneError> {
        if let Some(id) = subject {
            scene
                .live_node(id)
                .map_err(|_| SceneError::InvalidCameraSubject(id))?;
        }
        self.subject = subject;
        Ok(self)
    }

    /// Take a shot if shooting is enabled, returning its file stem.
    ///
    /// With a subject, every other top-level node is hidden while the
    /// viewport captures, then everything live is shown again.
    pub fn shoot<H: GeometryHost, V: Viewport<H>>(
        &mut self,
        scene: &mut Scene<H>,
        viewport: &mut V,
        log: &mut ShotLog,
        description: Option<&str>,
    ) -> Result<Option<String>, SceneError> {
        if !self.config.can_shoot {
            return Ok(None);
        }

        let subject = match self.subject {
            Some(id) => {
                let node = scene
                    .live_node(id)
                    .map_err(|_| SceneError::InvalidCameraSubject(id))?;
                Some((id, node.name.clone(), node.entity()))
            }
            None => None,
        };
        let (sequence, file_stem) = log.next_stem(subject.as_ref().map(|(_, name, _)| name.as_str()));
        let shot = Shot {
            view: self.view,
            subject: subject.as_ref().map(|(_, _, entity)| *entity),
            file_stem: &file_stem,
            width: self.config.image_width,
            height: self.config.image_height,
        };

        let captured = match &subject {
            Some((id, name, _)) => {
                let roots: Vec<NodeId> = scene.roots().map(|n| n.id).collect();
                for root in roots {
                    scene.hide(root);
                }
                for node in scene.ancestry(*id)? {
                    scene.show(node);
                }
                let captured = viewport.capture(scene.host(), &shot);
                let live: Vec<NodeId> = scene.nodes().map(|n| n.id).collect();
                for node in live {
                    scene.show(node);
                }
                if captured.is_ok() {
                    tracing::info!("Screenshot {} taken, subject: {}", file_stem, name);
                }
                captured
            }
            None => {
                let captured = viewport.capture(scene.host(), &shot);
                if captured.is_ok() {
                    tracing::info!("Screenshot {} taken", file_stem);
                }
                captured
            }
        };
        self.view.perspective = self.config.perspective;
        captured?;

        log.push(ShotRecord {
            sequence,
            file_stem: file_stem.clone(),
            subject: subject.map(|(_, name, _)| name),
            description: description.map(str::to_string),
        });
        Ok(Some(file_stem))
    }
}
