//! Kit assembly core
//!
//! This crate builds mechanical assemblies from reusable part definitions:
//! - Transform: affine placement with composition and inversion
//! - Scene: arena of parts and assemblies with cached world transforms
//! - Cell: grid addressing in a node's own axis units
//! - Orientation solver and attachment resolver on top of the scene
//! - Catalog and GeometryHost: the collaborators the scene drives
//! - Camera, BOM and placement dump for instruction output

pub mod camera;
pub mod catalog;
pub mod cell;
pub mod config;
pub mod constants;
pub mod definition;
pub mod handle;
pub mod host;
pub mod interface;
pub mod placement;
pub mod precision;
pub mod scene;
pub mod transform;

pub use camera::*;
pub use catalog::*;
pub use cell::*;
pub use config::*;
pub use constants::*;
pub use definition::*;
pub use handle::*;
pub use host::*;
pub use interface::*;
pub use placement::*;
pub use precision::*;
pub use scene::*;
pub use transform::*;
