//! Global constants for kit-core

/// Decimal digits kept when snapping coordinates, normals and angles
pub const ROUND_TO_DIGITS: i32 = 5;

/// Tolerance for comparing snapped values (half a unit in the last kept digit)
pub const EPSILON: f64 = 0.5e-5;

/// Fastener pattern used when none is given: every matched pair gets fasteners
pub const DEFAULT_PATTERN: &str = "1";

/// Layer assigned to freshly instanced parts
pub const DEFAULT_LAYER: &str = "Layer0";

/// Separator between catalog and part name in qualified definition names
pub const QUALIFIED_NAME_SEPARATOR: &str = "::";
