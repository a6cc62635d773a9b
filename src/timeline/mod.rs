//! Scene timelines: the boundary model and the frame-level validator.

/// Scene, element and animation spec types (serde boundary).
pub mod model;
/// Overlap/gap/timing validation and spatial collision checks.
pub mod validate;
