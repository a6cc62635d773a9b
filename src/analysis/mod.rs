//! Scene content analysis and frame budgeting.

/// Keyword extraction, energy scoring and scene-to-scene similarity.
pub mod content;
/// Total duration from scene count and transition length.
pub mod duration;
