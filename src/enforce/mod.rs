/// Learned hard constraints layered on top of timeline validation.
pub mod rules;
