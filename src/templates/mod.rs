//! Template catalog and request-to-template scoring.

/// Template records and the built-in catalog.
pub mod catalog;
/// Request analysis and weighted template ranking.
pub mod scoring;
