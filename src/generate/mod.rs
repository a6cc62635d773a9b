//! Spec synthesis and code emission.
//!
//! Code is only emitted for specs that pass [`crate::enforce::rules::enforce_learned_rules_with`].

/// `{{PLACEHOLDER}}` substitution for template skeletons.
pub mod codegen;
/// The integrated generator.
pub mod generator;
