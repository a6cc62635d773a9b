//! Shared primitives: frame/time types and the error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
