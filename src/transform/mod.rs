//! Transform isolation across the shot/element/child hierarchy.

/// Rule table, compound-scale math and the isolated transform builder.
pub mod isolation;
