use crate::enforce::rules::EnforcementResult;

/// Convenience result type used across framegate.
pub type FramegateResult<T> = Result<T, FramegateError>;

/// Top-level error taxonomy used by framegate APIs.
///
/// Timeline defects are never reported through this type. Validators and the enforcement
/// engine return structured results; only malformed primitives, failed lookups and the
/// generator boundary produce errors.
#[derive(thiserror::Error, Debug)]
pub enum FramegateError {
    /// Invalid user-provided data (bad counts, malformed ranges, missing fields).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while analyzing request or scene content.
    #[error("analysis error: {0}")]
    Analysis(String),

    /// A keyed lookup found nothing (template id, palette style, ...).
    #[error("{kind} not found: '{key}'")]
    NotFound {
        /// What kind of entity was looked up.
        kind: &'static str,
        /// The key that missed.
        key: String,
    },

    /// The candidate spec failed the enforcement gate; no code was emitted.
    #[error("enforcement failed: {0}")]
    Enforcement(Box<EnforcementReport>),

    /// Errors reading, parsing or writing a workspace manifest.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramegateError {
    /// Build a [`FramegateError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramegateError::Analysis`] value.
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    /// Build a [`FramegateError::NotFound`] value.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Build a [`FramegateError::Manifest`] value.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Build a [`FramegateError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for [`FramegateError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Borrow the enforcement report when this is a failed gate.
    pub fn enforcement_report(&self) -> Option<&EnforcementReport> {
        match self {
            Self::Enforcement(report) => Some(report),
            _ => None,
        }
    }
}

/// Structured payload carried by [`FramegateError::Enforcement`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct EnforcementReport {
    /// Composition the rejected spec was generated for.
    pub composition: String,
    /// Full enforcement outcome, including every violation.
    pub result: EnforcementResult,
}

impl std::fmt::Display for EnforcementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' has {} blocking violation(s)",
            self.composition,
            self.result.violations.len()
        )?;
        for v in &self.result.violations {
            write!(f, "\n  - [{}] {}", v.kind.as_str(), v.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
