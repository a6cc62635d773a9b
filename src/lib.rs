//! Framegate generates animation timelines under hard, learned constraints.
//!
//! The pipeline is analyze, synthesize, validate, enforce, then emit:
//!
//! - Analyze scene text and score templates against a request
//! - Synthesize a deterministic frame budget and a candidate [`AnimationSpec`]
//! - Validate the timeline frame by frame ([`validate_animation`])
//! - Gate the candidate on every learned rule ([`enforce_learned_rules`])
//! - Emit code through a [`Generator`], which fails closed when the gate rejects
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Scene content analysis and duration synthesis.
pub mod analysis;
/// Brand palettes and extraction.
pub mod brand;
/// Tunable policy constants.
pub mod config;
/// Enforcement gate.
pub mod enforce;
/// Integrated generator and code emission.
pub mod generate;
/// Workspace manifest writer and poller.
pub mod manifest;
/// Template catalog and scoring.
pub mod templates;
/// Timeline model and validator.
pub mod timeline;
/// Transform isolation.
pub mod transform;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{EnforcementReport, FramegateError, FramegateResult};

pub use crate::analysis::content::{SceneAnalysis, analyze_scenes};
pub use crate::analysis::duration::{DurationPlan, synthesize_duration};
pub use crate::config::PolicyConfig;
pub use crate::enforce::rules::{EnforcementResult, Violation, ViolationKind, enforce_learned_rules};
pub use crate::generate::generator::{
    GeneratedAnimation, GenerationMetadata, GenerationRequest, Generator, Workspace,
};
pub use crate::manifest::poller::{DirectoryScanner, ManifestPoller, PollerOpts, SceneScanner};
pub use crate::manifest::record::{CompositionRecord, Manifest};
pub use crate::manifest::writer::{ManifestHandle, ManifestWriter, WriteOutcome};
pub use crate::templates::catalog::{TemplateCatalog, TemplateRecord};
pub use crate::templates::scoring::select_templates;
pub use crate::timeline::model::{
    AnimationSpec, ElementSpec, SceneDefinition, SceneSpec, TransformLevel, TransitionType,
};
pub use crate::timeline::validate::{ValidationResult, validate_animation};
pub use crate::transform::isolation::{
    IsolatedTransformBuilder, calculate_compound_scale, enforce_scale_isolation,
    validate_transform,
};
