//! The enforcement gate.
//!
//! Folds the timeline validator's findings together with the learned hard constraints (entry
//! transitions, motion blur, scale isolation, shot scale ceiling) into one pass/fail result.
//! The generator consults this and nothing else before emitting code.

use crate::config::PolicyConfig;
use crate::timeline::model::{AnimationSpec, TransformLevel};
use crate::timeline::validate::{
    ValidationErrorKind, ValidationResult, ValidationWarning, WarningKind,
    validate_animation_with,
};
use crate::transform::isolation::{
    ScaleEntry, TransformKind, calculate_compound_scale, validate_transform,
};

/// Blocking violation categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Timeline overlap.
    Overlap,
    /// Timeline gap.
    Gap,
    /// Malformed timing.
    InvalidTiming,
    /// Transition without exit frames.
    MissingExit,
    /// A non-first scene enters silently.
    NoEntryTransition,
    /// A fast element has no motion blur.
    MissingMotionBlur,
    /// Scale applied below shot level.
    ScaleIsolationViolation,
    /// Shot scale above the learned ceiling.
    ScaleExceedsCeiling,
}

impl ViolationKind {
    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::Gap => "gap",
            Self::InvalidTiming => "invalid-timing",
            Self::MissingExit => "missing-exit",
            Self::NoEntryTransition => "no-entry-transition",
            Self::MissingMotionBlur => "missing-motion-blur",
            Self::ScaleIsolationViolation => "scale-isolation-violation",
            Self::ScaleExceedsCeiling => "scale-exceeds-ceiling",
        }
    }
}

impl From<ValidationErrorKind> for ViolationKind {
    fn from(kind: ValidationErrorKind) -> Self {
        match kind {
            ValidationErrorKind::Overlap => Self::Overlap,
            ValidationErrorKind::Gap => Self::Gap,
            ValidationErrorKind::InvalidTiming => Self::InvalidTiming,
            ValidationErrorKind::MissingExit => Self::MissingExit,
        }
    }
}

/// One blocking finding.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Category.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
    /// Scenes involved.
    pub scenes: Vec<String>,
    /// Index of the offending element within its scene, when element-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<usize>,
    /// Frames involved, for timeline violations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<u64>,
}

/// Outcome of [`enforce_learned_rules`]. Stricter than [`ValidationResult`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EnforcementResult {
    /// `true` iff `violations` is empty.
    pub valid: bool,
    /// Blocking findings.
    pub violations: Vec<Violation>,
    /// Advisory findings.
    pub warnings: Vec<ValidationWarning>,
    /// Suggested fixes, one per distinct problem.
    pub recommendations: Vec<String>,
}

impl EnforcementResult {
    /// Violations of one kind.
    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

/// Run the gate with the default policy.
pub fn enforce_learned_rules(spec: &AnimationSpec) -> EnforcementResult {
    enforce_learned_rules_with(spec, &PolicyConfig::default())
}

/// Run the gate: timeline validation plus every learned constraint.
#[tracing::instrument(skip(spec, policy), fields(scenes = spec.scenes.len()))]
pub fn enforce_learned_rules_with(spec: &AnimationSpec, policy: &PolicyConfig) -> EnforcementResult {
    let definitions = spec.definitions();
    let timeline = validate_animation_with(&definitions, policy);

    let mut violations = Vec::new();
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    fold_timeline(timeline, &mut violations, &mut warnings);

    let max_end = spec.max_end_frame();
    if max_end > spec.total_duration {
        violations.push(Violation {
            kind: ViolationKind::InvalidTiming,
            message: format!(
                "scenes run until frame {max_end} but the total duration is {}",
                spec.total_duration
            ),
            scenes: Vec::new(),
            element: None,
            frames: (spec.total_duration..max_end).collect(),
        });
        recommendations.push(format!("set totalDuration to at least {max_end}"));
    }

    for (scene_index, scene) in spec.scenes.iter().enumerate() {
        let def = &scene.definition;
        if scene_index > 0 && def.entry_transition.is_none() {
            violations.push(Violation {
                kind: ViolationKind::NoEntryTransition,
                message: format!(
                    "scene '{}' has no entry transition; only the first scene may enter silently",
                    def.name
                ),
                scenes: vec![def.name.clone()],
                element: None,
                frames: Vec::new(),
            });
            recommendations.push(format!(
                "give scene '{}' an entry transition matching the previous scene's exit",
                def.name
            ));
        }

        let mut chain = Vec::new();
        for (element_index, element) in scene.elements.iter().enumerate() {
            check_motion_blur(
                def.name.as_str(),
                element_index,
                element,
                policy,
                &mut violations,
                &mut recommendations,
            );

            let Some(scale) = element.effective_scale() else {
                continue;
            };
            chain.push(ScaleEntry {
                level: element.level,
                scale,
            });
            if element.level == TransformLevel::Shot {
                if scale > policy.shot_scale_ceiling {
                    violations.push(Violation {
                        kind: ViolationKind::ScaleExceedsCeiling,
                        message: format!(
                            "scene '{}' shot scale {scale} exceeds the {}x ceiling",
                            def.name, policy.shot_scale_ceiling
                        ),
                        scenes: vec![def.name.clone()],
                        element: Some(element_index),
                        frames: Vec::new(),
                    });
                    recommendations.push(format!(
                        "cap the shot scale in scene '{}' at {}",
                        def.name, policy.shot_scale_ceiling
                    ));
                }
            } else {
                let check = validate_transform(element.level, TransformKind::Scale);
                if !check.allowed {
                    violations.push(Violation {
                        kind: ViolationKind::ScaleIsolationViolation,
                        message: format!(
                            "scene '{}' {} '{}' is scaled to {scale}: {}",
                            def.name, element.level, element.kind, check.reason
                        ),
                        scenes: vec![def.name.clone()],
                        element: Some(element_index),
                        frames: Vec::new(),
                    });
                    recommendations.push(format!(
                        "move the scale on {} '{}' in scene '{}' up to the shot",
                        element.level, element.kind, def.name
                    ));
                }
            }
        }

        let compound = calculate_compound_scale(&chain);
        if !compound.is_safe {
            warnings.push(ValidationWarning {
                kind: WarningKind::CompoundScale,
                message: format!("scene '{}': {}", def.name, compound.recommendation),
                affected_frames: Vec::new(),
                affected_scenes: vec![def.name.clone()],
            });
        }
    }

    recommendations.dedup();
    let valid = violations.is_empty();
    if valid {
        tracing::debug!(warnings = warnings.len(), "enforcement passed");
    } else {
        tracing::info!(
            violations = violations.len(),
            warnings = warnings.len(),
            "enforcement rejected spec"
        );
    }

    EnforcementResult {
        valid,
        violations,
        warnings,
        recommendations,
    }
}

fn fold_timeline(
    timeline: ValidationResult,
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<ValidationWarning>,
) {
    for e in timeline.errors {
        violations.push(Violation {
            kind: e.kind.into(),
            message: e.message,
            scenes: e.affected_scenes,
            element: None,
            frames: e.affected_frames,
        });
    }
    warnings.extend(timeline.warnings);
}

fn check_motion_blur(
    scene: &str,
    element_index: usize,
    element: &crate::timeline::model::ElementSpec,
    policy: &PolicyConfig,
    violations: &mut Vec<Violation>,
    recommendations: &mut Vec<String>,
) {
    let Some(velocity) = element.velocity else {
        return;
    };
    let threshold = policy.motion_blur_threshold_for(element.size_px());
    if velocity.abs() <= threshold || element.has_motion_blur {
        return;
    }
    violations.push(Violation {
        kind: ViolationKind::MissingMotionBlur,
        message: format!(
            "scene '{scene}' {} '{}' moves at {velocity} px/frame (threshold {threshold:.1}) \
             without motion blur",
            element.level, element.kind
        ),
        scenes: vec![scene.to_string()],
        element: Some(element_index),
        frames: Vec::new(),
    });
    recommendations.push(format!(
        "add motion blur to '{}' (element {element_index}) in scene '{scene}'",
        element.kind
    ));
}

#[cfg(test)]
#[path = "../../tests/unit/enforce/rules.rs"]
mod tests;
