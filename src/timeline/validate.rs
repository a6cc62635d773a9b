//! Frame-accurate timeline checks.
//!
//! The validator sweeps every frame in `0..max(end_frame)` and partitions scenes into fully
//! active and transitioning sets. At most one scene may be fully active at any frame. Gap,
//! timing and warning checks run as separate passes. Nothing here returns an error: every
//! defect is reported in the [`ValidationResult`]. A timeline longer than
//! `max_timeline_frames` is reported as invalid timing and not swept.

use std::collections::BTreeMap;

use crate::config::PolicyConfig;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::timeline::model::{ElementSpec, SceneDefinition};

/// Blocking timeline defect categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    /// Two or more scenes fully visible at the same frame.
    Overlap,
    /// Frames where nothing is visible.
    Gap,
    /// Malformed timing on a single scene.
    InvalidTiming,
    /// A transition type with no exit tail before the next scene.
    MissingExit,
}

impl ValidationErrorKind {
    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::Gap => "gap",
            Self::InvalidTiming => "invalid-timing",
            Self::MissingExit => "missing-exit",
        }
    }
}

/// Advisory categories. Warnings never block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Two scenes share a long visible window.
    LongOverlap,
    /// A scene shorter than the minimum hold.
    ShortScene,
    /// Exit too quick, or too many exits at once.
    RapidTransition,
    /// Exit dragging longer than the maximum.
    SlowTransition,
    /// Scale applied at several nesting levels.
    CompoundScale,
}

impl WarningKind {
    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LongOverlap => "long-overlap",
            Self::ShortScene => "short-scene",
            Self::RapidTransition => "rapid-transition",
            Self::SlowTransition => "slow-transition",
            Self::CompoundScale => "compound-scale",
        }
    }
}

/// One blocking timeline defect.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Defect category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Every frame the defect covers.
    pub affected_frames: Vec<u64>,
    /// Every scene involved.
    pub affected_scenes: Vec<String>,
}

/// One advisory finding.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    /// Finding category.
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: String,
    /// Frames involved, when the finding is frame-specific.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_frames: Vec<u64>,
    /// Scenes involved.
    pub affected_scenes: Vec<String>,
}

/// Per-frame sweep entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    /// Frame index.
    pub frame: u64,
    /// Scenes fully visible at this frame.
    pub active_scenes: Vec<String>,
    /// Scenes inside their exit tail at this frame.
    pub transitioning_scenes: Vec<String>,
    /// `false` when more than one scene is fully active.
    pub valid: bool,
}

/// Outcome of [`validate_animation`]. Built fresh per call and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    /// Blocking defects.
    pub errors: Vec<ValidationError>,
    /// Advisory findings.
    pub warnings: Vec<ValidationWarning>,
    /// One entry per frame `0..max_end`.
    pub frame_report: Vec<FrameReport>,
}

impl ValidationResult {
    /// Errors of one kind.
    pub fn errors_of(&self, kind: ValidationErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// Validate a scene list against the default policy.
pub fn validate_animation(scenes: &[SceneDefinition]) -> ValidationResult {
    validate_animation_with(scenes, &PolicyConfig::default())
}

/// Validate a scene list: frame sweep, gap pass and per-scene timing pass.
#[tracing::instrument(skip(scenes, policy), fields(scenes = scenes.len()))]
pub fn validate_animation_with(
    scenes: &[SceneDefinition],
    policy: &PolicyConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let max_end = scenes.iter().map(|s| s.end_frame).max().unwrap_or(0);
    let frame_report = if max_end > policy.max_timeline_frames {
        tracing::warn!(
            max_end,
            limit = policy.max_timeline_frames,
            "timeline too long to sweep"
        );
        errors.push(ValidationError {
            kind: ValidationErrorKind::InvalidTiming,
            message: format!(
                "timeline ends at frame {max_end}, beyond the {}-frame limit",
                policy.max_timeline_frames
            ),
            affected_frames: Vec::new(),
            affected_scenes: scenes
                .iter()
                .filter(|s| s.end_frame > policy.max_timeline_frames)
                .map(|s| s.name.clone())
                .collect(),
        });
        Vec::new()
    } else {
        check_scene_timing(scenes, policy, &mut errors, &mut warnings);
        let report = sweep_frames(scenes, max_end, policy, &mut errors, &mut warnings);
        check_gaps_and_exits(scenes, policy, &mut errors, &mut warnings);
        report
    };

    let valid = errors.is_empty();
    tracing::debug!(
        valid,
        errors = errors.len(),
        warnings = warnings.len(),
        "timeline validated"
    );
    ValidationResult {
        valid,
        errors,
        warnings,
        frame_report,
    }
}

fn check_scene_timing(
    scenes: &[SceneDefinition],
    policy: &PolicyConfig,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let mut seen = BTreeMap::<&str, usize>::new();
    for scene in scenes {
        *seen.entry(scene.name.as_str()).or_default() += 1;
    }
    for (name, count) in &seen {
        if *count > 1 {
            errors.push(ValidationError {
                kind: ValidationErrorKind::InvalidTiming,
                message: format!("scene name '{name}' is used by {count} scenes"),
                affected_frames: Vec::new(),
                affected_scenes: vec![(*name).to_string()],
            });
        }
    }

    for scene in scenes {
        let name = vec![scene.name.clone()];
        if scene.end_frame <= scene.start_frame {
            errors.push(ValidationError {
                kind: ValidationErrorKind::InvalidTiming,
                message: format!(
                    "scene '{}' ends at frame {} which is not after its start frame {}",
                    scene.name, scene.end_frame, scene.start_frame
                ),
                affected_frames: Vec::new(),
                affected_scenes: name,
            });
            continue;
        }

        let duration = scene.duration_frames();
        if scene.exit_duration > duration {
            errors.push(ValidationError {
                kind: ValidationErrorKind::InvalidTiming,
                message: format!(
                    "scene '{}' exit lasts {} frames but the scene only lasts {}",
                    scene.name, scene.exit_duration, duration
                ),
                affected_frames: scene.range().frames().map(|f| f.0).collect(),
                affected_scenes: name.clone(),
            });
        }
        if scene.exit_type.is_hard_cut() && scene.exit_duration > 0 {
            errors.push(ValidationError {
                kind: ValidationErrorKind::InvalidTiming,
                message: format!(
                    "scene '{}' hard-cuts but declares a {}-frame exit",
                    scene.name, scene.exit_duration
                ),
                affected_frames: scene.exit_range().frames().map(|f| f.0).collect(),
                affected_scenes: name.clone(),
            });
        }

        if !scene.exit_type.is_hard_cut() && scene.exit_duration > 0 {
            if scene.exit_duration < policy.min_exit_frames {
                warnings.push(ValidationWarning {
                    kind: WarningKind::RapidTransition,
                    message: format!(
                        "scene '{}' {} exit is too fast ({} < {} frames)",
                        scene.name, scene.exit_type, scene.exit_duration, policy.min_exit_frames
                    ),
                    affected_frames: Vec::new(),
                    affected_scenes: name.clone(),
                });
            } else if scene.exit_duration > policy.max_exit_frames {
                warnings.push(ValidationWarning {
                    kind: WarningKind::SlowTransition,
                    message: format!(
                        "scene '{}' {} exit is too slow ({} > {} frames)",
                        scene.name, scene.exit_type, scene.exit_duration, policy.max_exit_frames
                    ),
                    affected_frames: Vec::new(),
                    affected_scenes: name.clone(),
                });
            }
        }

        if duration < policy.min_scene_frames {
            warnings.push(ValidationWarning {
                kind: WarningKind::ShortScene,
                message: format!(
                    "scene '{}' is short ({} < {} frames)",
                    scene.name, duration, policy.min_scene_frames
                ),
                affected_frames: Vec::new(),
                affected_scenes: name,
            });
        }
    }
}

/// A maximal run of consecutive frames sharing the same offending scene set.
struct Run {
    scenes: Vec<usize>,
    frames: Vec<u64>,
}

fn sweep_frames(
    scenes: &[SceneDefinition],
    max_end: u64,
    policy: &PolicyConfig,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<FrameReport> {
    let mut report = Vec::with_capacity(usize::try_from(max_end).unwrap_or(0));

    let mut overlap_run: Option<Run> = None;
    let mut crowd_run: Option<Run> = None;

    for f in 0..max_end {
        let frame = FrameIndex(f);
        let mut active = Vec::new();
        let mut transitioning = Vec::new();
        for (i, scene) in scenes.iter().enumerate() {
            if scene.fully_active_range().contains(frame) {
                active.push(i);
            } else if scene.exit_range().contains(frame) {
                transitioning.push(i);
            }
        }

        let valid = active.len() <= 1;
        track_run(
            &mut overlap_run,
            (!valid).then(|| active.clone()),
            f,
            |run| errors.push(overlap_error(scenes, run)),
        );
        track_run(
            &mut crowd_run,
            (transitioning.len() > policy.max_simultaneous_transitions)
                .then(|| transitioning.clone()),
            f,
            |run| warnings.push(crowding_warning(scenes, run)),
        );

        report.push(FrameReport {
            frame: f,
            active_scenes: active.iter().map(|&i| scenes[i].name.clone()).collect(),
            transitioning_scenes: transitioning
                .iter()
                .map(|&i| scenes[i].name.clone())
                .collect(),
            valid,
        });
    }

    if let Some(run) = overlap_run.take() {
        errors.push(overlap_error(scenes, run));
    }
    if let Some(run) = crowd_run.take() {
        warnings.push(crowding_warning(scenes, run));
    }

    report
}

fn track_run(
    current: &mut Option<Run>,
    offending: Option<Vec<usize>>,
    frame: u64,
    mut flush: impl FnMut(Run),
) {
    let extends = matches!(
        (current.as_ref(), offending.as_ref()),
        (Some(run), Some(set)) if &run.scenes == set
    );
    if extends {
        if let Some(run) = current.as_mut() {
            run.frames.push(frame);
        }
        return;
    }
    if let Some(run) = current.take() {
        flush(run);
    }
    if let Some(set) = offending {
        *current = Some(Run {
            scenes: set,
            frames: vec![frame],
        });
    }
}

fn overlap_error(scenes: &[SceneDefinition], run: Run) -> ValidationError {
    let names: Vec<String> = run.scenes.iter().map(|&i| scenes[i].name.clone()).collect();
    ValidationError {
        kind: ValidationErrorKind::Overlap,
        message: format!(
            "scenes {} are fully visible at the same time during frames {}",
            names.join(", "),
            describe_frames(&run.frames)
        ),
        affected_frames: run.frames,
        affected_scenes: names,
    }
}

fn crowding_warning(scenes: &[SceneDefinition], run: Run) -> ValidationWarning {
    let names: Vec<String> = run.scenes.iter().map(|&i| scenes[i].name.clone()).collect();
    ValidationWarning {
        kind: WarningKind::RapidTransition,
        message: format!(
            "{} scenes ({}) are transitioning at once during frames {}",
            names.len(),
            names.join(", "),
            describe_frames(&run.frames)
        ),
        affected_frames: run.frames,
        affected_scenes: names,
    }
}

fn describe_frames(frames: &[u64]) -> String {
    match (frames.first(), frames.last()) {
        (Some(a), Some(b)) if a == b => a.to_string(),
        (Some(a), Some(b)) => format!("{a}-{b}"),
        _ => String::new(),
    }
}

fn check_gaps_and_exits(
    scenes: &[SceneDefinition],
    policy: &PolicyConfig,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    // Stable sort keeps input order for equal start frames.
    let mut order: Vec<&SceneDefinition> = scenes
        .iter()
        .filter(|s| s.end_frame > s.start_frame)
        .collect();
    order.sort_by_key(|s| s.start_frame);

    let mut covered_until = 0u64;
    let mut latest: Option<&SceneDefinition> = None;
    for (idx, scene) in order.iter().enumerate() {
        if let Some(prev) = latest {
            if scene.start_frame > covered_until {
                let gap = FrameRange::saturating(covered_until, scene.start_frame);
                errors.push(ValidationError {
                    kind: ValidationErrorKind::Gap,
                    message: format!(
                        "{} empty frame(s) between '{}' and '{}' (frames {})",
                        gap.len_frames(),
                        prev.name,
                        scene.name,
                        describe_frames(&[gap.start.0, gap.end.0 - 1])
                    ),
                    affected_frames: gap.frames().map(|f| f.0).collect(),
                    affected_scenes: vec![prev.name.clone(), scene.name.clone()],
                });
            }

            let shared = prev.range().intersect(scene.range());
            if shared.len_frames() > policy.long_overlap_frames {
                warnings.push(ValidationWarning {
                    kind: WarningKind::LongOverlap,
                    message: format!(
                        "'{}' and '{}' share {} visible frames (> {})",
                        prev.name,
                        scene.name,
                        shared.len_frames(),
                        policy.long_overlap_frames
                    ),
                    affected_frames: shared.frames().map(|f| f.0).collect(),
                    affected_scenes: vec![prev.name.clone(), scene.name.clone()],
                });
            }
        }

        let has_successor = idx + 1 < order.len();
        if has_successor && !scene.exit_type.is_hard_cut() && scene.exit_duration == 0 {
            errors.push(ValidationError {
                kind: ValidationErrorKind::MissingExit,
                message: format!(
                    "scene '{}' exits with {} but has no exit frames",
                    scene.name, scene.exit_type
                ),
                affected_frames: vec![scene.end_frame - 1],
                affected_scenes: vec![scene.name.clone()],
            });
        }

        if scene.end_frame >= covered_until {
            covered_until = scene.end_frame;
            latest = Some(scene);
        }
    }
}

/// Intersection between two element bounding boxes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Collision {
    /// Index of the first element.
    pub a: usize,
    /// Index of the second element.
    pub b: usize,
    /// Label of the first element.
    pub a_label: String,
    /// Label of the second element.
    pub b_label: String,
    /// Overlap area in square pixels.
    pub area: f64,
}

/// Pairwise bounding-box intersection test for elements sampled at one frame.
///
/// This is a diagnostic. It does not feed the pass/fail gate.
pub fn check_spatial_collisions(elements: &[ElementSpec]) -> Vec<Collision> {
    let mut out = Vec::new();
    for (i, a) in elements.iter().enumerate() {
        let ra = a.bounds();
        for (j, b) in elements.iter().enumerate().skip(i + 1) {
            let overlap = ra.intersect(b.bounds());
            let area = overlap.area();
            if overlap.width() > 0.0 && overlap.height() > 0.0 && area > 0.0 {
                out.push(Collision {
                    a: i,
                    b: j,
                    a_label: format!("{}#{i}", a.kind),
                    b_label: format!("{}#{j}", b.kind),
                    area,
                });
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/validate.rs"]
mod tests;
