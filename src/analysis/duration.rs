use crate::config::PolicyConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{FramegateError, FramegateResult};

/// Frame budget for a scene sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DurationPlan {
    /// `scene_frames + transition_frames`.
    pub total_frames: u64,
    /// `total_frames` at the plan's frame rate.
    pub total_seconds: f64,
    /// Frames spent holding scenes.
    pub scene_frames: u64,
    /// Frames spent in transitions.
    pub transition_frames: u64,
    /// The arithmetic, spelled out.
    pub formula: String,
}

/// `scene_count * frames_per_scene + (scene_count - 1) * transition_frames` at 30 fps.
pub fn synthesize_duration(
    scene_count: u32,
    frames_per_scene: u32,
    transition_frames: u32,
) -> FramegateResult<DurationPlan> {
    synthesize_duration_at(scene_count, frames_per_scene, transition_frames, Fps::default())
}

/// [`synthesize_duration`] using the policy's pacing and frame rate.
pub fn synthesize_duration_with(
    scene_count: u32,
    policy: &PolicyConfig,
) -> FramegateResult<DurationPlan> {
    synthesize_duration_at(
        scene_count,
        policy.frames_per_scene,
        policy.transition_frames,
        policy.fps,
    )
}

/// Duration formula at an explicit frame rate.
pub fn synthesize_duration_at(
    scene_count: u32,
    frames_per_scene: u32,
    transition_frames: u32,
    fps: Fps,
) -> FramegateResult<DurationPlan> {
    if scene_count == 0 {
        return Err(FramegateError::validation("scene count must be > 0"));
    }
    let n = u64::from(scene_count);
    let scene_frames = n * u64::from(frames_per_scene);
    let transitions = n - 1;
    let transition_total = transitions * u64::from(transition_frames);
    let total_frames = scene_frames + transition_total;

    Ok(DurationPlan {
        total_frames,
        total_seconds: fps.frames_to_secs(total_frames),
        scene_frames,
        transition_frames: transition_total,
        formula: format!(
            "{n} scenes x {frames_per_scene} frames + {transitions} transitions x \
             {transition_frames} frames = {total_frames} frames"
        ),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/duration.rs"]
mod tests;
