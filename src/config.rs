//! Policy configuration.
//!
//! Every threshold the validator, enforcement engine and generator use is an empirically tuned
//! constant, not physics. They live here as named policy so deployments can tighten or relax
//! them without touching the algorithms.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{FramegateError, FramegateResult};

/// Default velocity (px/frame) above which a reference-sized element needs motion blur.
pub const DEFAULT_MOTION_BLUR_VELOCITY: f64 = 3.0;
/// Default element size (px, longest edge) at which the velocity threshold applies unscaled.
pub const DEFAULT_MOTION_BLUR_REFERENCE_SIZE: f64 = 100.0;
/// Default maximum scale permitted on a shot-level element.
pub const DEFAULT_SHOT_SCALE_CEILING: f64 = 1.21;
/// Default sweep limit: one hour at 30 fps.
pub const DEFAULT_MAX_TIMELINE_FRAMES: u64 = 108_000;
/// Largest sweep limit a policy may configure.
pub const MAX_TIMELINE_FRAMES_CEILING: u64 = 10_000_000;
/// Default frames each scene holds in the duration formula.
pub const DEFAULT_FRAMES_PER_SCENE: u32 = 75;
/// Default frames each transition adds in the duration formula.
pub const DEFAULT_TRANSITION_FRAMES: u32 = 15;

/// Tunable thresholds shared by the analysis, validation, enforcement and generation passes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Velocity threshold (px/frame) for a reference-sized element.
    pub motion_blur_velocity_px_per_frame: f64,
    /// Longest edge (px) at which the velocity threshold is used as-is; larger elements scale it.
    pub motion_blur_reference_size_px: f64,
    /// Maximum scale allowed on a shot-level element.
    pub shot_scale_ceiling: f64,
    /// Exits shorter than this (and non-zero) are flagged as rapid.
    pub min_exit_frames: u64,
    /// Exits longer than this are flagged as slow.
    pub max_exit_frames: u64,
    /// Scenes shorter than this are flagged as short.
    pub min_scene_frames: u64,
    /// More scenes than this transitioning at one frame is flagged.
    pub max_simultaneous_transitions: usize,
    /// Overlap windows longer than this between two scenes are flagged.
    pub long_overlap_frames: u64,
    /// Hold per scene in the duration formula.
    pub frames_per_scene: u32,
    /// Transition length in the duration formula.
    pub transition_frames: u32,
    /// Timeline frame rate.
    pub fps: Fps,
    /// Energy delta between consecutive scenes above which the generator hard-cuts.
    pub energy_cut_threshold: f64,
    /// Keyword similarity at or above which the generator crossfades.
    pub similarity_crossfade_threshold: f64,
    /// Inclusive `[min, max]` bounds of the recommended scene hold, in frames.
    pub recommended_duration_range: [u64; 2],
    /// Longest timeline the validator will sweep frame by frame.
    pub max_timeline_frames: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            motion_blur_velocity_px_per_frame: DEFAULT_MOTION_BLUR_VELOCITY,
            motion_blur_reference_size_px: DEFAULT_MOTION_BLUR_REFERENCE_SIZE,
            shot_scale_ceiling: DEFAULT_SHOT_SCALE_CEILING,
            min_exit_frames: 10,
            max_exit_frames: 30,
            min_scene_frames: 30,
            max_simultaneous_transitions: 2,
            long_overlap_frames: 30,
            frames_per_scene: DEFAULT_FRAMES_PER_SCENE,
            transition_frames: DEFAULT_TRANSITION_FRAMES,
            fps: Fps::default(),
            energy_cut_threshold: 0.3,
            similarity_crossfade_threshold: 0.3,
            recommended_duration_range: [60, 120],
            max_timeline_frames: DEFAULT_MAX_TIMELINE_FRAMES,
        }
    }
}

impl PolicyConfig {
    /// Parse a policy from a JSON reader. Missing fields keep their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramegateResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| FramegateError::serde(format!("parse policy JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a policy from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramegateResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramegateError::validation(format!("open policy JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> FramegateResult<()> {
        for (name, v) in [
            (
                "motion_blur_velocity_px_per_frame",
                self.motion_blur_velocity_px_per_frame,
            ),
            (
                "motion_blur_reference_size_px",
                self.motion_blur_reference_size_px,
            ),
            ("shot_scale_ceiling", self.shot_scale_ceiling),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(FramegateError::validation(format!(
                    "policy {name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("energy_cut_threshold", self.energy_cut_threshold),
            (
                "similarity_crossfade_threshold",
                self.similarity_crossfade_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(FramegateError::validation(format!(
                    "policy {name} must be within [0, 1]"
                )));
            }
        }
        if self.min_exit_frames > self.max_exit_frames {
            return Err(FramegateError::validation(
                "policy min_exit_frames must be <= max_exit_frames",
            ));
        }
        let [lo, hi] = self.recommended_duration_range;
        if lo == 0 || lo > hi {
            return Err(FramegateError::validation(
                "policy recommended_duration_range must satisfy 0 < min <= max",
            ));
        }
        if self.frames_per_scene == 0 {
            return Err(FramegateError::validation(
                "policy frames_per_scene must be > 0",
            ));
        }
        if self.max_timeline_frames == 0 || self.max_timeline_frames > MAX_TIMELINE_FRAMES_CEILING {
            return Err(FramegateError::validation(format!(
                "policy max_timeline_frames must be within 1..={MAX_TIMELINE_FRAMES_CEILING}"
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }

    /// Velocity threshold for an element whose longest edge is `size_px`.
    ///
    /// Elements at or below the reference size use the base threshold; larger ones scale it
    /// linearly, since the same px/frame smears less on a large surface.
    pub fn motion_blur_threshold_for(&self, size_px: f64) -> f64 {
        let factor = if size_px.is_finite() {
            (size_px / self.motion_blur_reference_size_px).max(1.0)
        } else {
            1.0
        };
        self.motion_blur_velocity_px_per_frame * factor
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
