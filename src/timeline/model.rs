use crate::foundation::core::FrameRange;

/// Exit/entry transition vocabulary shared by every scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionType {
    /// Wipe revealing toward the left edge.
    WipeLeft,
    /// Wipe revealing toward the right edge.
    WipeRight,
    /// Wipe revealing toward the top edge.
    WipeUp,
    /// Wipe revealing toward the bottom edge.
    WipeDown,
    /// Slide the outgoing scene upward.
    SlideUp,
    /// Slide the outgoing scene downward.
    SlideDown,
    /// Camera push into the scene.
    DollyIn,
    /// Camera pull away from the scene.
    DollyOut,
    /// Crossfade combined with a gentle scale.
    CrossfadeScale,
    /// Shrink the outgoing scene away.
    ScaleOut,
    /// Instant switch, no exit animation.
    HardCut,
}

impl TransitionType {
    /// Directional wipes, in the order the generator cycles through them.
    pub const WIPES: [Self; 4] = [Self::WipeLeft, Self::WipeUp, Self::WipeRight, Self::WipeDown];

    /// Stable kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WipeLeft => "wipe-left",
            Self::WipeRight => "wipe-right",
            Self::WipeUp => "wipe-up",
            Self::WipeDown => "wipe-down",
            Self::SlideUp => "slide-up",
            Self::SlideDown => "slide-down",
            Self::DollyIn => "dolly-in",
            Self::DollyOut => "dolly-out",
            Self::CrossfadeScale => "crossfade-scale",
            Self::ScaleOut => "scale-out",
            Self::HardCut => "hard-cut",
        }
    }

    /// `true` for the instant cut, which must carry a zero-length exit.
    pub fn is_hard_cut(self) -> bool {
        self == Self::HardCut
    }
}

impl std::fmt::Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scene enters. `None` serializes as `"none"`.
pub type EntryTransition = Option<TransitionType>;

/// One named segment of the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDefinition {
    /// Scene name, unique within a spec.
    pub name: String,
    /// First frame the scene is visible.
    pub start_frame: u64,
    /// Exclusive end frame.
    pub end_frame: u64,
    /// How the scene leaves.
    pub exit_type: TransitionType,
    /// Length of the exit tail in frames (0 for hard cuts).
    #[serde(default)]
    pub exit_duration: u64,
    /// How the scene arrives. `None` means a silent entrance.
    #[serde(default, with = "entry_transition")]
    pub entry_transition: EntryTransition,
}

impl SceneDefinition {
    /// Create a scene with no entry transition.
    pub fn new(
        name: impl Into<String>,
        start_frame: u64,
        end_frame: u64,
        exit_type: TransitionType,
        exit_duration: u64,
    ) -> Self {
        Self {
            name: name.into(),
            start_frame,
            end_frame,
            exit_type,
            exit_duration,
            entry_transition: None,
        }
    }

    /// Set the entry transition.
    pub fn with_entry(mut self, entry: TransitionType) -> Self {
        self.entry_transition = Some(entry);
        self
    }

    /// Number of frames the scene spans (0 when malformed).
    pub fn duration_frames(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    /// Whole visibility window `[start, end)`.
    pub fn range(&self) -> FrameRange {
        FrameRange::saturating(self.start_frame, self.end_frame)
    }

    /// Window where the scene is visible and not yet exiting: `[start, end - exit)`.
    pub fn fully_active_range(&self) -> FrameRange {
        let exit = self.exit_duration.min(self.duration_frames());
        FrameRange::saturating(self.start_frame, self.end_frame - exit)
    }

    /// Exit tail `[end - exit, end)`.
    pub fn exit_range(&self) -> FrameRange {
        let exit = self.exit_duration.min(self.duration_frames());
        FrameRange::saturating(self.end_frame - exit, self.end_frame)
    }
}

mod entry_transition {
    use super::TransitionType;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(v: &Option<TransitionType>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match v {
            Some(t) => s.serialize_str(t.as_str()),
            None => s.serialize_str("none"),
        }
    }

    pub(super) fn deserialize<'de, D>(d: D) -> Result<Option<TransitionType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Kind(TransitionType),
            Other(String),
        }

        match Option::<Repr>::deserialize(d)? {
            None => Ok(None),
            Some(Repr::Kind(t)) => Ok(Some(t)),
            Some(Repr::Other(s)) if s.trim().eq_ignore_ascii_case("none") => Ok(None),
            Some(Repr::Other(s)) => Err(serde::de::Error::custom(format!(
                "unknown entry transition '{s}'"
            ))),
        }
    }
}

/// Nesting level in the visual transform hierarchy, outer to inner.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TransformLevel {
    /// Whole-scene camera level.
    Shot,
    /// A visual element inside the shot.
    Element,
    /// A part nested inside an element.
    Child,
}

impl TransformLevel {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shot => "shot",
            Self::Element => "element",
            Self::Child => "child",
        }
    }
}

impl std::fmt::Display for TransformLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visual element placed in a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Element kind (`headline`, `shot`, `code-block`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Left edge in canvas pixels.
    #[serde(default)]
    pub x: f64,
    /// Top edge in canvas pixels.
    #[serde(default)]
    pub y: f64,
    /// Bounding box width in pixels.
    pub width: f64,
    /// Bounding box height in pixels.
    pub height: f64,
    /// Peak motion in pixels per frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Scale applied at this element's level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Hierarchy level the element lives at.
    pub level: TransformLevel,
    /// Whether motion blur is applied while it moves.
    #[serde(default)]
    pub has_motion_blur: bool,
}

impl ElementSpec {
    /// Create a static, unscaled element.
    pub fn new(kind: impl Into<String>, level: TransformLevel, width: f64, height: f64) -> Self {
        Self {
            kind: kind.into(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            velocity: None,
            scale: None,
            level,
            has_motion_blur: false,
        }
    }

    /// Axis-aligned bounding box in canvas space.
    pub fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Longest edge of the bounding box.
    pub fn size_px(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Scale other than identity, if any.
    pub fn effective_scale(&self) -> Option<f64> {
        self.scale.filter(|s| (s - 1.0).abs() > f64::EPSILON)
    }
}

/// Scene timing plus what is drawn in it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    /// Timing and transitions.
    #[serde(flatten)]
    pub definition: SceneDefinition,
    /// Source text the scene presents.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Elements drawn in the scene.
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

impl SceneSpec {
    /// Wrap a definition with no elements.
    pub fn new(definition: SceneDefinition) -> Self {
        Self {
            definition,
            text: String::new(),
            elements: Vec::new(),
        }
    }

    /// Append an element.
    pub fn element(mut self, element: ElementSpec) -> Self {
        self.elements.push(element);
        self
    }
}

/// A complete candidate timeline.
///
/// One spec belongs to one generation request and is not modified after it has been validated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSpec {
    /// Scenes in sequence order.
    pub scenes: Vec<SceneSpec>,
    /// Total timeline length in frames.
    pub total_duration: u64,
}

impl AnimationSpec {
    /// Parse a spec from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> crate::FramegateResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| crate::FramegateError::serde(format!("parse animation spec JSON: {e}")))
    }

    /// Scene definitions in sequence order.
    pub fn definitions(&self) -> Vec<SceneDefinition> {
        self.scenes.iter().map(|s| s.definition.clone()).collect()
    }

    /// Last end frame over all scenes.
    pub fn max_end_frame(&self) -> u64 {
        self.scenes
            .iter()
            .map(|s| s.definition.end_frame)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
