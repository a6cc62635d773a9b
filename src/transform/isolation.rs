//! Transform isolation across the shot / element / child hierarchy.
//!
//! Scale compounds multiplicatively down the tree: a 1.19x shot zoom over a 1.22x element pop
//! renders at 1.45x and crops. The rule table below pins scale to the shot level and keeps the
//! inner levels to translation (plus rotation on elements).

use smallvec::SmallVec;

use crate::timeline::model::TransformLevel;

/// Transform operation kinds governed by the rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    /// Uniform scale.
    Scale,
    /// Horizontal translation.
    TranslateX,
    /// Vertical translation.
    TranslateY,
    /// Rotation in degrees.
    Rotate,
}

impl TransformKind {
    /// Every kind, in rule-table column order.
    pub const ALL: [Self; 4] = [Self::Scale, Self::TranslateX, Self::TranslateY, Self::Rotate];

    /// CSS function name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::Rotate => "rotate",
        }
    }

    fn column(self) -> usize {
        match self {
            Self::Scale => 0,
            Self::TranslateX => 1,
            Self::TranslateY => 2,
            Self::Rotate => 3,
        }
    }
}

/// `RULES[level][kind]`: whether `kind` may be applied at `level`.
const RULES: [[bool; 4]; 3] = [
    // scale  tx    ty    rotate
    [true, true, true, true],    // shot
    [false, true, true, true],   // element
    [false, true, true, false],  // child
];

fn row(level: TransformLevel) -> usize {
    match level {
        TransformLevel::Shot => 0,
        TransformLevel::Element => 1,
        TransformLevel::Child => 2,
    }
}

/// Whether `kind` is permitted at `level`.
pub fn is_allowed(level: TransformLevel, kind: TransformKind) -> bool {
    RULES[row(level)][kind.column()]
}

/// One transform operation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Operation kind.
    pub kind: TransformKind,
    /// Scale factor, pixels, or degrees depending on `kind`.
    pub value: f64,
}

impl Transform {
    /// Scale by `factor`.
    pub fn scale(factor: f64) -> Self {
        Self {
            kind: TransformKind::Scale,
            value: factor,
        }
    }

    /// Translate horizontally by `px`.
    pub fn translate_x(px: f64) -> Self {
        Self {
            kind: TransformKind::TranslateX,
            value: px,
        }
    }

    /// Translate vertically by `px`.
    pub fn translate_y(px: f64) -> Self {
        Self {
            kind: TransformKind::TranslateY,
            value: px,
        }
    }

    /// Rotate by `deg` degrees.
    pub fn rotate(deg: f64) -> Self {
        Self {
            kind: TransformKind::Rotate,
            value: deg,
        }
    }

    /// CSS transform function, e.g. `translateX(12px)`.
    pub fn to_css(self) -> String {
        match self.kind {
            TransformKind::Scale => format!("scale({})", self.value),
            TransformKind::TranslateX | TransformKind::TranslateY => {
                format!("{}({}px)", self.kind.as_str(), self.value)
            }
            TransformKind::Rotate => format!("rotate({}deg)", self.value),
        }
    }
}

/// Inline storage for a level's transform list.
pub type TransformList = SmallVec<[Transform; 4]>;

/// Outcome of [`validate_transform`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TransformCheck {
    /// Whether the combination is permitted.
    pub allowed: bool,
    /// Why, in terms of the compounding risk.
    pub reason: String,
}

/// Look up `(level, kind)` in the rule table.
pub fn validate_transform(level: TransformLevel, kind: TransformKind) -> TransformCheck {
    if is_allowed(level, kind) {
        return TransformCheck {
            allowed: true,
            reason: format!("{} is permitted at {level} level", kind.as_str()),
        };
    }
    let reason = match (level, kind) {
        (TransformLevel::Element, TransformKind::Scale) => {
            "scale at element level multiplies with any shot-level zoom; compounded scale crops \
             content. Apply scale on the shot only"
                .to_string()
        }
        (TransformLevel::Child, TransformKind::Scale) => {
            "scale at child level multiplies with element and shot scale; compounded scale \
             crops content. Apply scale on the shot only"
                .to_string()
        }
        (TransformLevel::Child, TransformKind::Rotate) => {
            "rotation at child level pivots around a parent origin that may itself be \
             rotating; rotate the element instead"
                .to_string()
        }
        _ => format!("{} is not permitted at {level} level", kind.as_str()),
    };
    TransformCheck {
        allowed: false,
        reason,
    }
}

/// One scale factor contributed by one hierarchy level.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleEntry {
    /// Level applying the scale.
    pub level: TransformLevel,
    /// Scale factor.
    pub scale: f64,
}

/// Outcome of [`calculate_compound_scale`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundScale {
    /// Product of every non-identity scale.
    pub total_scale: f64,
    /// `true` when at most one level scales.
    pub is_safe: bool,
    /// What to do about it.
    pub recommendation: String,
}

/// Multiply out a scale chain and flag compounding.
pub fn calculate_compound_scale(entries: &[ScaleEntry]) -> CompoundScale {
    let scaled: Vec<&ScaleEntry> = entries
        .iter()
        .filter(|e| (e.scale - 1.0).abs() > f64::EPSILON)
        .collect();
    let total_scale = scaled.iter().map(|e| e.scale).product::<f64>();
    let is_safe = scaled.len() <= 1;

    let recommendation = if is_safe {
        "scale is isolated to a single level".to_string()
    } else {
        let levels: Vec<&str> = scaled.iter().map(|e| e.level.as_str()).collect();
        format!(
            "scale is applied at {} levels ({}) compounding to {:.4}x; keep scale on the shot \
             level and remove it from the others",
            scaled.len(),
            levels.join(", "),
            total_scale
        )
    };

    CompoundScale {
        total_scale,
        is_safe,
        recommendation,
    }
}

/// Result of [`enforce_scale_isolation`].
///
/// `stripped` is the side channel: callers must surface it rather than drop it.
#[must_use = "stripped transforms must be surfaced to the caller"]
#[derive(Clone, Debug, PartialEq)]
pub struct IsolationOutcome {
    /// Transforms that survived the rule table, in input order.
    pub transforms: TransformList,
    /// Transforms removed because the rule table forbids them at this level.
    pub stripped: Vec<Transform>,
}

impl IsolationOutcome {
    /// `true` when anything was removed.
    pub fn was_stripped(&self) -> bool {
        !self.stripped.is_empty()
    }
}

/// Drop every transform the rule table forbids at `level`.
pub fn enforce_scale_isolation(level: TransformLevel, transforms: &[Transform]) -> IsolationOutcome {
    let mut kept = TransformList::new();
    let mut stripped = Vec::new();
    for t in transforms {
        if is_allowed(level, t.kind) {
            kept.push(*t);
        } else {
            tracing::warn!(
                level = level.as_str(),
                transform = t.kind.as_str(),
                value = t.value,
                "stripped transform not permitted at this level"
            );
            stripped.push(*t);
        }
    }
    IsolationOutcome {
        transforms: kept,
        stripped,
    }
}

/// Accumulates only the transforms the rule table allows at one level.
///
/// Forbidden calls are logged and recorded in [`Self::rejected`] instead of failing, so call
/// sites can compose transforms without consulting the table themselves.
#[derive(Clone, Debug)]
pub struct IsolatedTransformBuilder {
    level: TransformLevel,
    transforms: TransformList,
    rejected: Vec<(Transform, String)>,
}

impl IsolatedTransformBuilder {
    /// Start an empty builder for `level`.
    pub fn new(level: TransformLevel) -> Self {
        Self {
            level,
            transforms: TransformList::new(),
            rejected: Vec::new(),
        }
    }

    /// Add a scale.
    pub fn scale(self, factor: f64) -> Self {
        self.push(Transform::scale(factor))
    }

    /// Add a horizontal translation.
    pub fn translate_x(self, px: f64) -> Self {
        self.push(Transform::translate_x(px))
    }

    /// Add a vertical translation.
    pub fn translate_y(self, px: f64) -> Self {
        self.push(Transform::translate_y(px))
    }

    /// Add a rotation.
    pub fn rotate(self, deg: f64) -> Self {
        self.push(Transform::rotate(deg))
    }

    /// Add an arbitrary transform.
    pub fn push(mut self, t: Transform) -> Self {
        let check = validate_transform(self.level, t.kind);
        if check.allowed {
            self.transforms.push(t);
        } else {
            tracing::warn!(
                level = self.level.as_str(),
                transform = t.kind.as_str(),
                reason = %check.reason,
                "rejected transform"
            );
            self.rejected.push((t, check.reason));
        }
        self
    }

    /// Level this builder targets.
    pub fn level(&self) -> TransformLevel {
        self.level
    }

    /// Calls that were refused, with the reason.
    pub fn rejected(&self) -> &[(Transform, String)] {
        &self.rejected
    }

    /// CSS `transform` value, `none` when empty.
    pub fn to_css(&self) -> String {
        if self.transforms.is_empty() {
            return "none".to_string();
        }
        self.transforms
            .iter()
            .map(|t| t.to_css())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Finish and return the accepted transforms.
    pub fn build(self) -> TransformList {
        self.transforms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/isolation.rs"]
mod tests;
