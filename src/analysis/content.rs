//! Free-text scene analysis: energy, keywords and narrative role.

use std::collections::BTreeSet;

use crate::config::PolicyConfig;

/// Energy every text starts from before keyword nudges.
pub const NEUTRAL_ENERGY: f64 = 0.5;
/// Nudge applied per matched energy keyword.
pub const ENERGY_STEP: f64 = 0.1;

const HIGH_ENERGY: &[&str] = &[
    "fast",
    "dynamic",
    "explosive",
    "action",
    "energetic",
    "exciting",
    "intense",
    "powerful",
    "rapid",
    "bold",
    "punchy",
    "launch",
    "boost",
    "vibrant",
    "thrilling",
    "epic",
];

const LOW_ENERGY: &[&str] = &[
    "calm",
    "gentle",
    "elegant",
    "serene",
    "smooth",
    "soft",
    "peaceful",
    "subtle",
    "relaxed",
    "quiet",
    "slow",
    "minimal",
    "tranquil",
    "soothing",
];

const TECHNICAL: &[&str] = &[
    "api",
    "code",
    "function",
    "database",
    "algorithm",
    "server",
    "deploy",
    "sdk",
    "cli",
    "compiler",
    "backend",
    "frontend",
    "typescript",
    "javascript",
    "python",
    "rust",
    "kubernetes",
    "architecture",
    "latency",
    "endpoint",
];

const CODE_MARKERS: &[&str] = &["```", "=>", "();", "fn ", "const ", "function ", "import ", "</"];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "your", "you", "are", "our", "was",
    "were", "will", "have", "has", "had", "but", "not", "all", "any", "can", "its", "into",
    "out", "about", "over", "than", "then", "them", "they", "their", "there", "what", "when",
    "which", "who", "how", "why", "more", "most", "just", "also", "very", "make", "made",
];

/// Boolean content features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFeatures {
    /// Mentions technical vocabulary.
    pub has_technical_content: bool,
    /// Contains code-like fragments.
    pub has_code_examples: bool,
}

/// Output of [`analyze_content`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ContentAnalysis {
    /// Energy in `[0, 1]`.
    pub energy: f64,
    /// Distinct keywords, first-occurrence order.
    pub keywords: Vec<String>,
    /// Boolean features.
    pub features: ContentFeatures,
}

/// Narrative position of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneRole {
    /// First scene.
    Intro,
    /// Anything between first and last.
    Body,
    /// Last scene.
    Outro,
}

impl SceneRole {
    /// Role by position; a single scene is an intro.
    pub fn for_position(index: usize, count: usize) -> Self {
        if index == 0 {
            Self::Intro
        } else if index + 1 == count {
            Self::Outro
        } else {
            Self::Body
        }
    }
}

/// Per-scene output of [`analyze_scenes`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneAnalysis {
    /// Position in the input.
    pub index: usize,
    /// Narrative role.
    pub scene_role: SceneRole,
    /// Energy, keywords and features of the scene text.
    pub content: ContentAnalysis,
    /// Keyword Jaccard similarity with the next scene, 0 for the last.
    pub similarity_to_next: f64,
    /// Suggested hold in frames; higher energy holds shorter.
    pub recommended_duration: u64,
}

/// Lowercased alphanumeric tokens of `text`, stopwords and short tokens removed, deduplicated
/// in first-occurrence order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for token in tokens(text) {
        if token.len() < 3 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }
    out
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Energy heuristic shared with request analysis.
///
/// Starts at [`NEUTRAL_ENERGY`], moves by `ENERGY_STEP * weight` per high/low bucket hit, and is
/// clamped to `[0, 1]`.
pub fn score_energy(text: &str, weight: f64) -> f64 {
    let weight = if weight.is_finite() {
        weight.max(0.0)
    } else {
        1.0
    };
    let mut energy = NEUTRAL_ENERGY;
    for token in tokens(text) {
        if HIGH_ENERGY.contains(&token.as_str()) {
            energy += ENERGY_STEP * weight;
        } else if LOW_ENERGY.contains(&token.as_str()) {
            energy -= ENERGY_STEP * weight;
        }
    }
    energy.clamp(0.0, 1.0)
}

/// Score one piece of content. `position_weight` scales the keyword nudges (1.0 is neutral).
pub fn analyze_content(text: &str, position_weight: f64) -> ContentAnalysis {
    let keywords = extract_keywords(text);
    let has_technical_content = keywords.iter().any(|k| TECHNICAL.contains(&k.as_str()));
    let has_code_examples = CODE_MARKERS.iter().any(|m| text.contains(m));
    ContentAnalysis {
        energy: score_energy(text, position_weight),
        keywords,
        features: ContentFeatures {
            has_technical_content,
            has_code_examples,
        },
    }
}

/// Jaccard similarity of two keyword lists; 0 when both are empty.
pub fn keyword_similarity(a: &[String], b: &[String]) -> f64 {
    let a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let b: BTreeSet<&str> = b.iter().map(String::as_str).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Map energy onto the policy's recommended hold range, high energy to the short end.
pub fn recommended_duration(energy: f64, policy: &PolicyConfig) -> u64 {
    let [lo, hi] = policy.recommended_duration_range;
    let span = hi.saturating_sub(lo) as f64;
    let e = energy.clamp(0.0, 1.0);
    lo + (span * (1.0 - e)).round() as u64
}

/// Analyze a scene list with the default policy.
pub fn analyze_scenes<S: AsRef<str>>(scenes: &[S]) -> Vec<SceneAnalysis> {
    analyze_scenes_with(scenes, &PolicyConfig::default())
}

/// Analyze each scene and relate it to its successor.
pub fn analyze_scenes_with<S: AsRef<str>>(
    scenes: &[S],
    policy: &PolicyConfig,
) -> Vec<SceneAnalysis> {
    let contents: Vec<ContentAnalysis> = scenes
        .iter()
        .map(|s| analyze_content(s.as_ref(), 1.0))
        .collect();

    let count = contents.len();
    contents
        .iter()
        .enumerate()
        .map(|(index, content)| {
            let similarity_to_next = contents
                .get(index + 1)
                .map(|next| keyword_similarity(&content.keywords, &next.keywords))
                .unwrap_or(0.0);
            SceneAnalysis {
                index,
                scene_role: SceneRole::for_position(index, count),
                content: content.clone(),
                similarity_to_next,
                recommended_duration: recommended_duration(content.energy, policy),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/content.rs"]
mod tests;
