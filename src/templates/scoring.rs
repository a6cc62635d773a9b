//! Weighted template ranking.

use std::collections::BTreeSet;

use crate::analysis::content::{extract_keywords, score_energy};
use crate::templates::catalog::{Platform, TemplateCatalog, TemplateRecord};

/// Weight of the keyword-overlap factor.
pub const KEYWORD_WEIGHT: f64 = 0.4;
/// Weight of the energy-match factor.
pub const ENERGY_WEIGHT: f64 = 0.2;
/// Weight of the tone-match factor.
pub const PROFESSIONAL_WEIGHT: f64 = 0.2;
/// Weight of the color-match factor.
pub const COLOR_WEIGHT: f64 = 0.1;
/// Flat bonus when the requested platform is supported.
pub const PLATFORM_BONUS: f64 = 0.1;

const TONE_STEP: f64 = 0.15;

const PROFESSIONAL_TERMS: &[&str] = &[
    "business",
    "corporate",
    "professional",
    "enterprise",
    "investor",
    "investors",
    "quarterly",
    "report",
    "company",
    "b2b",
    "strategy",
    "linkedin",
];

const CASUAL_TERMS: &[&str] = &[
    "fun", "playful", "meme", "casual", "silly", "party", "crazy", "wild", "cute",
];

const COLORFUL_TERMS: &[&str] = &[
    "colorful", "colourful", "vibrant", "bright", "rainbow", "neon", "vivid", "pop",
];

const MUTED_TERMS: &[&str] = &["monochrome", "muted", "minimal", "dark", "grayscale", "subtle"];

const DATA_TERMS: &[&str] = &[
    "data", "chart", "charts", "graph", "stats", "statistics", "metrics", "numbers", "percent",
    "revenue", "kpi",
];

/// Derived view of a free-text request. Computed per request, never persisted.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequestAnalysis {
    /// Request keywords.
    pub keywords: Vec<String>,
    /// Platform inferred from the text, if any.
    pub platform: Option<Platform>,
    /// Energy in `[0, 1]`.
    pub energy: f64,
    /// Professional tone in `[0, 1]`.
    pub professional: f64,
    /// Desired colorfulness in `[0, 1]`.
    pub colorfulness: f64,
    /// Whether the request is about data or numbers.
    pub has_data: bool,
}

fn nudge(keywords: &[String], up: &[&str], down: &[&str]) -> f64 {
    let mut v: f64 = 0.5;
    for k in keywords {
        if up.contains(&k.as_str()) {
            v += TONE_STEP;
        } else if down.contains(&k.as_str()) {
            v -= TONE_STEP;
        }
    }
    v.clamp(0.0, 1.0)
}

/// Analyze a prompt: keywords, energy, tone, color, platform and data cues.
pub fn analyze_user_request(prompt: &str) -> UserRequestAnalysis {
    let keywords = extract_keywords(prompt);
    let platform = keywords.iter().find_map(|k| {
        Platform::KEYWORDS
            .iter()
            .find(|(word, _)| *word == k.as_str())
            .map(|(_, p)| *p)
    });
    let has_data = keywords.iter().any(|k| DATA_TERMS.contains(&k.as_str()))
        || prompt.contains('%')
        || prompt.chars().any(|c| c.is_ascii_digit());

    UserRequestAnalysis {
        energy: score_energy(prompt, 1.0),
        professional: nudge(&keywords, PROFESSIONAL_TERMS, CASUAL_TERMS),
        colorfulness: nudge(&keywords, COLORFUL_TERMS, MUTED_TERMS),
        platform,
        has_data,
        keywords,
    }
}

/// Per-factor weighted contributions to a template score.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScoreBreakdown {
    /// Weighted keyword overlap.
    pub keywords: f64,
    /// Weighted energy match.
    pub energy: f64,
    /// Weighted tone match.
    pub professional: f64,
    /// Weighted color match.
    pub colorfulness: f64,
    /// Platform bonus.
    pub platform: f64,
}

impl ScoreBreakdown {
    /// Sum of all factors, clamped to `[0, 1]`.
    pub fn total(&self) -> f64 {
        (self.keywords + self.energy + self.professional + self.colorfulness + self.platform)
            .clamp(0.0, 1.0)
    }

    /// Names of the two largest factors, largest first.
    pub fn top_factors(&self) -> [&'static str; 2] {
        let mut factors = [
            ("keyword match", self.keywords),
            ("energy match", self.energy),
            ("tone match", self.professional),
            ("color match", self.colorfulness),
            ("platform fit", self.platform),
        ];
        // Stable: equal contributions keep declaration order.
        factors.sort_by(|a, b| b.1.total_cmp(&a.1));
        [factors[0].0, factors[1].0]
    }
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)`, 0 when either side is empty.
fn keyword_overlap(template: &[String], request: &[String]) -> f64 {
    let t: BTreeSet<String> = template.iter().map(|k| k.to_lowercase()).collect();
    let r: BTreeSet<&str> = request.iter().map(String::as_str).collect();
    let denom = t.len().min(r.len());
    if denom == 0 {
        return 0.0;
    }
    let hits = t.iter().filter(|k| r.contains(k.as_str())).count();
    (hits as f64 / denom as f64).min(1.0)
}

/// Break a template's score into its weighted factors.
pub fn score_breakdown(template: &TemplateRecord, request: &UserRequestAnalysis) -> ScoreBreakdown {
    let platform = match request.platform {
        Some(p) if template.platforms.contains(&p) => PLATFORM_BONUS,
        _ => 0.0,
    };
    ScoreBreakdown {
        keywords: KEYWORD_WEIGHT * keyword_overlap(&template.keywords, &request.keywords),
        energy: ENERGY_WEIGHT * (1.0 - (template.energy - request.energy).abs()),
        professional: PROFESSIONAL_WEIGHT
            * (1.0 - (template.professional - request.professional).abs()),
        colorfulness: COLOR_WEIGHT * (1.0 - (template.colorfulness - request.colorfulness).abs()),
        platform,
    }
}

/// Score a template against a request, in `[0, 1]`.
pub fn score_template(template: &TemplateRecord, request: &UserRequestAnalysis) -> f64 {
    score_breakdown(template, request).total()
}

/// One ranked template.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TemplateMatch<'a> {
    /// The template.
    pub template: &'a TemplateRecord,
    /// Its score.
    pub score: f64,
    /// The two strongest factors, in words.
    pub reason: String,
}

/// Rank the catalog against `prompt` and return the best `top_n`.
///
/// Sorted by descending score; ties keep catalog order.
pub fn select_templates<'a>(
    catalog: &'a TemplateCatalog,
    prompt: &str,
    top_n: usize,
) -> Vec<TemplateMatch<'a>> {
    let request = analyze_user_request(prompt);
    rank_templates(catalog, &request, top_n)
}

/// [`select_templates`] over an already-analyzed request.
pub fn rank_templates<'a>(
    catalog: &'a TemplateCatalog,
    request: &UserRequestAnalysis,
    top_n: usize,
) -> Vec<TemplateMatch<'a>> {
    let mut ranked: Vec<TemplateMatch<'a>> = catalog
        .templates()
        .iter()
        .map(|template| {
            let breakdown = score_breakdown(template, request);
            let [first, second] = breakdown.top_factors();
            TemplateMatch {
                template,
                score: breakdown.total(),
                reason: format!("strongest factors: {first}, {second}"),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
#[path = "../../tests/unit/templates/scoring.rs"]
mod tests;
