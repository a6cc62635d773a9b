use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{FramegateError, FramegateResult};

/// Distribution platform a template is tuned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Vertical short-form.
    Instagram,
    /// Vertical short-form.
    Tiktok,
    /// Horizontal long-form.
    Youtube,
    /// Horizontal professional feed.
    Linkedin,
    /// Square-ish feed.
    Twitter,
}

impl Platform {
    /// Keyword lookup table used by request analysis.
    pub const KEYWORDS: &'static [(&'static str, Platform)] = &[
        ("instagram", Platform::Instagram),
        ("reel", Platform::Instagram),
        ("reels", Platform::Instagram),
        ("tiktok", Platform::Tiktok),
        ("shorts", Platform::Tiktok),
        ("youtube", Platform::Youtube),
        ("linkedin", Platform::Linkedin),
        ("twitter", Platform::Twitter),
    ];

    /// Output canvas for the platform's native orientation.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Instagram | Self::Tiktok => Canvas::PORTRAIT,
            Self::Youtube | Self::Linkedin => Canvas::LANDSCAPE,
            Self::Twitter => Canvas::SQUARE,
        }
    }

    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Youtube => "youtube",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
        }
    }
}

/// Request fields a template can require or accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateField {
    /// Headline / composition title.
    Title,
    /// Scene texts.
    Scenes,
    /// Closing call to action.
    Cta,
    /// Brand asset for palette extraction.
    BrandAsset,
}

impl TemplateField {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Scenes => "scenes",
            Self::Cta => "cta",
            Self::BrandAsset => "brand_asset",
        }
    }
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// Unique id.
    pub id: String,
    /// Keywords matched against requests.
    pub keywords: Vec<String>,
    /// Default length in frames.
    pub default_duration: u64,
    /// Energy rating in `[0, 1]`.
    pub energy: f64,
    /// Professional-tone rating in `[0, 1]`.
    pub professional: f64,
    /// Colorfulness rating in `[0, 1]`.
    pub colorfulness: f64,
    /// Platforms the template fits.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Fields the request must provide.
    #[serde(default)]
    pub required_fields: Vec<TemplateField>,
    /// Fields the template uses when present.
    #[serde(default)]
    pub optional_fields: Vec<TemplateField>,
    /// Directory, relative to the manifest, that generated components are written under.
    pub component_path: String,
    /// Whether generated components export a props schema.
    #[serde(default)]
    pub has_schema: bool,
    /// Source skeleton with `{{PLACEHOLDER}}` markers.
    pub skeleton: String,
}

impl TemplateRecord {
    fn validate(&self) -> FramegateResult<()> {
        if self.id.trim().is_empty() {
            return Err(FramegateError::validation("template id must be non-empty"));
        }
        for (name, v) in [
            ("energy", self.energy),
            ("professional", self.professional),
            ("colorfulness", self.colorfulness),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(FramegateError::validation(format!(
                    "template '{}' {name} must be within [0, 1]",
                    self.id
                )));
            }
        }
        if self.skeleton.trim().is_empty() {
            return Err(FramegateError::validation(format!(
                "template '{}' skeleton must be non-empty",
                self.id
            )));
        }
        Ok(())
    }
}

/// Read-only template catalog, in insertion order.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TemplateCatalog {
    templates: Vec<TemplateRecord>,
}

impl TemplateCatalog {
    /// Build a catalog, rejecting invalid or duplicate entries.
    pub fn new(templates: Vec<TemplateRecord>) -> FramegateResult<Self> {
        for (i, t) in templates.iter().enumerate() {
            t.validate()?;
            if templates[..i].iter().any(|o| o.id == t.id) {
                return Err(FramegateError::validation(format!(
                    "duplicate template id '{}'",
                    t.id
                )));
            }
        }
        Ok(Self { templates })
    }

    /// Parse a catalog from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramegateResult<Self> {
        let templates: Vec<TemplateRecord> = serde_json::from_reader(r)
            .map_err(|e| FramegateError::serde(format!("parse template catalog JSON: {e}")))?;
        Self::new(templates)
    }

    /// Parse a catalog from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramegateResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramegateError::validation(format!("open template catalog '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> FramegateResult<&TemplateRecord> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| FramegateError::not_found("template", id))
    }

    /// All templates in insertion order.
    pub fn templates(&self) -> &[TemplateRecord] {
        &self.templates
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// `true` when the catalog has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn builtin_templates() -> Vec<TemplateRecord> {
    vec![
        TemplateRecord {
            id: "kinetic-promo".to_string(),
            keywords: words(&[
                "launch", "product", "promo", "sale", "announcement", "bold", "dynamic", "hype",
                "fast",
            ]),
            default_duration: 450,
            energy: 0.9,
            professional: 0.4,
            colorfulness: 0.8,
            platforms: vec![Platform::Instagram, Platform::Tiktok],
            required_fields: vec![TemplateField::Scenes],
            optional_fields: vec![TemplateField::Title, TemplateField::Cta],
            component_path: "compositions/kinetic-promo".to_string(),
            has_schema: true,
            skeleton: include_str!("../../templates/kinetic-promo.tsx").to_string(),
        },
        TemplateRecord {
            id: "corporate-explainer".to_string(),
            keywords: words(&[
                "business",
                "company",
                "explainer",
                "strategy",
                "results",
                "team",
                "corporate",
                "quarterly",
                "growth",
            ]),
            default_duration: 900,
            energy: 0.4,
            professional: 0.9,
            colorfulness: 0.3,
            platforms: vec![Platform::Linkedin, Platform::Youtube],
            required_fields: vec![TemplateField::Scenes, TemplateField::Title],
            optional_fields: vec![TemplateField::Cta, TemplateField::BrandAsset],
            component_path: "compositions/corporate-explainer".to_string(),
            has_schema: true,
            skeleton: include_str!("../../templates/corporate-explainer.tsx").to_string(),
        },
        TemplateRecord {
            id: "code-walkthrough".to_string(),
            keywords: words(&[
                "code", "api", "developer", "tutorial", "function", "library", "sdk", "technical",
                "demo",
            ]),
            default_duration: 1200,
            energy: 0.5,
            professional: 0.7,
            colorfulness: 0.4,
            platforms: vec![Platform::Youtube, Platform::Twitter],
            required_fields: vec![TemplateField::Scenes],
            optional_fields: vec![TemplateField::Title],
            component_path: "compositions/code-walkthrough".to_string(),
            has_schema: false,
            skeleton: include_str!("../../templates/code-walkthrough.tsx").to_string(),
        },
        TemplateRecord {
            id: "data-story".to_string(),
            keywords: words(&[
                "data", "chart", "stats", "metrics", "numbers", "report", "growth", "insights",
                "survey",
            ]),
            default_duration: 750,
            energy: 0.5,
            professional: 0.8,
            colorfulness: 0.6,
            platforms: vec![Platform::Linkedin, Platform::Youtube, Platform::Twitter],
            required_fields: vec![TemplateField::Scenes, TemplateField::Title],
            optional_fields: vec![TemplateField::Cta],
            component_path: "compositions/data-story".to_string(),
            has_schema: true,
            skeleton: include_str!("../../templates/data-story.tsx").to_string(),
        },
        TemplateRecord {
            id: "elegant-brand".to_string(),
            keywords: words(&[
                "brand", "luxury", "elegant", "story", "fashion", "calm", "premium", "minimal",
                "lifestyle",
            ]),
            default_duration: 600,
            energy: 0.2,
            professional: 0.6,
            colorfulness: 0.5,
            platforms: vec![Platform::Instagram, Platform::Youtube],
            required_fields: vec![TemplateField::Scenes],
            optional_fields: vec![TemplateField::Title, TemplateField::BrandAsset, TemplateField::Cta],
            component_path: "compositions/elegant-brand".to_string(),
            has_schema: false,
            skeleton: include_str!("../../templates/elegant-brand.tsx").to_string(),
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/templates/catalog.rs"]
mod tests;
