//! Brand palettes and the extraction collaborator boundary.
//!
//! Extraction itself (reading logos, sampling pixels) happens outside this crate behind
//! [`BrandExtractor`]. Lookups here return `Result` and leave the fallback decision to the
//! caller.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{FramegateError, FramegateResult};

/// Where a palette came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    /// Extracted from a brand asset.
    Extracted,
    /// A built-in style palette.
    Default,
}

/// Five-color brand palette as `#rrggbb` strings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrandPalette {
    /// Dominant brand color.
    pub primary: String,
    /// Supporting color.
    pub secondary: String,
    /// Highlight color.
    pub accent: String,
    /// Canvas background.
    pub background: String,
    /// Body text color.
    pub text: String,
    /// Provenance.
    pub source: PaletteSource,
    /// How the palette was obtained (`json-file`, `default:modern`, ...).
    pub extraction_method: String,
}

impl BrandPalette {
    /// Check every color is a `#rgb` or `#rrggbb` hex string.
    pub fn validate(&self) -> FramegateResult<()> {
        for (name, value) in self.colors() {
            parse_hex_rgb(value).map_err(|e| {
                FramegateError::validation(format!("palette {name} '{value}': {e}"))
            })?;
        }
        Ok(())
    }

    /// `(name, value)` pairs in a fixed order.
    pub fn colors(&self) -> [(&'static str, &str); 5] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("accent", self.accent.as_str()),
            ("background", self.background.as_str()),
            ("text", self.text.as_str()),
        ]
    }
}

/// Parse `#rgb` / `#rrggbb` into bytes.
pub fn parse_hex_rgb(s: &str) -> Result<[u8; 3], String> {
    let hex = s
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| "color must start with '#'".to_string())?;
    let nibble = |c: u8| -> Result<u8, String> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(format!("invalid hex digit '{}'", c as char)),
        }
    };
    let b = hex.as_bytes();
    match b.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in b.iter().enumerate() {
                let v = nibble(*c)?;
                out[i] = (v << 4) | v;
            }
            Ok(out)
        }
        6 => {
            let mut out = [0u8; 3];
            for i in 0..3 {
                out[i] = (nibble(b[i * 2])? << 4) | nibble(b[i * 2 + 1])?;
            }
            Ok(out)
        }
        _ => Err("color must be #rgb or #rrggbb".to_string()),
    }
}

const STYLE_PALETTES: &[(&str, [&str; 5])] = &[
    ("modern", ["#2563eb", "#1e293b", "#f59e0b", "#0f172a", "#f8fafc"]),
    ("corporate", ["#1d4ed8", "#334155", "#10b981", "#ffffff", "#0f172a"]),
    ("playful", ["#ec4899", "#8b5cf6", "#facc15", "#fdf4ff", "#1f2937"]),
    ("elegant", ["#b08d57", "#3f3f46", "#e7e5e4", "#18181b", "#fafaf9"]),
    ("tech", ["#22d3ee", "#6366f1", "#a3e635", "#020617", "#e2e8f0"]),
    ("minimal", ["#111827", "#6b7280", "#ef4444", "#ffffff", "#111827"]),
];

/// Style used when the caller opts into a fallback for an unknown style.
pub const FALLBACK_STYLE: &str = "modern";

/// Built-in palette for `style`; unknown styles are [`FramegateError::NotFound`].
pub fn default_palette(style: &str) -> FramegateResult<BrandPalette> {
    let key = style.trim().to_ascii_lowercase();
    let (_, [primary, secondary, accent, background, text]) = STYLE_PALETTES
        .iter()
        .find(|(name, _)| *name == key)
        .ok_or_else(|| FramegateError::not_found("palette style", style))?;
    Ok(BrandPalette {
        primary: (*primary).to_string(),
        secondary: (*secondary).to_string(),
        accent: (*accent).to_string(),
        background: (*background).to_string(),
        text: (*text).to_string(),
        source: PaletteSource::Default,
        extraction_method: format!("default:{key}"),
    })
}

/// Names of the built-in styles.
pub fn known_styles() -> impl Iterator<Item = &'static str> {
    STYLE_PALETTES.iter().map(|(name, _)| *name)
}

/// External brand-extraction collaborator.
pub trait BrandExtractor: Send + Sync {
    /// Produce a palette from a brand asset. May fail for any reason.
    fn extract_palette(&self, source: &Path, fallback_style: &str)
    -> FramegateResult<BrandPalette>;
}

/// Always returns the same palette. Useful for pinned brands and tests.
#[derive(Clone, Debug)]
pub struct StaticPaletteExtractor {
    palette: BrandPalette,
}

impl StaticPaletteExtractor {
    /// Wrap a validated palette.
    pub fn new(palette: BrandPalette) -> FramegateResult<Self> {
        palette.validate()?;
        Ok(Self { palette })
    }
}

impl BrandExtractor for StaticPaletteExtractor {
    fn extract_palette(&self, _source: &Path, _fallback_style: &str) -> FramegateResult<BrandPalette> {
        Ok(self.palette.clone())
    }
}

/// Reads a palette exported as JSON (`{"primary": "#...", ...}`) by an upstream tool.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPaletteExtractor;

#[derive(serde::Deserialize)]
struct PaletteFile {
    primary: String,
    secondary: String,
    accent: String,
    background: String,
    text: String,
}

impl BrandExtractor for JsonPaletteExtractor {
    fn extract_palette(&self, source: &Path, _fallback_style: &str) -> FramegateResult<BrandPalette> {
        let f = File::open(source).map_err(|e| {
            FramegateError::validation(format!("open palette '{}': {e}", source.display()))
        })?;
        let raw: PaletteFile = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| FramegateError::serde(format!("parse palette JSON: {e}")))?;
        let palette = BrandPalette {
            primary: raw.primary,
            secondary: raw.secondary,
            accent: raw.accent,
            background: raw.background,
            text: raw.text,
            source: PaletteSource::Extracted,
            extraction_method: "json-file".to_string(),
        };
        palette.validate()?;
        Ok(palette)
    }
}

/// Palette resolution result plus what went wrong on the way, if anything.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedPalette {
    /// The palette to use.
    pub palette: BrandPalette,
    /// Why a fallback was taken, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Extract from `source` when given, otherwise (or on failure) use the style palette, and
/// when the style itself is unknown use [`FALLBACK_STYLE`]. An extracted palette must pass
/// [`BrandPalette::validate`] to be used. Every fallback is recorded.
pub fn resolve_palette(
    extractor: Option<&dyn BrandExtractor>,
    source: Option<&Path>,
    style: &str,
) -> FramegateResult<ResolvedPalette> {
    let mut reasons = Vec::new();
    if let (Some(extractor), Some(source)) = (extractor, source) {
        match extractor
            .extract_palette(source, style)
            .and_then(|palette| palette.validate().map(|()| palette))
        {
            Ok(palette) => {
                return Ok(ResolvedPalette {
                    palette,
                    fallback_reason: None,
                });
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "palette extraction failed");
                reasons.push(format!("extraction failed: {e}"));
            }
        }
    } else if source.is_some() {
        reasons.push("no extractor configured".to_string());
    }

    let palette = match default_palette(style) {
        Ok(p) => p,
        Err(e) if e.is_not_found() => {
            reasons.push(format!("unknown style '{style}', using '{FALLBACK_STYLE}'"));
            default_palette(FALLBACK_STYLE)?
        }
        Err(e) => return Err(e),
    };
    Ok(ResolvedPalette {
        palette,
        fallback_reason: (!reasons.is_empty()).then(|| reasons.join("; ")),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/brand/palette.rs"]
mod tests;
