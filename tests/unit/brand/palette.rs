use super::*;

struct FailingExtractor;

impl BrandExtractor for FailingExtractor {
    fn extract_palette(&self, _source: &Path, _fallback_style: &str) -> FramegateResult<BrandPalette> {
        Err(FramegateError::analysis("logo unreadable"))
    }
}

#[test]
fn hex_parsing() {
    assert_eq!(parse_hex_rgb("#ff8800").unwrap(), [255, 136, 0]);
    assert_eq!(parse_hex_rgb("#F80").unwrap(), [255, 136, 0]);
    assert!(parse_hex_rgb("ff8800").is_err());
    assert!(parse_hex_rgb("#ff88").is_err());
    assert!(parse_hex_rgb("#gg0000").is_err());
}

#[test]
fn every_builtin_style_is_valid() {
    for style in known_styles() {
        let p = default_palette(style).unwrap();
        p.validate().unwrap();
        assert_eq!(p.source, PaletteSource::Default);
        assert_eq!(p.extraction_method, format!("default:{style}"));
    }
    assert_eq!(default_palette(" Corporate ").unwrap().primary, "#1d4ed8");
}

#[test]
fn unknown_style_is_not_found() {
    let err = default_palette("vaporwave").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn resolve_uses_style_without_asset() {
    let r = resolve_palette(None, None, "tech").unwrap();
    assert_eq!(r.palette.extraction_method, "default:tech");
    assert_eq!(r.fallback_reason, None);
}

#[test]
fn resolve_records_every_fallback() {
    let r = resolve_palette(Some(&FailingExtractor), Some(Path::new("logo.png")), "vaporwave")
        .unwrap();
    assert_eq!(r.palette.extraction_method, "default:modern");
    let reason = r.fallback_reason.unwrap();
    assert!(reason.contains("logo unreadable"));
    assert!(reason.contains("unknown style 'vaporwave'"));

    let r = resolve_palette(None, Some(Path::new("logo.png")), "playful").unwrap();
    assert_eq!(r.fallback_reason.as_deref(), Some("no extractor configured"));
}

#[test]
fn static_extractor_wins_when_present() {
    let mut palette = default_palette("elegant").unwrap();
    palette.source = PaletteSource::Extracted;
    palette.extraction_method = "pinned".to_string();
    let ex = StaticPaletteExtractor::new(palette.clone()).unwrap();
    let r = resolve_palette(Some(&ex), Some(Path::new("brand.svg")), "modern").unwrap();
    assert_eq!(r.palette, palette);
    assert_eq!(r.fallback_reason, None);

    palette.accent = "orange".to_string();
    assert!(StaticPaletteExtractor::new(palette).is_err());
}

#[test]
fn json_extractor_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("palette.json");
    std::fs::write(
        &good,
        r##"{"primary":"#112233","secondary":"#445566","accent":"#778899","background":"#000","text":"#fff"}"##,
    )
    .unwrap();
    let p = JsonPaletteExtractor.extract_palette(&good, "modern").unwrap();
    assert_eq!(p.source, PaletteSource::Extracted);
    assert_eq!(p.extraction_method, "json-file");

    let bad = dir.path().join("bad.json");
    std::fs::write(
        &bad,
        r##"{"primary":"red","secondary":"#445566","accent":"#778899","background":"#000","text":"#fff"}"##,
    )
    .unwrap();
    assert!(JsonPaletteExtractor.extract_palette(&bad, "modern").is_err());
    assert!(
        JsonPaletteExtractor
            .extract_palette(&dir.path().join("missing.json"), "modern")
            .is_err()
    );
}

struct LooseExtractor;

impl BrandExtractor for LooseExtractor {
    fn extract_palette(&self, _source: &Path, _fallback_style: &str) -> FramegateResult<BrandPalette> {
        let mut palette = default_palette("tech")?;
        palette.primary = "'; throw new Error('x'); '".to_string();
        palette.source = PaletteSource::Extracted;
        Ok(palette)
    }
}

#[test]
fn invalid_extracted_palette_falls_back_to_style() {
    let r = resolve_palette(Some(&LooseExtractor), Some(Path::new("logo.png")), "playful").unwrap();
    assert_eq!(r.palette, default_palette("playful").unwrap());
    let reason = r.fallback_reason.unwrap();
    assert!(reason.starts_with("extraction failed:"), "{reason}");
    assert!(reason.contains("palette primary"), "{reason}");
}
