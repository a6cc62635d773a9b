use super::*;

fn record(id: &str) -> TemplateRecord {
    TemplateRecord {
        id: id.to_string(),
        keywords: vec!["demo".to_string()],
        default_duration: 300,
        energy: 0.5,
        professional: 0.5,
        colorfulness: 0.5,
        platforms: vec![Platform::Youtube],
        required_fields: vec![TemplateField::Scenes],
        optional_fields: Vec::new(),
        component_path: format!("compositions/{id}"),
        has_schema: false,
        skeleton: "// framegate:composition {{COMPOSITION_ID}}".to_string(),
    }
}

#[test]
fn builtin_catalog_is_complete_and_valid() {
    let catalog = TemplateCatalog::builtin();
    assert_eq!(catalog.len(), 5);
    let rebuilt = TemplateCatalog::new(catalog.templates().to_vec()).unwrap();
    assert_eq!(rebuilt.len(), 5);
    for t in catalog.templates() {
        assert!(
            t.skeleton.starts_with("// framegate:composition {{COMPOSITION_ID}}"),
            "{} skeleton header",
            t.id
        );
        assert!(t.required_fields.contains(&TemplateField::Scenes));
        assert!(t.component_path.ends_with(&t.id));
    }
}

#[test]
fn lookup_by_id() {
    let catalog = TemplateCatalog::builtin();
    assert_eq!(catalog.get("data-story").unwrap().energy, 0.5);
    let err = catalog.get("nope").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn duplicate_and_invalid_records_are_rejected() {
    assert!(TemplateCatalog::new(vec![record("a"), record("a")]).is_err());

    let mut bad = record("b");
    bad.energy = 1.5;
    assert!(TemplateCatalog::new(vec![bad]).is_err());

    let mut empty = record("c");
    empty.skeleton = "  ".to_string();
    assert!(TemplateCatalog::new(vec![empty]).is_err());

    assert!(TemplateCatalog::new(vec![record(" ")]).is_err());
}

#[test]
fn catalog_round_trips_through_json() {
    let json = serde_json::to_string(&vec![record("one"), record("two")]).unwrap();
    assert!(json.contains("\"componentPath\""));
    let catalog = TemplateCatalog::from_reader(json.as_bytes()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.templates()[1].id, "two");
}

#[test]
fn platforms_map_to_canvases() {
    assert_eq!(Platform::Tiktok.canvas(), Canvas::PORTRAIT);
    assert_eq!(Platform::Linkedin.canvas(), Canvas::LANDSCAPE);
    assert_eq!(Platform::Twitter.canvas(), Canvas::SQUARE);
    assert_eq!(serde_json::to_value(Platform::Youtube).unwrap(), "youtube");
    assert_eq!(TemplateField::BrandAsset.as_str(), "brand_asset");
}
