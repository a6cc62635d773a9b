use super::*;

#[test]
fn request_analysis_picks_up_platform_tone_and_data() {
    let a = analyze_user_request("Quarterly business report for investors on LinkedIn");
    assert_eq!(a.platform, Some(Platform::Linkedin));
    assert_eq!(a.professional, 1.0);
    assert_eq!(a.colorfulness, 0.5);
    assert!(!a.has_data);

    let b = analyze_user_request("Revenue grew 40% this year");
    assert!(b.has_data);
    assert_eq!(b.platform, None);

    let c = analyze_user_request("a fun, playful and colorful party invite");
    assert!(c.professional < 0.5);
    assert!(c.colorfulness > 0.5);
}

#[test]
fn energetic_promo_prefers_kinetic_template() {
    let catalog = TemplateCatalog::builtin();
    let ranked = select_templates(&catalog, "launch a fast bold product promo on tiktok", 3);
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].template.id, "kinetic-promo");
    assert!(ranked[0].reason.starts_with("strongest factors: keyword match"));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn business_report_prefers_corporate_template() {
    let catalog = TemplateCatalog::builtin();
    let ranked = select_templates(
        &catalog,
        "Quarterly business report for investors on LinkedIn",
        1,
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].template.id, "corporate-explainer");
}

#[test]
fn scores_stay_in_unit_range() {
    let catalog = TemplateCatalog::builtin();
    let request = analyze_user_request("");
    for t in catalog.templates() {
        let s = score_template(t, &request);
        assert!((0.0..=1.0).contains(&s), "{} scored {s}", t.id);
        let b = score_breakdown(t, &request);
        assert_eq!(b.keywords, 0.0);
        assert_eq!(b.platform, 0.0);
    }
    assert!(select_templates(&catalog, "anything", 0).is_empty());
}

#[test]
fn top_factors_keep_declaration_order_on_ties() {
    let b = ScoreBreakdown {
        keywords: 0.0,
        energy: 0.1,
        professional: 0.1,
        colorfulness: 0.05,
        platform: 0.1,
    };
    assert_eq!(b.top_factors(), ["energy match", "tone match"]);
    assert!((b.total() - 0.35).abs() < 1e-9);
}

#[test]
fn equal_scores_keep_catalog_insertion_order() {
    let base = TemplateCatalog::builtin().get("kinetic-promo").unwrap().clone();
    let twin = |id: &str| TemplateRecord {
        id: id.to_string(),
        ..base.clone()
    };
    let prompt = "launch a fast bold product promo on tiktok";

    let forward = TemplateCatalog::new(vec![twin("twin-a"), twin("twin-b")]).unwrap();
    let ranked = select_templates(&forward, prompt, 2);
    assert_eq!(ranked[0].score, ranked[1].score);
    let ids: Vec<&str> = ranked.iter().map(|m| m.template.id.as_str()).collect();
    assert_eq!(ids, vec!["twin-a", "twin-b"]);

    let reversed = TemplateCatalog::new(vec![twin("twin-b"), twin("twin-a")]).unwrap();
    let ids: Vec<String> = select_templates(&reversed, prompt, 2)
        .iter()
        .map(|m| m.template.id.clone())
        .collect();
    assert_eq!(ids, vec!["twin-b".to_string(), "twin-a".to_string()]);
}
