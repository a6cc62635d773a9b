use super::*;

#[test]
fn keywords_are_lowercased_deduplicated_and_filtered() {
    let kw = extract_keywords("The Fast API, the fast api and an SDK!");
    assert_eq!(kw, vec!["fast", "api", "sdk"]);
}

#[test]
fn energy_moves_with_bucket_hits_and_clamps() {
    assert_eq!(score_energy("nothing special here", 1.0), NEUTRAL_ENERGY);
    assert!((score_energy("fast bold launch", 1.0) - 0.8).abs() < 1e-9);
    assert!((score_energy("calm and gentle", 1.0) - 0.3).abs() < 1e-9);
    let maxed = "fast ".repeat(20);
    assert_eq!(score_energy(&maxed, 1.0), 1.0);
    assert!((score_energy("fast", 2.0) - 0.7).abs() < 1e-9);
    assert_eq!(score_energy("fast", f64::NAN), score_energy("fast", 1.0));
}

#[test]
fn features_detect_technical_and_code() {
    let a = analyze_content("Deploy the API in one line: `client.run();`", 1.0);
    assert!(a.features.has_technical_content);
    assert!(a.features.has_code_examples);
    let b = analyze_content("A calm sunset over the sea", 1.0);
    assert_eq!(b.features, ContentFeatures::default());
    assert!(b.energy < NEUTRAL_ENERGY);
}

#[test]
fn similarity_is_jaccard() {
    let a = extract_keywords("rust compiler speed");
    let b = extract_keywords("rust compiler safety");
    assert!((keyword_similarity(&a, &b) - 0.5).abs() < 1e-9);
    assert_eq!(keyword_similarity(&[], &[]), 0.0);
    assert_eq!(keyword_similarity(&a, &a), 1.0);
}

#[test]
fn recommended_duration_maps_energy_to_policy_range() {
    let policy = PolicyConfig::default();
    assert_eq!(recommended_duration(0.0, &policy), 120);
    assert_eq!(recommended_duration(1.0, &policy), 60);
    assert_eq!(recommended_duration(0.5, &policy), 90);
    assert_eq!(recommended_duration(7.0, &policy), 60);
}

#[test]
fn scenes_get_roles_and_successor_similarity() {
    let scenes = ["Rust compiler intro", "Rust compiler deep dive", "Thanks for watching"];
    let out = analyze_scenes(&scenes);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].scene_role, SceneRole::Intro);
    assert_eq!(out[1].scene_role, SceneRole::Body);
    assert_eq!(out[2].scene_role, SceneRole::Outro);
    assert!(out[0].similarity_to_next > 0.0);
    assert_eq!(out[2].similarity_to_next, 0.0);
    assert_eq!(out[1].index, 1);
}

#[test]
fn single_scene_is_intro() {
    assert_eq!(SceneRole::for_position(0, 1), SceneRole::Intro);
    assert!(analyze_scenes::<&str>(&[]).is_empty());
}
