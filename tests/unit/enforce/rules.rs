use super::*;
use crate::timeline::model::{ElementSpec, SceneDefinition, SceneSpec, TransitionType};

fn two_scene_spec(elements: Vec<ElementSpec>) -> AnimationSpec {
    let a = SceneDefinition::new("Intro", 0, 100, TransitionType::WipeLeft, 15);
    let b = SceneDefinition::new("Outro", 85, 175, TransitionType::HardCut, 0)
        .with_entry(TransitionType::WipeLeft);
    let mut first = SceneSpec::new(a);
    first.elements = elements;
    AnimationSpec {
        scenes: vec![first, SceneSpec::new(b)],
        total_duration: 175,
    }
}

fn fast_headline(blur: bool) -> ElementSpec {
    let mut e = ElementSpec::new("headline", TransformLevel::Element, 80.0, 40.0);
    e.velocity = Some(200.0);
    e.has_motion_blur = blur;
    e
}

#[test]
fn clean_spec_passes() {
    let r = enforce_learned_rules(&two_scene_spec(Vec::new()));
    assert!(r.valid, "{:?}", r.violations);
    assert!(r.recommendations.is_empty());
}

#[test]
fn fast_element_without_blur_is_blocked() {
    let r = enforce_learned_rules(&two_scene_spec(vec![fast_headline(false)]));
    assert!(!r.valid);
    let v: Vec<_> = r.violations_of(ViolationKind::MissingMotionBlur).collect();
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].element, Some(0));
    assert_eq!(v[0].scenes, vec!["Intro".to_string()]);
    assert_eq!(r.recommendations.len(), 1);

    let ok = enforce_learned_rules(&two_scene_spec(vec![fast_headline(true)]));
    assert!(ok.valid);
}

#[test]
fn large_elements_tolerate_more_velocity() {
    let mut big = ElementSpec::new("backdrop", TransformLevel::Element, 1000.0, 600.0);
    big.velocity = Some(25.0);
    let r = enforce_learned_rules(&two_scene_spec(vec![big.clone()]));
    assert!(r.valid, "{:?}", r.violations);

    big.velocity = Some(-31.0);
    let r = enforce_learned_rules(&two_scene_spec(vec![big]));
    assert_eq!(r.violations_of(ViolationKind::MissingMotionBlur).count(), 1);
}

#[test]
fn silent_entry_after_first_scene_is_blocked() {
    let mut spec = two_scene_spec(Vec::new());
    spec.scenes[1].definition.entry_transition = None;
    let r = enforce_learned_rules(&spec);
    let v: Vec<_> = r.violations_of(ViolationKind::NoEntryTransition).collect();
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].scenes, vec!["Outro".to_string()]);
}

#[test]
fn scale_rules() {
    let mut shot = ElementSpec::new("shot", TransformLevel::Shot, 1920.0, 1080.0);
    shot.scale = Some(1.19);
    let mut pop = ElementSpec::new("badge", TransformLevel::Element, 200.0, 200.0);
    pop.scale = Some(1.22);
    let r = enforce_learned_rules(&two_scene_spec(vec![shot.clone(), pop]));
    assert_eq!(r.violations_of(ViolationKind::ScaleIsolationViolation).count(), 1);
    assert_eq!(r.violations_of(ViolationKind::ScaleExceedsCeiling).count(), 0);
    let compound: Vec<_> = r
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::CompoundScale)
        .collect();
    assert_eq!(compound.len(), 1);
    assert!(compound[0].message.contains("1.4518"));

    shot.scale = Some(1.3);
    let r = enforce_learned_rules(&two_scene_spec(vec![shot]));
    assert_eq!(r.violations_of(ViolationKind::ScaleExceedsCeiling).count(), 1);
}

#[test]
fn timeline_errors_become_violations() {
    let a = SceneDefinition::new("A", 0, 70, TransitionType::HardCut, 0);
    let b = SceneDefinition::new("B", 55, 150, TransitionType::HardCut, 0)
        .with_entry(TransitionType::HardCut);
    let spec = AnimationSpec {
        scenes: vec![SceneSpec::new(a), SceneSpec::new(b)],
        total_duration: 150,
    };
    let r = enforce_learned_rules(&spec);
    let v: Vec<_> = r.violations_of(ViolationKind::Overlap).collect();
    assert_eq!(v.len(), 1);
    assert!(v[0].frames.contains(&60));
}

#[test]
fn scenes_past_total_duration_are_invalid() {
    let mut spec = two_scene_spec(Vec::new());
    spec.total_duration = 160;
    let r = enforce_learned_rules(&spec);
    let v: Vec<_> = r.violations_of(ViolationKind::InvalidTiming).collect();
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].frames, (160..175).collect::<Vec<_>>());
}

#[test]
fn custom_policy_changes_thresholds() {
    let policy = PolicyConfig {
        motion_blur_velocity_px_per_frame: 500.0,
        ..PolicyConfig::default()
    };
    let r = enforce_learned_rules_with(&two_scene_spec(vec![fast_headline(false)]), &policy);
    assert!(r.valid);
}
