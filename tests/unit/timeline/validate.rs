use super::*;
use crate::timeline::model::TransitionType;

fn scene(name: &str, start: u64, end: u64, exit: TransitionType, exit_frames: u64) -> SceneDefinition {
    SceneDefinition::new(name, start, end, exit, exit_frames)
}

#[test]
fn properly_transitioned_scenes_are_valid() {
    let scenes = [
        scene("A", 0, 100, TransitionType::WipeLeft, 15),
        scene("B", 85, 175, TransitionType::WipeRight, 15),
    ];
    let r = validate_animation(&scenes);
    assert!(r.valid, "{:?}", r.errors);
    assert_eq!(r.frame_report.len(), 175);
    let f90 = &r.frame_report[90];
    assert_eq!(f90.active_scenes, vec!["B".to_string()]);
    assert_eq!(f90.transitioning_scenes, vec!["A".to_string()]);
    assert!(f90.valid);
}

#[test]
fn fully_active_overlap_is_one_error_per_run() {
    let scenes = [
        scene("A", 0, 70, TransitionType::HardCut, 0),
        scene("B", 55, 150, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    assert!(!r.valid);
    let overlaps: Vec<_> = r.errors_of(ValidationErrorKind::Overlap).collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].affected_frames, (55..70).collect::<Vec<_>>());
    assert!(overlaps[0].affected_frames.contains(&60));
    assert_eq!(overlaps[0].affected_scenes, vec!["A".to_string(), "B".to_string()]);
    assert!(overlaps[0].message.contains("55-69"));
    assert!(!r.frame_report[60].valid);
}

#[test]
fn gap_covers_every_empty_frame() {
    let scenes = [
        scene("A", 0, 90, TransitionType::HardCut, 0),
        scene("B", 100, 190, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    let gaps: Vec<_> = r.errors_of(ValidationErrorKind::Gap).collect();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].affected_frames, (90..100).collect::<Vec<_>>());
    assert_eq!(gaps[0].affected_frames.len(), 10);
}

#[test]
fn nested_scene_does_not_open_a_gap() {
    let scenes = [
        scene("A", 0, 300, TransitionType::HardCut, 0),
        scene("B", 50, 100, TransitionType::HardCut, 0),
        scene("C", 300, 360, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    assert_eq!(r.errors_of(ValidationErrorKind::Gap).count(), 0);
    assert_eq!(r.errors_of(ValidationErrorKind::Overlap).count(), 1);
}

#[test]
fn leading_offset_is_not_a_gap() {
    let scenes = [scene("A", 30, 120, TransitionType::HardCut, 0)];
    let r = validate_animation(&scenes);
    assert!(r.valid);
    assert!(r.frame_report[0].active_scenes.is_empty());
}

#[test]
fn malformed_timing_is_reported() {
    let scenes = [
        scene("A", 50, 50, TransitionType::HardCut, 0),
        scene("B", 0, 20, TransitionType::WipeUp, 40),
        scene("C", 20, 110, TransitionType::HardCut, 5),
        scene("C", 110, 200, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    let invalid: Vec<_> = r.errors_of(ValidationErrorKind::InvalidTiming).collect();
    assert_eq!(invalid.len(), 4);
    assert!(invalid.iter().any(|e| e.message.contains("used by 2 scenes")));
    assert!(invalid.iter().any(|e| e.message.contains("not after its start")));
    assert!(invalid.iter().any(|e| e.message.contains("exit lasts 40")));
    assert!(invalid.iter().any(|e| e.message.contains("hard-cuts")));
}

#[test]
fn missing_exit_needs_a_successor() {
    let scenes = [
        scene("A", 0, 90, TransitionType::SlideUp, 0),
        scene("B", 90, 180, TransitionType::SlideDown, 0),
    ];
    let r = validate_animation(&scenes);
    let missing: Vec<_> = r.errors_of(ValidationErrorKind::MissingExit).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].affected_scenes, vec!["A".to_string()]);
    assert_eq!(missing[0].affected_frames, vec![89]);
}

#[test]
fn warnings_do_not_block() {
    let scenes = [
        scene("A", 0, 100, TransitionType::WipeLeft, 5),
        scene("B", 95, 120, TransitionType::WipeUp, 20),
        scene("C", 100, 300, TransitionType::DollyOut, 60),
        scene("D", 240, 330, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    assert!(r.valid, "{:?}", r.errors);
    assert_eq!(r.warnings_of(WarningKind::RapidTransition).count(), 1);
    assert_eq!(r.warnings_of(WarningKind::SlowTransition).count(), 1);
    assert_eq!(r.warnings_of(WarningKind::ShortScene).count(), 1);
    assert_eq!(r.warnings_of(WarningKind::LongOverlap).count(), 1);
}

#[test]
fn too_many_simultaneous_exits_warn() {
    let scenes = [
        scene("A", 0, 100, TransitionType::WipeLeft, 20),
        scene("B", 0, 100, TransitionType::WipeUp, 25),
        scene("C", 0, 100, TransitionType::WipeDown, 30),
        scene("D", 100, 200, TransitionType::HardCut, 0),
    ];
    let policy = PolicyConfig::default();
    let r = validate_animation_with(&scenes, &policy);
    let crowd: Vec<_> = r
        .warnings_of(WarningKind::RapidTransition)
        .filter(|w| w.message.contains("at once"))
        .collect();
    assert_eq!(crowd.len(), 1);
    assert_eq!(crowd[0].affected_frames, (80..100).collect::<Vec<_>>());
}

#[test]
fn empty_input_is_valid() {
    let r = validate_animation(&[]);
    assert!(r.valid);
    assert!(r.frame_report.is_empty());
}

#[test]
fn collisions_report_intersection_area() {
    let mut a = ElementSpec::new("headline", crate::timeline::model::TransformLevel::Element, 100.0, 100.0);
    a.x = 0.0;
    let mut b = ElementSpec::new("logo", crate::timeline::model::TransformLevel::Element, 100.0, 100.0);
    b.x = 50.0;
    b.y = 50.0;
    let mut c = ElementSpec::new("cta", crate::timeline::model::TransformLevel::Element, 10.0, 10.0);
    c.x = 500.0;
    let hits = check_spatial_collisions(&[a, b, c]);
    assert_eq!(hits.len(), 1);
    assert_eq!((hits[0].a, hits[0].b), (0, 1));
    assert_eq!(hits[0].area, 2500.0);
    assert_eq!(hits[0].b_label, "logo#1");
}

#[test]
fn oversized_timeline_is_invalid_timing_without_a_sweep() {
    let scenes = [
        scene("A", 0, 90, TransitionType::HardCut, 0),
        scene("B", 90, u64::MAX, TransitionType::HardCut, 0),
    ];
    let r = validate_animation(&scenes);
    assert!(!r.valid);
    assert!(r.frame_report.is_empty());
    assert_eq!(r.errors.len(), 1);
    let err = &r.errors[0];
    assert_eq!(err.kind, ValidationErrorKind::InvalidTiming);
    assert_eq!(err.affected_scenes, vec!["B".to_string()]);

    let policy = PolicyConfig {
        max_timeline_frames: 100,
        ..PolicyConfig::default()
    };
    let short = [scene("A", 0, 100, TransitionType::HardCut, 0)];
    assert!(validate_animation_with(&short, &policy).valid);
    let long = [scene("A", 0, 101, TransitionType::HardCut, 0)];
    let r = validate_animation_with(&long, &policy);
    assert_eq!(r.errors_of(ValidationErrorKind::InvalidTiming).count(), 1);
}
