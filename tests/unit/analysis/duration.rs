use super::*;

#[test]
fn four_scenes_at_defaults() {
    let plan = synthesize_duration(4, 75, 15).unwrap();
    assert_eq!(plan.total_frames, 345);
    assert_eq!(plan.scene_frames, 300);
    assert_eq!(plan.transition_frames, 45);
    assert!((plan.total_seconds - 11.5).abs() < 1e-9);
    assert_eq!(
        plan.formula,
        "4 scenes x 75 frames + 3 transitions x 15 frames = 345 frames"
    );
}

#[test]
fn twelve_scenes_at_defaults() {
    let plan = synthesize_duration_with(12, &PolicyConfig::default()).unwrap();
    assert_eq!(plan.total_frames, 1065);
}

#[test]
fn single_scene_has_no_transitions() {
    let plan = synthesize_duration(1, 75, 15).unwrap();
    assert_eq!(plan.total_frames, 75);
    assert_eq!(plan.transition_frames, 0);
}

#[test]
fn zero_scenes_is_rejected() {
    assert!(matches!(
        synthesize_duration(0, 75, 15),
        Err(FramegateError::Validation(_))
    ));
}

#[test]
fn frame_rate_only_changes_seconds() {
    let fps = Fps::new(60, 1).unwrap();
    let plan = synthesize_duration_at(4, 75, 15, fps).unwrap();
    assert_eq!(plan.total_frames, 345);
    assert!((plan.total_seconds - 5.75).abs() < 1e-9);
}
