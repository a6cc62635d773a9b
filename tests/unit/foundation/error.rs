use super::*;
use crate::enforce::rules::{Violation, ViolationKind};

#[test]
fn not_found_formats_kind_and_key() {
    let e = FramegateError::not_found("template", "missing-id");
    assert!(e.is_not_found());
    assert_eq!(e.to_string(), "template not found: 'missing-id'");
    assert!(!FramegateError::validation("x").is_not_found());
}

#[test]
fn enforcement_error_lists_every_violation() {
    let report = EnforcementReport {
        composition: "promo".to_string(),
        result: EnforcementResult {
            valid: false,
            violations: vec![
                Violation {
                    kind: ViolationKind::Overlap,
                    message: "A and B overlap".to_string(),
                    scenes: vec!["A".to_string(), "B".to_string()],
                    element: None,
                    frames: vec![60],
                },
                Violation {
                    kind: ViolationKind::MissingMotionBlur,
                    message: "too fast".to_string(),
                    scenes: vec!["A".to_string()],
                    element: Some(1),
                    frames: Vec::new(),
                },
            ],
            warnings: Vec::new(),
            recommendations: Vec::new(),
        },
    };
    let err = FramegateError::Enforcement(Box::new(report));
    let msg = err.to_string();
    assert!(msg.starts_with("enforcement failed: 'promo' has 2 blocking violation(s)"));
    assert!(msg.contains("[overlap] A and B overlap"));
    assert!(msg.contains("[missing-motion-blur] too fast"));
    assert_eq!(err.enforcement_report().unwrap().result.violations.len(), 2);
}

#[test]
fn anyhow_errors_convert() {
    let e: FramegateError = anyhow::anyhow!("disk full").into();
    assert_eq!(e.to_string(), "disk full");
    assert!(e.enforcement_report().is_none());
}
