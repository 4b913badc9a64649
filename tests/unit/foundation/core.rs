use super::*;

#[test]
fn target_size_rejects_zero_axes() {
    assert!(TargetSize::new(0, 10).is_err());
    assert!(TargetSize::new(10, 0).is_err());
    assert!(TargetSize::new(0, 0).is_err());

    let s = TargetSize::new(1080, 1920).unwrap();
    assert_eq!((s.width, s.height), (1080, 1920));
}

#[test]
fn target_size_rotation_and_display() {
    let s = TargetSize::new(1080, 1920).unwrap();
    assert!(s.is_portrait());
    assert_eq!(s.to_string(), "1080x1920");

    let r = s.rotated();
    assert!(!r.is_portrait());
    assert_eq!(r, TargetSize::new(1920, 1080).unwrap());
}

#[test]
fn target_size_serde_shape() {
    let s = TargetSize::new(3, 4).unwrap();
    let json = serde_json::to_value(s).unwrap();
    assert_eq!(json, serde_json::json!({ "width": 3, "height": 4 }));
}
