use super::*;

#[test]
fn frame_span_contains_boundaries() {
    let r = FrameSpan::new(2, 5).unwrap();
    assert!(!r.contains(1));
    assert!(r.contains(2));
    assert!(r.contains(4));
    assert!(!r.contains(5));
}

#[test]
fn frame_span_rejects_inverted_bounds() {
    assert!(FrameSpan::new(5, 2).is_err());
    assert!(FrameSpan::new(-3, -3).unwrap().is_empty());
}

#[test]
fn frame_span_overlap_is_half_open() {
    let a = FrameSpan::new(0, 10).unwrap();
    let b = FrameSpan::new(10, 20).unwrap();
    assert!(!a.overlaps(b));
    assert!(a.overlaps(b.shift(-1)));
    assert_eq!(a.union(b), FrameSpan::new(0, 20).unwrap());
}

#[test]
fn fps_maps_frames_to_rounded_millis() {
    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.frame_to_millis(30), 1001);
    assert_eq!(ntsc.frame_to_millis(1), 33);
    let pal = Fps::new(25, 1).unwrap();
    assert_eq!(pal.frame_to_millis(-1), -40);
    assert!(Fps::new(0, 1).is_err());
}
