use super::*;

#[test]
fn recorded_length_prefers_image_elements() {
    let img = Strip::image("img", 1, 0, vec!["a.png".into(), "b.png".into()]);
    assert_eq!(recorded_source_length(&img), Some(2));

    let meta = Strip::meta("m", 1);
    assert_eq!(recorded_source_length(&meta), None);
}

#[test]
fn recording_host_overrides_lengths_by_name() {
    let mut host = RecordingHost::new();
    let movie = Strip::movie("clip", 1, 0, 10);
    assert_eq!(host.source_length(&movie), Some(10));
    host.set_source_length("clip", 42);
    assert_eq!(host.source_length(&movie), Some(42));
}

#[test]
fn null_host_keeps_recorded_lengths() {
    let mut host = NullHost;
    let movie = Strip::movie("clip", 1, 0, 10);
    assert_eq!(host.source_length(&movie), Some(10));
    host.notify(ChangeScope::Structure);
}

#[test]
fn recording_host_tracks_calls() {
    let mut host = RecordingHost::new();
    host.invalidate(CacheTarget::Strip(StripId(3)), CacheKind::Raw);
    host.notify(ChangeScope::FrameOnly);
    assert_eq!(host.invalidations(), 1);
    assert_eq!(host.notifications(), vec![ChangeScope::FrameOnly]);
    assert_eq!(host.take_calls().len(), 2);
    assert!(host.calls().is_empty());
}
