use super::*;
use crate::strip::model::Strip;

fn movie(tl: &mut Timeline, name: &str, channel: u32, file: &str, sizes: &[u32]) -> StripId {
    let mut s = Strip::movie(name, channel, 0, 10).with_selected(true);
    s.content.directory = "//media".into();
    s.content.path = Some(file.into());
    s.content.proxy.enabled = !sizes.is_empty();
    s.content.proxy.sizes = sizes.to_vec();
    tl.insert(ListRef::Root, s)
}

#[test]
fn queue_holds_one_item_per_media_file() {
    let mut tl = Timeline::new();
    let a = movie(&mut tl, "a", 1, "a.mp4", &[25, 50]);
    movie(&mut tl, "a_again", 2, "a.mp4", &[25]);
    let b = movie(&mut tl, "b", 3, "b.mp4", &[100]);

    let mut reports = Reports::default();
    let queue = build_proxy_queue(&tl, ListRef::Root, &mut reports);
    let strips: Vec<StripId> = queue.iter().map(|c| c.strip).collect();
    assert_eq!(strips, vec![a, b]);
    assert_eq!(queue[0].media, PathBuf::from("//media").join("a.mp4"));
    assert_eq!(queue[0].sizes, vec![25, 50]);
    assert_eq!(
        reports.warnings,
        vec!["Overwrite is not checked for a_again, skipping".to_string()]
    );
}

#[test]
fn queue_skips_with_warnings() {
    let mut tl = Timeline::new();
    movie(&mut tl, "off", 1, "off.mp4", &[]);
    let half = movie(&mut tl, "nosize", 2, "nosize.mp4", &[25]);
    tl[half].content.proxy.sizes.clear();
    tl.insert(ListRef::Root, Strip::sound("snd", 3, 0, 10).with_selected(true));

    let mut reports = Reports::default();
    assert!(build_proxy_queue(&tl, ListRef::Root, &mut reports).is_empty());
    assert_eq!(
        reports.warnings,
        vec![
            "Proxy is not enabled for off, skipping".to_string(),
            "Resolution is not selected for nosize, skipping".to_string(),
        ]
    );
}

#[test]
fn queue_reaches_into_selected_metas() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("m", 1).with_selected(true));
    let mut img = Strip::image("seq", 1, 0, vec!["0001.png".into(), "0002.png".into()]);
    img.flags.selected = true;
    img.content.directory = "//frames".into();
    img.content.proxy.enabled = true;
    img.content.proxy.sizes = vec![50];
    let img = tl.insert(ListRef::Meta(m), img);

    let mut reports = Reports::default();
    let queue = build_proxy_queue(&tl, ListRef::Root, &mut reports);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].strip, img);
    assert_eq!(queue[0].media, PathBuf::from("//frames"));
    assert!(reports.is_empty());
}

#[test]
fn empty_selection_asks_for_strips() {
    let tl = Timeline::new();
    let mut reports = Reports::default();
    assert!(build_proxy_queue(&tl, ListRef::Root, &mut reports).is_empty());
    assert_eq!(reports.warnings, vec!["Select movie or image strips".to_string()]);
}
