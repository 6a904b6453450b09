// Unit tests for the clip session queue

use super::*;
use chrono::NaiveDate;

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(14, 5, 6))
        .unwrap()
}

fn loaded(duration: Option<f64>) -> ClipSession {
    let mut session = ClipSession::default().with_clock(fixed_clock);
    session.load_source("/videos/talk.mp4", duration);
    session
}

fn t(seconds: f64) -> TimeSpec {
    TimeSpec::from_seconds(seconds)
}

#[test]
fn test_requires_loaded_source() {
    let mut session = ClipSession::default();
    assert!(matches!(
        session.add_clip(Some(t(1.0)), Some(t(2.0))),
        Err(DomainError::InvalidState(_))
    ));
    assert!(matches!(session.add_frame(t(1.0)), Err(DomainError::InvalidState(_))));
    assert!(session.is_empty());
}

#[test]
fn test_generated_names_and_folder() {
    let mut session = loaded(Some(90.0));
    session.add_clip(Some(t(5.0)), Some(t(10.0))).unwrap();
    session.add_frame(t(12.0)).unwrap();
    session.add_clip(None, None).unwrap();

    let items = session.items();
    assert_eq!(items[0].filename, "clip_001_20240309_140506.mp4");
    assert_eq!(items[1].filename, "frame_002_20240309_140506.jpg");
    assert_eq!(items[2].filename, "video_003_20240309_140506.mp4");
    assert!(items[2].full_video);
    assert_eq!(items[2].describe(), "(FULL VIDEO)");
    assert_eq!(items[0].describe(), "(00:05.000 -> 00:10.000)");
    assert_eq!(
        items[2].kind,
        JobKind::Clip {
            start: t(0.0),
            end: t(90.0)
        }
    );
    assert!(items
        .iter()
        .all(|item| item.output_folder == Path::new("/videos/clips")));
}

#[test]
fn test_range_validation() {
    let mut session = loaded(Some(60.0));
    assert!(matches!(
        session.add_clip(Some(t(10.0)), Some(t(10.0))),
        Err(DomainError::InvalidTimeRange(_))
    ));
    assert!(matches!(
        session.add_clip(Some(t(10.0)), Some(t(75.0))),
        Err(DomainError::InvalidTimeRange(_))
    ));
    assert!(matches!(session.add_frame(t(61.0)), Err(DomainError::InvalidTimeRange(_))));
    assert!(session.add_clip(Some(t(50.0)), None).is_ok());
    assert!(!session.is_empty());
}

#[test]
fn test_unknown_duration_needs_explicit_end() {
    let mut session = loaded(None);
    assert!(matches!(
        session.add_clip(Some(t(3.0)), None),
        Err(DomainError::InvalidState(_))
    ));
    assert_eq!(session.add_clip(Some(t(3.0)), Some(t(500.0))).unwrap(), 0);
}

#[test]
fn test_default_codec_change_follows_through() {
    let mut session = loaded(Some(60.0));
    session.add_clip(Some(t(1.0)), Some(t(2.0))).unwrap();
    session.add_clip(Some(t(3.0)), Some(t(4.0))).unwrap();
    session.add_frame(t(5.0)).unwrap();
    session
        .set_overrides(
            1,
            EncodingOverrides {
                codec: Some(Codec::Dnxhd),
                ..EncodingOverrides::default()
            },
        )
        .unwrap();
    assert!(session.items()[1].filename.ends_with(".mov"));

    session
        .set_defaults(EncodingSettings {
            codec: Codec::Vp9,
            ..EncodingSettings::default()
        })
        .unwrap();

    let names: Vec<_> = session.items().iter().map(|i| i.filename.as_str()).collect();
    assert!(names[0].ends_with(".webm"));
    assert!(names[1].ends_with(".mov"));
    assert!(names[2].ends_with(".jpg"));

    let jobs = session.resolve_jobs().unwrap();
    assert_eq!(jobs[0].settings.codec, Codec::Vp9);
    assert_eq!(jobs[1].settings.codec, Codec::Dnxhd);
}

#[test]
fn test_overrides_are_validated() {
    let mut session = loaded(Some(60.0));
    session.add_clip(Some(t(1.0)), Some(t(2.0))).unwrap();
    let bad = EncodingOverrides {
        speed: Some(0.0),
        ..EncodingOverrides::default()
    };
    assert!(session.set_overrides(0, bad).is_err());
    assert!(session.items()[0].overrides.is_empty());
}

#[test]
fn test_edit_operations() {
    let mut session = loaded(Some(60.0));
    session.add_clip(Some(t(1.0)), Some(t(2.0))).unwrap();
    session.add_frame(t(3.0)).unwrap();

    session.rename(0, "  opening.mp4 ").unwrap();
    assert_eq!(session.items()[0].filename, "opening.mp4");
    assert!(matches!(session.rename(0, "a/b.mp4"), Err(DomainError::BadArgs(_))));

    session.set_output_folder(1, "/tmp/frames").unwrap();
    assert_eq!(session.items()[1].output_folder, PathBuf::from("/tmp/frames"));

    assert!(matches!(session.remove(5), Err(DomainError::InvalidState(_))));
    assert!(matches!(session.rename(9, "x.mp4"), Err(DomainError::InvalidState(_))));
    let removed = session.remove(0).unwrap();
    assert_eq!(removed.filename, "opening.mp4");
    assert_eq!(session.len(), 1);

    session.clear();
    assert!(session.is_empty());
}

#[test]
fn test_custom_default_output_folder() {
    let mut session = loaded(Some(60.0));
    session.set_default_output_folder(Some(PathBuf::from("/exports")));
    session.add_frame(t(1.0)).unwrap();
    assert_eq!(session.items()[0].output_folder, PathBuf::from("/exports"));
    assert_eq!(session.default_output_folder(), Some(PathBuf::from("/exports")));
}

#[test]
fn test_take_jobs_snapshots_and_clears() {
    let mut session = loaded(Some(60.0));
    session.add_clip(Some(t(1.0)), Some(t(2.0))).unwrap();
    session.rename(0, "renamed.mkv").unwrap();

    let jobs = session.take_jobs().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].filename, "renamed.mp4");
    assert_eq!(jobs[0].settings, EncodingSettings::default());
    assert!(session.is_empty());
    assert_eq!(session.source_path(), Some(Path::new("/videos/talk.mp4")));
}
