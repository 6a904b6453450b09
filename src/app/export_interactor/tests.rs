// Unit tests for the export queue orchestrator

use super::*;
use crate::adapters::{ChannelEventAdapter, LocalFsAdapter};
use crate::app::test_support::{FakeProcess, Step};
use tokio::sync::mpsc::UnboundedReceiver;

fn interactor(
    steps: Vec<Step>,
) -> (ExportInteractor, Arc<FakeProcess>, UnboundedReceiver<AppEvent>) {
    let process = Arc::new(FakeProcess::new(steps));
    let (events, rx) = ChannelEventAdapter::new();
    let interactor = ExportInteractor::new(
        Arc::clone(&process) as Arc<dyn ProcessPort>,
        Arc::new(LocalFsAdapter::new()),
        Arc::new(events),
        "ffmpeg",
    );
    (interactor, process, rx)
}

fn clip_job(name: &str, folder: &Path, codec: Codec) -> ExportJob {
    let kind = JobKind::clip(TimeSpec::from_seconds(1.0), TimeSpec::from_seconds(4.5)).unwrap();
    let settings = EncodingSettings {
        codec,
        ..EncodingSettings::default()
    };
    ExportJob::new(kind, name, folder, settings).unwrap()
}

fn progress(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<(usize, usize, String)> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AppEvent::ExportProgress {
            current,
            total,
            filename,
        } = event
        {
            seen.push((current, total, filename));
        }
    }
    seen
}

#[tokio::test]
async fn test_failed_item_does_not_abort_batch() {
    let out = tempfile::tempdir().unwrap();
    let (interactor, process, mut rx) = interactor(vec![
        Step::Exit { code: 0, stderr: "" },
        Step::Exit {
            code: 1,
            stderr: "Conversion failed!",
        },
        Step::Exit { code: 0, stderr: "" },
    ]);
    let jobs = vec![
        clip_job("a.mp4", out.path(), Codec::H264),
        clip_job("b.mp4", out.path(), Codec::H264),
        clip_job("c.mp4", out.path(), Codec::H264),
    ];

    let result = interactor.export_queue(Path::new("/src/in.mp4"), &jobs).await;

    assert_eq!(result.exported, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.total(), jobs.len());
    assert!(result.elapsed_seconds > 0.0);
    assert_eq!(
        result.failures,
        vec![ExportFailure {
            index: 2,
            filename: "b.mp4".to_string(),
            reason: "Tool failed: Conversion failed!".to_string(),
        }]
    );
    assert_eq!(
        progress(&mut rx),
        vec![
            (1, 3, "a.mp4".to_string()),
            (2, 3, "b.mp4".to_string()),
            (3, 3, "c.mp4".to_string()),
        ]
    );
    assert_eq!(process.requests().len(), 3);
    assert_eq!(process.max_in_flight(), 1);
}

#[tokio::test]
async fn test_extension_is_corrected_at_flush() {
    let out = tempfile::tempdir().unwrap();
    let (interactor, process, mut rx) = interactor(vec![Step::Exit { code: 0, stderr: "" }]);
    let jobs = vec![clip_job("clip_001.mp4", out.path(), Codec::Vp9)];

    let result = interactor.export_queue(Path::new("/src/in.mp4"), &jobs).await;
    assert_eq!(result.exported, 1);

    let args = &process.requests()[0].args;
    let expected = out.path().join("clip_001.webm").to_string_lossy().into_owned();
    assert_eq!(args.last(), Some(&expected));
    assert!(args.contains(&"libvpx-vp9".to_string()));
    assert_eq!(progress(&mut rx)[0].2, "clip_001.webm");
}

#[tokio::test]
async fn test_frame_job_has_no_range_arguments() {
    let out = tempfile::tempdir().unwrap();
    let (interactor, process, _rx) = interactor(vec![Step::Exit { code: 0, stderr: "" }]);
    let job = ExportJob::new(
        JobKind::frame(TimeSpec::parse("00:00:05").unwrap()),
        "frame_001.jpg",
        out.path(),
        EncodingSettings::default(),
    )
    .unwrap();

    interactor.export_queue(Path::new("/src/in.mp4"), &[job]).await;

    let args = &process.requests()[0].args;
    assert_eq!(args[0..2], ["-ss", "00:00:05.000"]);
    assert!(args.contains(&"-frames:v".to_string()));
    assert!(!args.contains(&"-t".to_string()));
    assert!(!args.contains(&"-c:v".to_string()));
}

#[tokio::test]
async fn test_output_folder_is_created() {
    let out = tempfile::tempdir().unwrap();
    let nested = out.path().join("deep").join("clips");
    let (interactor, _process, _rx) = interactor(vec![Step::Exit { code: 0, stderr: "" }]);

    let result = interactor
        .export_queue(Path::new("/src/in.mp4"), &[clip_job("a.mp4", &nested, Codec::H264)])
        .await;

    assert_eq!(result.exported, 1);
    assert!(nested.is_dir());
}

#[tokio::test]
async fn test_unusable_output_folder_counts_as_failure() {
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").unwrap();
    let (interactor, process, mut rx) = interactor(vec![Step::Exit { code: 0, stderr: "" }]);
    let jobs = vec![
        clip_job("a.mp4", &blocker.join("sub"), Codec::H264),
        clip_job("b.mp4", out.path(), Codec::H264),
    ];

    let result = interactor.export_queue(Path::new("/src/in.mp4"), &jobs).await;

    assert_eq!((result.exported, result.failed), (1, 1));
    assert_eq!(process.requests().len(), 1);
    assert_eq!(progress(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_launch_and_timeout_failures_are_counted() {
    let out = tempfile::tempdir().unwrap();
    let (interactor, _process, _rx) = interactor(vec![Step::LaunchError, Step::Timeout]);
    let interactor = interactor.with_job_timeout(Some(Duration::from_secs(60)));
    let jobs = vec![
        clip_job("a.mp4", out.path(), Codec::H264),
        clip_job("b.mp4", out.path(), Codec::H264),
    ];

    let result = interactor.export_queue(Path::new("/src/in.mp4"), &jobs).await;
    assert_eq!(result.failed, 2);
    assert!(result.failures[1].reason.contains("60 seconds"));
}

#[tokio::test]
async fn test_empty_queue() {
    let (interactor, process, mut rx) = interactor(vec![]);
    let result = interactor.export_queue(Path::new("/src/in.mp4"), &[]).await;

    assert_eq!(result.total(), 0);
    assert!(process.requests().is_empty());
    assert!(progress(&mut rx).is_empty());
}

#[tokio::test]
async fn test_rerun_gives_same_counts() {
    let out = tempfile::tempdir().unwrap();
    let jobs = vec![
        clip_job("a.mp4", out.path(), Codec::H264),
        clip_job("b.mov", out.path(), Codec::ProRes422),
    ];
    let steps = || {
        vec![
            Step::Exit { code: 0, stderr: "" },
            Step::Exit { code: 1, stderr: "bad" },
        ]
    };

    let (first, _, _rx1) = interactor(steps());
    let (second, _, _rx2) = interactor(steps());
    let a = first.export_queue(Path::new("/src/in.mp4"), &jobs).await;
    let b = second.export_queue(Path::new("/src/in.mp4"), &jobs).await;
    assert_eq!((a.exported, a.failed), (b.exported, b.failed));
}
