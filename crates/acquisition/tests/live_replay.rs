use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use hammertrack_acquisition::{
    run_feed, AcquisitionController, AcquisitionEvent, Generation, ReplayFeed,
};
use hammertrack_common::config::{AcquisitionConfig, AnalysisConfig};
use hammertrack_model::analysis::AnalysisOutcome;
use hammertrack_model::detection::DetectedPoint;
use hammertrack_model::posture::{Joint, PostureSample, Skeleton};
use hammertrack_model::revolution::TiltDirection;
use hammertrack_model::session::parse_session;
use hammertrack_model::state::AcquisitionState;

fn load_fixture_session() -> hammertrack_model::session::RecordedSession {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("live-session.jsonl");

    let content = std::fs::read_to_string(path).expect("fixture session should be readable");
    parse_session(&content).expect("fixture session should parse")
}

#[tokio::test]
async fn recorded_session_replays_to_one_analysed_throw() {
    let session = load_fixture_session();
    assert_eq!(session.header.as_ref().map(|h| h.frame_rate_hz), Some(30.0));

    let controller = AcquisitionController::new(AcquisitionConfig::default(), AnalysisConfig::default())
        .unwrap()
        .shared();
    let mut events = controller.subscribe();

    let mut feed = ReplayFeed::new(session);
    let stats = run_feed(
        controller.clone(),
        &mut feed,
        3,
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert_eq!(stats.records, 237);
    assert_eq!(stats.throttled, 110);
    assert_eq!(stats.stale, 0);
    assert_eq!(stats.completed, 1);
    assert_eq!(controller.state(), AcquisitionState::Idle);
    assert!(!controller.snapshot().started);

    let mut completed = Vec::new();
    let mut transitions = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            AcquisitionEvent::StateChanged { from, to, .. } => transitions.push((from, to)),
            AcquisitionEvent::Completed {
                trajectory,
                outcome,
                knee_angles,
                ..
            } => completed.push((trajectory, outcome, knee_angles)),
        }
    }

    assert_eq!(
        transitions,
        vec![
            (AcquisitionState::Idle, AcquisitionState::Armed),
            (AcquisitionState::Armed, AcquisitionState::Tracking),
            (AcquisitionState::Tracking, AcquisitionState::Completing),
            (AcquisitionState::Completing, AcquisitionState::Idle),
        ]
    );
    assert_eq!(completed.len(), 1);

    let (trajectory, outcome, knee_angles) = &completed[0];
    assert_eq!(trajectory.len(), 36);
    assert_eq!(trajectory.first().map(|p| p.frame_number), Some(40));

    let analysis = match outcome {
        AnalysisOutcome::Ready(analysis) => analysis,
        other => panic!("expected an analysis, got {other:?}"),
    };
    assert_eq!(analysis.total_frames, 36);
    assert_eq!(analysis.turning_point_count, 13);
    assert_eq!(analysis.revolution_count(), 6);
    assert!((analysis.revolutions[0].angle - 24.558945).abs() < 1e-5);
    assert_eq!(analysis.revolutions[0].direction, TiltDirection::Left);
    assert_eq!(analysis.revolutions[0].frame_range(), 40..=76);
    assert!((analysis.average_angle - 12.198996).abs() < 1e-5);

    assert_eq!(knee_angles.left.map(|s| s.samples), Some(52));
    assert_eq!(knee_angles.right.map(|s| s.samples), Some(52));
}

fn raised_arm(frame: u64) -> PostureSample {
    PostureSample::new(
        frame,
        frame as f64 / 30.0,
        Skeleton {
            right_wrist: Some(Joint::new(0.6, 0.1, 0.9)),
            right_elbow: Some(Joint::new(0.6, 0.2, 0.9)),
            right_shoulder: Some(Joint::new(0.6, 0.3, 0.9)),
            ..Default::default()
        },
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_and_resets_never_mix_generations() {
    let config = AcquisitionConfig {
        dwell_secs: 0.0,
        max_missed_detections: 3,
        ..Default::default()
    };
    let controller = AcquisitionController::new(config, AnalysisConfig::default())
        .unwrap()
        .shared();
    let mut events = controller.subscribe();
    controller.start();

    // Detector: one hit then four misses, tagging each hit with the
    // generation it was computed for.
    let detector = {
        let controller = controller.clone();
        tokio::spawn(async move {
            let mut submitted: HashMap<u64, Generation> = HashMap::new();
            for frame in 0..3_000u64 {
                let generation = controller.current_generation();
                tokio::task::yield_now().await;
                if frame % 5 == 0 {
                    let x = 0.2 + (frame % 60) as f64 / 100.0;
                    let point = DetectedPoint::new(frame, frame as f64 / 30.0, x, 0.5, 0.9);
                    submitted.insert(frame, generation);
                    controller.on_detection(generation, point);
                } else {
                    controller.on_missed_detection(generation, frame);
                }
            }
            submitted
        })
    };

    let pose = {
        let controller = controller.clone();
        tokio::spawn(async move {
            for frame in 0..3_000u64 {
                controller.on_posture(&raised_arm(frame));
                tokio::task::yield_now().await;
            }
        })
    };

    let resetter = {
        let controller = controller.clone();
        tokio::spawn(async move {
            for _ in 0..25 {
                tokio::time::sleep(Duration::from_millis(1)).await;
                controller.reset();
            }
        })
    };

    let submitted = detector.await.unwrap();
    pose.await.unwrap();
    resetter.await.unwrap();

    let mut completed_generations = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AcquisitionEvent::Completed {
            generation,
            trajectory,
            ..
        } = event
        {
            for point in trajectory.points() {
                assert_eq!(
                    submitted.get(&point.frame_number),
                    Some(&generation),
                    "frame {} leaked into generation {generation}",
                    point.frame_number
                );
            }
            for pair in trajectory.points().windows(2) {
                assert!(pair[0].frame_number < pair[1].frame_number);
            }
            completed_generations.push(generation);
        }
    }

    assert!(!completed_generations.is_empty());
    let unique: HashSet<Generation> = completed_generations.iter().copied().collect();
    assert_eq!(unique.len(), completed_generations.len());

    let current = controller.current_generation();
    for point in controller.trajectory().points() {
        assert_eq!(submitted.get(&point.frame_number), Some(&current));
    }
}
