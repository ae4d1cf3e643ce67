/// Basic usage example: Feed landmark frames, get punch events and stats
use workout_engine::{
    EngineConfig, JointId, LandmarkFrame, ManualClock, Point3D, Side, UserProfile, WorkoutEngine,
    WorkoutEvent,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Pose Workout Engine: Basic Example ===\n");

    // Default thresholds; the clock is driven by hand so the run is repeatable
    let clock = ManualClock::new(0);
    let profile = UserProfile::new(72.0)?;
    let mut engine = WorkoutEngine::with_clock(EngineConfig::default(), profile, clock.clone())?;

    // Simulate a right jab: (timestamp, wrist offset from the shoulder).
    // Negative x is outward for the right arm in a mirrored camera image.
    let jab = vec![
        // Guard (200-300ms)
        (200, None),
        (250, None),
        (300, None),

        // Punch out (350-550ms)
        (350, Some(0.00)),
        (400, Some(0.09)),
        (450, Some(0.18)),
        (500, Some(0.27)),
        (550, Some(0.35)),

        // Back to guard
        (650, None),
        (750, None),
    ];

    println!("Processing {} frames...\n", jab.len());

    let mut event_count = 0;

    for (timestamp, reach) in jab {
        let frame = right_arm_frame(timestamp, reach)?;

        for event in engine.process_frame(Some(&frame)) {
            event_count += 1;
            print_event(&event, event_count);
        }
    }

    // A tick where the pose estimator found nobody changes nothing
    engine.process_frame(None);

    clock.set(750);
    let stats = engine.snapshot();

    println!("\n=== Summary ===");
    println!("Total events: {}", event_count);
    println!("Right punches: {}", stats.punches(Side::Right));
    println!("Frames skipped: {}", engine.frames_skipped());
    println!("{}", stats);

    Ok(())
}

fn right_arm_frame(
    timestamp_ms: u64,
    reach: Option<f32>,
) -> Result<LandmarkFrame, Box<dyn std::error::Error>> {
    let shoulder = Point3D::new(0.4, 0.3, 0.0);
    let (elbow, wrist) = match reach {
        Some(r) => {
            let wrist = Point3D::new(0.4 - r, 0.4, 0.0);
            (shoulder.midpoint(&wrist), wrist)
        }
        None => (Point3D::new(0.4, 0.45, 0.0), Point3D::new(0.45, 0.32, 0.0)),
    };

    let frame = LandmarkFrame::from_joints(
        timestamp_ms,
        [
            (JointId::RightShoulder, shoulder),
            (JointId::RightElbow, elbow),
            (JointId::RightWrist, wrist),
            (JointId::LeftShoulder, Point3D::new(0.6, 0.3, 0.0)),
            (JointId::LeftElbow, Point3D::new(0.6, 0.45, 0.0)),
            (JointId::LeftWrist, Point3D::new(0.55, 0.32, 0.0)),
            (JointId::LeftHip, Point3D::new(0.55, 0.6, 0.0)),
            (JointId::RightHip, Point3D::new(0.45, 0.6, 0.0)),
            (JointId::LeftAnkle, Point3D::new(0.55, 0.9, 0.0)),
            (JointId::RightAnkle, Point3D::new(0.45, 0.9, 0.0)),
        ],
    )?;
    Ok(frame)
}

fn print_event(event: &WorkoutEvent, num: usize) {
    println!("--- Event {} ---", num);
    println!("Timestamp: {}ms", event.timestamp_ms);
    println!("Kind: {:?}", event.kind);
    if let Some(side) = event.side {
        println!("Side: {}", side.name());
    }
    println!("Magnitude: {:.2}", event.magnitude);
}
