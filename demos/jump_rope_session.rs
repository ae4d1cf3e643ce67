/// Jump rope example: MediaPipe landmarks in, skips and calories out
///
/// Uses the displacement strategy, configured from JSON the way an app would
/// ship it, and feeds full 33-point MediaPipe poses through the adapter.
use workout_engine::landmarks::mediapipe_index;
use workout_engine::{
    from_mediapipe, Activity, EngineConfig, JointId, ManualClock, PoseLandmark, SessionReport,
    UserProfile, WorkoutEngine,
};

const CONFIG: &str = r#"{
    "jump": {
        "strategy": { "kind": "displacement", "min_rise": 0.06, "cooldown_ms": 300 },
        "calories_per_jump": 0.07
    },
    "calories": { "session_activities": ["jump_rope"] }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Pose Workout Engine: Jump Rope Example ===\n");

    let config = EngineConfig::from_json_str(CONFIG)?;
    println!("Jump strategy: {:?}", config.jump.strategy);

    let clock = ManualClock::new(0);
    let profile = UserProfile::new(64.0)?.with_height(170.0)?.with_gender("F");
    let mut engine = WorkoutEngine::with_clock(config, profile, clock.clone())?;
    let started_at = chrono::Local::now();

    // 30 seconds at 30 fps, skipping at ~2 Hz: ankles lift for 3 frames out of 15
    let mut skips = 0;
    for i in 0..900u64 {
        let t = i * 33;
        clock.set(t);

        let airborne = i % 15 < 3;
        let ankle_y = if airborne { 0.82 } else { 0.9 };

        // Occasionally the estimator loses the person
        if i % 97 == 0 {
            engine.process_frame(None);
            continue;
        }

        let landmarks = standing_pose(ankle_y);
        let frame = from_mediapipe(t, &landmarks)?;
        skips += engine.process_frame(Some(&frame)).len();
    }

    let stats = engine.snapshot();
    println!("\nSkips detected: {}", skips);
    println!("Jump rope calories: {:.2}", engine.estimate(Activity::JumpRope));
    println!("{}", stats);

    let report = SessionReport::from_engine(started_at, &engine);
    println!("\n--- {} ---", report.file_name());
    print!("{}", report.to_text());
    println!("\nJSON: {}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Every landmark parked near the body center, with the tracked joints placed.
fn standing_pose(ankle_y: f32) -> Vec<PoseLandmark> {
    let mut landmarks = vec![PoseLandmark::new(0.5, 0.2, 0.0); 33];
    let place = |landmarks: &mut Vec<PoseLandmark>, joint: JointId, x: f32, y: f32| {
        landmarks[mediapipe_index(joint)] = PoseLandmark::new(x, y, 0.0);
    };

    place(&mut landmarks, JointId::LeftShoulder, 0.6, 0.3);
    place(&mut landmarks, JointId::RightShoulder, 0.4, 0.3);
    place(&mut landmarks, JointId::LeftElbow, 0.62, 0.45);
    place(&mut landmarks, JointId::RightElbow, 0.38, 0.45);
    place(&mut landmarks, JointId::LeftWrist, 0.64, 0.55);
    place(&mut landmarks, JointId::RightWrist, 0.36, 0.55);
    place(&mut landmarks, JointId::LeftHip, 0.55, 0.6);
    place(&mut landmarks, JointId::RightHip, 0.45, 0.6);
    place(&mut landmarks, JointId::LeftAnkle, 0.55, ankle_y);
    place(&mut landmarks, JointId::RightAnkle, 0.45, ankle_y);
    landmarks
}
