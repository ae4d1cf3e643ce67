//! Pose Workout Engine
//!
//! Runs a short synthetic boxing and jump-rope session through the engine and
//! prints the events and the final session report.
//!
//! Usage: `workout-engine [config.json] [weight_kg]`
//!
//! This is the entry point for standalone binaries. For library use, see lib.rs.

use anyhow::{Context, Result};

use workout_engine::{
    EngineConfig, EngineResult, JointId, LandmarkFrame, ManualClock, Point3D, SessionReport, Side,
    UserProfile, WorkoutEngine,
};

fn main() -> Result<()> {
    println!("Pose Workout Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("Punch and jump-rope detection from body landmarks\n");

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => EngineConfig::default(),
    };

    let weight_kg = match args.next() {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("weight must be a number, got {:?}", raw))?,
        None => 70.0,
    };
    let profile = UserProfile::new(weight_kg)?;

    // Synthetic session: the clock follows the frame timestamps.
    let clock = ManualClock::new(0);
    let mut engine = WorkoutEngine::with_clock(config, profile, clock.clone())?;
    let started_at = chrono::Local::now();

    let mut t = 0;
    for round in 0..12 {
        let side = if round % 2 == 0 { Side::Right } else { Side::Left };

        let mut ticks = Vec::new();
        for _ in 0..10 {
            ticks.push(Some(guard(&mut t, 33, -0.3)?));
        }
        for i in 0..=9 {
            ticks.push(Some(punch(&mut t, 20, side, 0.35 * i as f32 / 9.0)?));
        }
        // Pose estimator loses the person for a few ticks.
        for _ in 0..3 {
            ticks.push(None);
        }
        ticks.push(Some(guard(&mut t, 33, 0.4)?));
        for _ in 0..5 {
            ticks.push(Some(guard(&mut t, 33, -0.3)?));
        }

        for tick in ticks {
            for event in engine.process_frame(tick.as_ref()) {
                println!(
                    "[{:>6}ms] {:?} {} magnitude={:.2}",
                    event.timestamp_ms,
                    event.kind,
                    event.side.map(|s| s.name()).unwrap_or("-"),
                    event.magnitude
                );
            }
        }
        clock.set(t);
    }

    println!("\n=== Summary ===");
    println!("{}", engine.snapshot());
    println!(
        "Frames processed: {}, skipped: {}",
        engine.frames_processed(),
        engine.frames_skipped()
    );

    let report = SessionReport::from_engine(started_at, &engine);
    println!("\n--- {} ---", report.file_name());
    print!("{}", report.to_text());

    Ok(())
}

/// Both arms in guard, hips-to-ankles at `ratio`.
fn guard(t: &mut u64, step_ms: u64, ratio: f32) -> EngineResult<LandmarkFrame> {
    frame(t, step_ms, None, ratio)
}

fn punch(t: &mut u64, step_ms: u64, side: Side, reach: f32) -> EngineResult<LandmarkFrame> {
    frame(t, step_ms, Some((side, reach)), -0.3)
}

fn frame(
    t: &mut u64,
    step_ms: u64,
    punching: Option<(Side, f32)>,
    ratio: f32,
) -> EngineResult<LandmarkFrame> {
    let joints = JointId::ALL.map(|joint| {
        let side = joint.side();
        let (sx, outward) = match side {
            Side::Right => (0.4, -1.0),
            Side::Left => (0.6, 1.0),
        };
        let reach = punching.filter(|(s, _)| *s == side).map(|(_, r)| r);
        let wrist = match reach {
            Some(r) => Point3D::new(sx + outward * r, 0.4, 0.0),
            None => Point3D::new(sx - outward * 0.05, 0.32, 0.0),
        };
        let shoulder = Point3D::new(sx, 0.3, 0.0);

        match joint {
            JointId::LeftShoulder | JointId::RightShoulder => shoulder,
            JointId::LeftElbow | JointId::RightElbow => match reach {
                Some(_) => shoulder.midpoint(&wrist),
                None => Point3D::new(sx, 0.45, 0.0),
            },
            JointId::LeftWrist | JointId::RightWrist => wrist,
            JointId::LeftHip | JointId::RightHip => Point3D::new(sx, 0.6, 0.0),
            JointId::LeftAnkle | JointId::RightAnkle => Point3D::new(sx, 0.6 - ratio, 0.0),
        }
    });

    let timestamp_ms = *t;
    *t += step_ms;
    LandmarkFrame::new(timestamp_ms, joints)
}
