use crate::config::AppConfig;
use crate::scripted_input::ScriptedInputPlayer;
use anyhow::{Context, Result};
use glam::{Affine3A, Quat, Vec3};
use raydesk_input::Hand;
use raydesk_interaction::{ArbitrationEngine, Capabilities, Overlay, OverlayId, PointerOutcome};
use raydesk_testkit::{EventLog, JsonlSink, RecordingPointer, SessionReport, SessionResult};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outputs and limits for one headless run.
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Newline-delimited JSON log of every overlay callback.
    pub events_path: Option<PathBuf>,
    /// Pretty JSON session summary.
    pub report_path: Option<PathBuf>,
    /// Stop after this many frames even if the script is longer.
    pub max_frames: Option<u64>,
}

/// Overlays placed by [`build_demo_scene`].
#[derive(Debug, Clone, Copy)]
pub struct DemoScene {
    pub desktop: OverlayId,
    pub curved: OverlayId,
    pub keyboard: OverlayId,
}

/// Flat 16:9 screen ahead, curved ultrawide to the right, square keyboard below.
pub fn build_demo_scene(engine: &ArbitrationEngine, log: &EventLog) -> Result<DemoScene> {
    let desktop = Overlay::new("desktop", 1.6)
        .with_capabilities(Capabilities::HOVER | Capabilities::GRAB)
        .with_behavior(log.behavior("desktop"))
        .with_content(1920, 1080)
        .with_spawn_position(Vec3::new(0.0, -0.1, -1.5))
        .with_transform(Affine3A::from_translation(Vec3::new(0.0, 1.5, -1.5)));

    let curved = Overlay::new("curved", 1.8)
        .with_capabilities(Capabilities::HOVER | Capabilities::GRAB)
        .with_behavior(log.behavior("curved"))
        .with_content(2560, 1080)
        .with_curvature(0.15)
        .with_spawn_position(Vec3::new(1.5, -0.1, -1.0))
        .with_transform(Affine3A::from_rotation_translation(
            Quat::from_rotation_y(-0.9),
            Vec3::new(1.6, 1.5, -1.0),
        ));

    let mut keyboard = Overlay::new("keyboard", 0.6)
        .with_capabilities(Capabilities::HOVER)
        .with_behavior(log.behavior("keyboard"))
        .with_content(800, 800)
        .with_transform(Affine3A::from_rotation_translation(
            Quat::from_rotation_x(-0.6),
            Vec3::new(0.0, 0.9, -0.7),
        ));
    keyboard.face_viewer = false;

    let scene = DemoScene {
        desktop: engine
            .register_target(desktop.shared())
            .context("registering desktop")?,
        curved: engine
            .register_target(curved.shared())
            .context("registering curved screen")?,
        keyboard: engine
            .register_target(keyboard.shared())
            .context("registering keyboard")?,
    };
    debug!(
        desktop = %scene.desktop,
        curved = %scene.curved,
        keyboard = %scene.keyboard,
        "Demo scene registered"
    );
    Ok(scene)
}

/// Play `script` through a fresh engine and demo scene.
pub fn run(
    config: &AppConfig,
    mut script: ScriptedInputPlayer,
    options: &HeadlessOptions,
) -> Result<SessionReport> {
    let mut engine = ArbitrationEngine::new(&config.interaction);
    let (left_laser, _) = RecordingPointer::new(Hand::Left);
    let (right_laser, _) = RecordingPointer::new(Hand::Right);
    engine.register_pointers(Box::new(left_laser), Box::new(right_laser))?;

    let log = EventLog::new();
    build_demo_scene(&engine, &log)?;

    let mut sink = match &options.events_path {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("creating event log {}", path.display()))?,
        ),
        None => None,
    };

    let limit = options
        .max_frames
        .unwrap_or(u64::MAX)
        .min(script.total_frames());
    let mut report = SessionReport::new(script.name());
    info!(
        session = %script.name(),
        frames = limit,
        "Starting headless session"
    );

    while engine.frame() < limit {
        log.set_frame(engine.frame() + 1);
        let frame = engine.update(&mut script);
        report.record_frame(&frame);

        for hand in Hand::ALL {
            if let PointerOutcome::Grabbing { overlay } = frame.outcome(hand) {
                debug!(frame = frame.frame, %hand, %overlay, "Carrying overlay");
            }
        }

        let events = log.drain();
        report.record_events(&events);
        if let Some(sink) = sink.as_mut() {
            sink.write_all(&events)?;
        }
    }

    if !script.is_finished() {
        warn!(
            played = engine.frame(),
            total = script.total_frames(),
            "Session stopped before the script ended"
        );
        report.result = SessionResult::Fail;
    }

    if let Some(path) = &options.report_path {
        report
            .write_to_file(path)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    info!(
        frames = report.frames,
        hovers = report.event_count("hover"),
        grabs = report.event_count("grabbed"),
        "Headless session finished"
    );
    Ok(report)
}
