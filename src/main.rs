//! Bouncy Car entry point
//!
//! Runs the simulation headless against the built-in demo scene, with a scripted
//! autopilot standing in for the keyboard. A real host supplies its own scene graph,
//! renderer and mixer and drives `GameSession` the same way.

use std::process::ExitCode;

use glam::UVec2;

use bouncy_car::audio::HeadlessAudio;
use bouncy_car::consts::FRAME_DT;
use bouncy_car::demo::{self, Autopilot};
use bouncy_car::scene::RecordingRenderer;
use bouncy_car::sim::{GameEvent, GameSession};
use bouncy_car::{Settings, Tuning};

/// Ten simulated minutes at 60 Hz
const FRAMES: u32 = 60 * 60 * 10;
const OBSTACLES: usize = 3;

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Bouncy Car (headless) starting...");

    let settings = Settings::load(Settings::FILE_NAME);
    log::info!(
        "Volume {:.2}/{:.2}{}, seed {:#x}",
        settings.master_volume,
        settings.sfx_volume,
        if settings.muted { " (muted)" } else { "" },
        settings.seed
    );
    let tuning = match &settings.tuning_path {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let mut session = match GameSession::new(
        demo::build_scene(OBSTACLES),
        HeadlessAudio::new(),
        tuning,
        &settings,
    ) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Scene setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut pilot = Autopilot::new();
    let mut renderer = RecordingRenderer::default();
    let viewport = UVec2::new(1280, 720);

    let mut jumps = 0u32;
    let mut crashes = 0u32;
    let mut obstacles_passed = 0u32;

    for _ in 0..FRAMES {
        pilot.drive(&mut session);
        session.update(FRAME_DT);
        session.draw(viewport, &mut renderer);

        for event in session.drain_events() {
            match event {
                GameEvent::Jumped => jumps += 1,
                GameEvent::Crashed => crashes += 1,
                GameEvent::ObstacleRecycled => obstacles_passed += 1,
                _ => {}
            }
        }
    }

    log::info!(
        "Ran {} frames: {jumps} jumps, {obstacles_passed} obstacles passed, {crashes} crashes, {} cues played",
        renderer.frames,
        session.audio().backend().started,
    );
    println!(
        "frames={} jumps={jumps} obstacles_passed={obstacles_passed} crashes={crashes}",
        renderer.frames
    );

    ExitCode::SUCCESS
}
