//! Crash Flight headless host
//!
//! Runs the round engine and the scene together on a simulated 60 Hz frame
//! clock, drawing into the tessellating reference surface.
//!
//! Usage: `crash-flight [settings.json] [seconds] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use std::time::Duration;

    use crash_flight::consts::FRAME_DT;
    use crash_flight::renderer::DrawListBackend;
    use crash_flight::scene::NoAssets;
    use crash_flight::{RoundEngine, RoundPhase, RoundSnapshot, SceneOrchestrator, Settings};

    const WIDTH: u32 = 1280;
    const HEIGHT: u32 = 720;
    const DEFAULT_SECONDS: f64 = 60.0;
    const DEFAULT_SEED: u64 = 42;

    crash_flight::platform::init_logging();
    log::info!("Crash Flight (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) => Settings::load_from(Path::new(path)),
        None => Settings::default(),
    };
    let seconds = args
        .get(1)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);
    let seed = args
        .get(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);
    log::info!(
        "Simulating {:.1}s at quality {} with seed {}",
        seconds,
        settings.quality.as_str(),
        seed
    );

    let mut engine = RoundEngine::with_seed(settings.engine.clone(), seed);
    let inbox: Rc<RefCell<Vec<RoundSnapshot>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = inbox.clone();
    engine.subscribe(move |snapshot: &RoundSnapshot| sink.borrow_mut().push(snapshot.clone()));

    let mut backend = DrawListBackend::new();
    let mut scene = SceneOrchestrator::new(WIDTH, HEIGHT, settings).with_seed(seed);
    if let Err(e) = pollster::block_on(scene.init(&mut backend, &NoAssets)) {
        log::error!("Scene init failed: {}", e);
        engine.teardown();
        std::process::exit(1);
    }

    engine.start();
    let frame_dt = Duration::from_secs_f64(FRAME_DT as f64);
    let frames = (seconds / FRAME_DT as f64).ceil() as u64;
    let mut last_phase = RoundPhase::Idle;
    let mut rounds = 0u32;

    for _ in 0..frames {
        engine.advance(frame_dt);
        for snapshot in inbox.borrow_mut().drain(..) {
            // The engine already logs each crash
            if snapshot.phase == RoundPhase::Crashed && last_phase != RoundPhase::Crashed {
                rounds += 1;
            }
            last_phase = snapshot.phase;
            scene.update_state(snapshot.phase, snapshot.multiplier, snapshot.elapsed_seconds);
        }
        scene.frame(FRAME_DT);
    }

    let history: Vec<String> = engine
        .snapshot()
        .history
        .iter()
        .map(|entry| format!("{:.2}x", entry.multiplier))
        .collect();
    let stats = backend.stats();
    log::info!("Rounds played: {}", rounds);
    log::info!("History (newest first): {}", history.join(" "));
    log::info!(
        "Frames presented: {}, last frame vertices: {}",
        stats.frames_presented,
        stats.last_frame_vertices
    );

    scene.destroy();
    engine.teardown();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host embeds the library; there is no wasm entry point here
}
