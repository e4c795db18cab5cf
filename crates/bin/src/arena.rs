//! Blob arena - real-time session driven by the autopilot.
//!
//! Usage: `arena [NAME] [RESTARTS]`

mod headless;

use arena::{Config, Session};
use contract::InputSource;
use futures_util::FutureExt;
use headless::{Autopilot, LogRenderer, RoundLimit};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Draw a frame every this many ticks.
const RENDER_EVERY: u64 = 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,arena=debug")),
        )
        .init();

    info!("Blob Arena v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_default();
    let restarts: u32 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 0,
    };

    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  World: {}x{}", config.world.size, config.world.size);
    info!("  Population: {} enemies, {} food", config.world.enemy_count, config.world.food_count);
    info!("  Tick interval: {}ms", config.world.tick_interval_ms);

    let tick_interval_ms = config.world.tick_interval_ms;
    let seed = config.world.seed.unwrap_or(0);
    let mut session = Session::new(config);
    session.start(&name);

    let mut prompt = RoundLimit::new(restarts);
    tokio::select! {
        _ = run_game_loop(&mut session, tick_interval_ms, Autopilot::new(seed), &mut prompt) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    info!(
        "Finished after {} ticks and {} rounds; final scores {:?}",
        session.tick_count(),
        session.rounds(),
        prompt.final_scores
    );
    Ok(())
}

/// Tick the session on a fixed interval until it halts.
async fn run_game_loop(session: &mut Session, tick_interval_ms: u64, mut autopilot: Autopilot, prompt: &mut RoundLimit) {
    let start = Instant::now() + Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(start, Duration::from_millis(tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut renderer = LogRenderer::default();
    let mut last_tick = Instant::now();

    loop {
        let scheduled = ticker.tick().await;

        // Drain any backlog so the next step covers all the elapsed time at once.
        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks to stay current (lag: {:?})",
                skipped,
                Instant::now().saturating_duration_since(scheduled)
            );
        }

        let now = Instant::now();
        let dt_ms = now.duration_since(last_tick).as_millis() as u64;
        last_tick = now;

        autopilot.observe(session);
        let frame = autopilot.poll();

        let tick_start = std::time::Instant::now();
        let summary = session.tick(&frame, dt_ms, prompt);
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

        if !session.is_running() {
            info!("Session halted");
            break;
        }

        let tick_budget = tick_interval_ms as f64 * 0.9;
        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} cells total",
                summary.tick,
                tick_ms,
                tick_budget,
                session.world().cell_counts().total
            );
        }

        if summary.restarted || summary.tick % RENDER_EVERY == 0 {
            session.render(&mut renderer);
        }
    }
}
