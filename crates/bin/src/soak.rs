//! Headless fast-forward: run N fixed-step ticks and log population statistics.
//!
//! Usage: `soak [TICKS] [SEED]`

mod headless;

use arena::{AbsorptionKind, Config, Session};
use contract::InputSource;
use headless::{Autopilot, LogRenderer, RoundLimit};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log a population line every this many ticks.
const REPORT_EVERY: u64 = 1000;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let ticks: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 10_000,
    };

    let mut config = Config::load()?;
    if let Some(raw) = args.next() {
        config.world.seed = Some(raw.parse()?);
    }
    let seed = config.world.seed.unwrap_or(0);
    let dt_ms = config.world.tick_interval_ms;
    info!("Soaking {} ticks of {}ms (seed {:?})", ticks, dt_ms, config.world.seed);

    let mut session = Session::new(config);
    session.start("soak");
    let mut autopilot = Autopilot::new(seed);
    let mut prompt = RoundLimit::new(u32::MAX);
    let mut renderer = LogRenderer::default();

    let mut absorbed: HashMap<&'static str, usize> = HashMap::new();
    let mut splits = 0usize;
    let mut ejects = 0usize;
    let mut enemy_ejects = 0usize;
    let mut eliminations = 0usize;
    let started = Instant::now();

    for _ in 0..ticks {
        autopilot.observe(&session);
        let frame = autopilot.poll();
        let summary = session.tick(&frame, dt_ms, &mut prompt);

        for absorption in &summary.collisions.absorptions {
            *absorbed.entry(kind_label(absorption.kind)).or_default() += 1;
        }
        splits += summary.pieces_split;
        ejects += summary.pellets_ejected;
        enemy_ejects += summary.enemy_pellets;
        eliminations += usize::from(summary.eliminated);

        if summary.tick % REPORT_EVERY == 0 {
            let world = session.world();
            let counts = world.cell_counts();
            info!(
                "t={}ms pieces={} mass={:.1} enemies={} (special {}) food={} pellets={} score={} round={}",
                world.now_ms(),
                counts.pieces,
                world.player_mass(),
                counts.enemies,
                counts.specials,
                counts.food,
                counts.ejected,
                session.score(),
                session.rounds()
            );
            session.render(&mut renderer);
        }
    }

    let elapsed = started.elapsed();
    info!(
        "Done: {} ticks in {:.2?} ({:.1}us/tick)",
        ticks,
        elapsed,
        elapsed.as_secs_f64() * 1e6 / ticks.max(1) as f64
    );
    info!(
        "Splits {}, ejects {} (enemy {}), eliminations {}",
        splits, ejects, enemy_ejects, eliminations
    );
    info!("Scores at elimination: {:?}", prompt.final_scores);
    let mut kinds: Vec<_> = absorbed.into_iter().collect();
    kinds.sort();
    for (kind, count) in kinds {
        info!("  {}: {}", kind, count);
    }
    Ok(())
}

fn kind_label(kind: AbsorptionKind) -> &'static str {
    match kind {
        AbsorptionKind::EnemyEatsEnemy => "enemy eats enemy",
        AbsorptionKind::EnemyEatsFood => "enemy eats food",
        AbsorptionKind::PlayerEatsFood => "player eats food",
        AbsorptionKind::PlayerEatsEnemy => "player eats enemy",
        AbsorptionKind::EnemyEatsPlayer => "enemy eats player",
        AbsorptionKind::PelletAbsorbed => "pellet absorbed",
    }
}
