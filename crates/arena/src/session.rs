//! Game session: owns the world and drives the per-tick update.

use crate::actions;
use crate::ai::{self, AiSummary};
use crate::collision::{self, CollisionReport};
use crate::config::Config;
use crate::entity::Cell;
use crate::motion;
use crate::schedule::{ScheduledEvent, Scheduler};
use crate::world::World;
use contract::{CircleSprite, Command, Hud, InputFrame, LeaderboardRow, NameLabel, Renderer, RestartPrompt};
use std::time::Instant;
use tracing::{debug, info};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for a name.
    #[default]
    Lobby,
    Running,
    /// The player declined to restart. Ticks do nothing.
    Halted,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    pub tick: u64,
    pub events_fired: usize,
    pub ai: AiSummary,
    pub collisions: CollisionReport,
    pub pieces_split: usize,
    pub pellets_ejected: usize,
    /// Pellets thrown out by enemies.
    pub enemy_pellets: usize,
    /// The last piece was eaten this tick.
    pub eliminated: bool,
    /// A new round was started after elimination.
    pub restarted: bool,
}

/// A single-player game session.
pub struct Session {
    config: Config,
    world: World,
    scheduler: Scheduler,
    player_name: String,
    /// Event score: food and enemies absorbed by the player.
    score: u64,
    phase: Phase,
    tick_count: u64,
    rounds: u32,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let world = World::new(&config);
        Self {
            config,
            world,
            scheduler: Scheduler::new(),
            player_name: String::new(),
            score: 0,
            phase: Phase::Lobby,
            tick_count: 0,
            rounds: 0,
        }
    }

    /// Submit the player name and start the first round.
    ///
    /// A blank name falls back to the configured default; long names are truncated.
    pub fn start(&mut self, name: &str) {
        self.player_name = self.sanitize_name(name);
        self.begin_round();
        info!("Session started for '{}'", self.player_name);
    }

    fn sanitize_name(&self, name: &str) -> String {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            self.config.player.default_name.as_str()
        } else {
            trimmed
        };
        name.chars().take(self.config.player.max_name_length).collect()
    }

    /// Build a fresh world from the config and restart every timer.
    fn begin_round(&mut self) {
        self.world = World::new(&self.config);
        self.world.populate(&self.config);
        self.scheduler.clear();
        self.scheduler
            .schedule(self.config.enemy.special_interval_ms, ScheduledEvent::SpawnSpecial);
        self.score = 0;
        self.phase = Phase::Running;
        self.rounds += 1;
    }

    /// Advance the simulation by `dt_ms`.
    pub fn tick(&mut self, input: &InputFrame, dt_ms: u64, prompt: &mut impl RestartPrompt) -> TickSummary {
        if self.phase != Phase::Running {
            return TickSummary::default();
        }
        let tick_start = Instant::now();
        self.tick_count += 1;
        let mut summary = TickSummary {
            tick: self.tick_count,
            ..Default::default()
        };

        self.world.advance_clock(dt_ms);
        summary.events_fired = self.run_due_events();

        let movement_start = Instant::now();
        motion::steer_pieces(&mut self.world, input.steering, &self.config);
        motion::integrate(&mut self.world, dt_ms as f32 / 1000.0);
        let movement_time = movement_start.elapsed();

        let ai_start = Instant::now();
        summary.ai = ai::update_enemies(&mut self.world, &self.config);
        let ai_time = ai_start.elapsed();

        let collision_start = Instant::now();
        summary.collisions = collision::resolve(&mut self.world, &self.config);
        self.score += summary.collisions.score;
        let collision_time = collision_start.elapsed();

        if !self.world.player_cells.is_empty() {
            self.apply_commands(input, &mut summary);
            let pellets = actions::enemy_ejections(&mut self.world, &mut self.scheduler, &self.config);
            summary.enemy_pellets = pellets.len();
        }

        if self.world.player_cells.is_empty() {
            summary.eliminated = true;
            self.end_round(prompt, &mut summary);
        }

        if self.tick_count % 400 == 0 {
            let counts = self.world.cell_counts();
            debug!(
                "Tick #{}: {:.2}ms total | move={:.2}ms ai={:.2}ms collision={:.2}ms | {} cells, {} pending events",
                self.tick_count,
                tick_start.elapsed().as_secs_f64() * 1000.0,
                movement_time.as_secs_f64() * 1000.0,
                ai_time.as_secs_f64() * 1000.0,
                collision_time.as_secs_f64() * 1000.0,
                counts.total,
                self.scheduler.len()
            );
        }

        summary
    }

    fn run_due_events(&mut self) -> usize {
        let now = self.world.now_ms();
        let mut fired = 0;
        while let Some((due_ms, event)) = self.scheduler.pop_due(now) {
            fired += 1;
            match event {
                ScheduledEvent::SettleSplit { piece, heading } => {
                    actions::settle_split(&mut self.world, &self.config, piece, heading);
                }
                ScheduledEvent::Merge { piece, sibling } => {
                    let ready = self.world.piece(piece).is_some_and(|p| p.can_merge(now));
                    if ready {
                        actions::merge_pieces(&mut self.world, piece, sibling);
                    }
                }
                ScheduledEvent::ExpirePellet { pellet } => {
                    actions::expire_pellet(&mut self.world, pellet);
                }
                ScheduledEvent::SpawnSpecial => {
                    self.spawn_special();
                    self.scheduler.schedule(
                        due_ms + self.config.enemy.special_interval_ms,
                        ScheduledEvent::SpawnSpecial,
                    );
                }
            }
        }
        fired
    }

    fn spawn_special(&mut self) {
        let Some(near) = self.world.primary_piece().map(|p| p.position()) else {
            return;
        };
        let id = self.world.spawn_special_enemy(&self.config, near);
        info!("Special enemy {} hunting '{}'", id, self.player_name);
    }

    fn apply_commands(&mut self, input: &InputFrame, summary: &mut TickSummary) {
        let aim = input.aim_point();
        for command in &input.commands {
            match command {
                Command::Split => {
                    let created = actions::split_pieces(&mut self.world, &mut self.scheduler, &self.config, aim);
                    summary.pieces_split += created.len();
                }
                Command::Eject => {
                    if actions::eject_mass(&mut self.world, &mut self.scheduler, &self.config, aim).is_some() {
                        summary.pellets_ejected += 1;
                    }
                }
            }
        }
    }

    fn end_round(&mut self, prompt: &mut impl RestartPrompt, summary: &mut TickSummary) {
        info!(
            "'{}' eliminated after {}ms with score {}",
            self.player_name,
            self.world.now_ms(),
            self.score
        );
        if prompt.restart(self.score) {
            self.begin_round();
            summary.restarted = true;
            info!("Round {} started", self.rounds);
        } else {
            self.phase = Phase::Halted;
            info!("Session halted");
        }
    }

    /// Player row plus one row per enemy, sorted by score descending.
    ///
    /// Scores are floored masses. Ties keep the player first, then enemy spawn order.
    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        let mut rows = Vec::with_capacity(self.world.enemy_cells.len() + 1);
        rows.push(LeaderboardRow {
            name: self.player_name.clone(),
            score: self.world.player_mass().floor() as u64,
            is_player: true,
        });
        rows.extend(self.world.enemies().map(|e| LeaderboardRow {
            name: e.name.clone(),
            score: e.mass().floor() as u64,
            is_player: false,
        }));
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows
    }

    /// Draw the current frame.
    pub fn render(&self, renderer: &mut impl Renderer) {
        for food in self.world.foods() {
            renderer.circle(&sprite(food, None));
        }
        for pellet in self.world.ejects() {
            renderer.circle(&sprite(pellet, None));
        }
        for enemy in self.world.enemies() {
            renderer.circle(&sprite(enemy, enemy.stroke()));
            renderer.label(&NameLabel {
                position: enemy.position(),
                text: enemy.name.clone(),
            });
        }
        for piece in self.world.pieces() {
            renderer.circle(&sprite(piece, None));
            renderer.label(&NameLabel {
                position: piece.position(),
                text: self.player_name.clone(),
            });
        }
        renderer.leaderboard(&self.leaderboard());
        renderer.hud(&self.hud());
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            pieces: self.world.player_cells.len(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Rounds started so far, including the current one.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

fn sprite(cell: &impl Cell, stroke: Option<contract::Color>) -> CircleSprite {
    let data = cell.data();
    CircleSprite {
        position: data.position,
        radius: data.radius(),
        fill: data.color,
        stroke,
    }
}
