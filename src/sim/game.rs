//! Game state machine and frame driver
//!
//! Each frame runs exactly one state handler, then the registry reap pass.
//! In Playing the handler performs, in order: input, one physics step,
//! contact evaluation, consequences, entity updates.
//!
//! Two clocks: the simulation clock only advances in Playing, so pausing
//! never counts toward ages, lifetimes, sprees or gameplay signals. The
//! frame clock always advances and drives fades and overlays, which also
//! run on menu screens.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, BodyKind};
use super::contact::ContactCollector;
use super::effects::{
    AberrationSignal, EarthquakeSignal, FadeDirection, FadeSignal, Overlay, OverlayQueue,
    PostEffects,
};
use super::entities::{Ball, Block, Ground, Racket, Wall, WallSide, playground_size};
use super::evaluate::{Consequence, EvaluatorConfig, evaluate};
use super::level::{BlockSpecial, LevelSet, LevelTimer};
use super::particles::{ParticleEffect, ParticleEffectDef};
use super::registry::{BodyRegistry, Entity, EntityId};
use crate::consts::*;
use crate::highscores::{HighScores, now_millis};
use crate::physics::World;
use crate::render::{RenderTarget, Resources};
use crate::settings::Settings;
use crate::{to_meters, to_pixels};

/// Game states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initialization,
    WelcomeScreen,
    CreditsScreen,
    OptionsScreen,
    AchievementsScreen,
    Playing,
    LevelCompleted,
    Pausing,
    PlayerWon,
    GameOver,
}

/// Whole campaign or one chosen level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playmode {
    #[default]
    Campaign,
    SingleLevel,
}

/// Discrete input action, at most one per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    Pause,
    Back,
    NewBall,
    Restart,
    Continue,
}

/// Welcome screen menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Credits,
    Options,
    Achievements,
    /// Play only the level with this index
    SingleLevel(usize),
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub action: Action,
    /// Horizontal racket movement in pixels
    pub paddle_delta: f32,
    pub menu: Option<MenuChoice>,
}

impl FrameInput {
    pub fn action(action: Action) -> Self {
        Self {
            action,
            ..Default::default()
        }
    }
}

/// Things that happened this frame (for audio/visual feedback)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    NewBall,
    BallOut,
    BlockHit,
    RacketHit,
    RacketHitBlock,
    Explosion,
    NewLife,
    KillingSpree { bonus: i64 },
    Earthquake,
    LevelCompleted,
    /// Points for finishing under par time
    TimeBonus { points: i64 },
    GameOver,
    PlayerWon,
    NewHighScore { rank: usize },
    /// Points gained or lost, at a screen position in pixels
    ScorePopup { points: i64, position: Vec2 },
}

/// Score needed for the extra life with the given index
pub fn extra_life_threshold(index: usize) -> i64 {
    let last = NEW_LIFE_AFTER_POINTS.len() - 1;
    if index <= last {
        NEW_LIFE_AFTER_POINTS[index]
    } else {
        NEW_LIFE_AFTER_POINTS[last] + (index - last) as i64 * NEW_LIFE_AFTER_POINTS_DEFAULT
    }
}

/// Owns the world, the registry and all gameplay state
pub struct Game {
    state: State,
    playmode: Playmode,
    settings: Settings,
    resources: Resources,
    levels: LevelSet,
    highscores: HighScores,

    world: World,
    registry: BodyRegistry,
    contacts: ContactCollector,
    evaluator: EvaluatorConfig,
    rng: Pcg32,

    sim_clock: Duration,
    frame_clock: Duration,

    score: i64,
    level_start_score: i64,
    lives: u32,
    penalty: i64,
    level_index: usize,
    level_timer: LevelTimer,
    time_bonus: i64,
    blocks_left: usize,
    ball: Option<EntityId>,
    racket: Option<EntityId>,
    extra_lives_awarded: usize,
    recent_kills: VecDeque<Duration>,
    /// Active ball density scale and when it ends
    ball_density: Option<(f32, Duration)>,

    effects: PostEffects,
    overlays: OverlayQueue,
    events: Vec<GameEvent>,
    last_rank: Option<usize>,
    quit_requested: bool,
}

impl Game {
    pub fn new(settings: Settings, resources: Resources, levels: LevelSet, seed: u64) -> Self {
        Self {
            state: State::Initialization,
            playmode: Playmode::Campaign,
            settings,
            resources,
            levels,
            highscores: HighScores::new(),

            world: World::new(Vec2::new(0.0, GRAVITY)),
            registry: BodyRegistry::new(),
            contacts: ContactCollector::new(),
            evaluator: EvaluatorConfig::default(),
            rng: Pcg32::seed_from_u64(seed),

            sim_clock: Duration::ZERO,
            frame_clock: Duration::ZERO,

            score: 0,
            level_start_score: 0,
            lives: DEFAULT_LIVES,
            penalty: DEFAULT_PENALTY,
            level_index: 0,
            level_timer: LevelTimer::default(),
            time_bonus: 0,
            blocks_left: 0,
            ball: None,
            racket: None,
            extra_lives_awarded: 0,
            recent_kills: VecDeque::new(),
            ball_density: None,

            effects: PostEffects::new(),
            overlays: OverlayQueue::default(),
            events: Vec::new(),
            last_rank: None,
            quit_requested: false,
        }
    }

    pub fn with_highscores(mut self, highscores: HighScores) -> Self {
        self.highscores = highscores;
        self
    }

    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Run one frame
    pub fn tick(&mut self, input: &FrameInput, dt: Duration) {
        self.frame_clock += dt;

        match self.state {
            State::Initialization => self.on_initialization(),
            State::WelcomeScreen => self.on_welcome_screen(input),
            State::CreditsScreen => self.on_credits_screen(input),
            State::OptionsScreen => self.on_options_screen(input),
            State::AchievementsScreen => self.on_achievements_screen(input),
            State::Playing => self.on_playing(input, dt),
            State::Pausing => self.on_pausing(input),
            State::LevelCompleted => self.on_level_completed(input),
            State::GameOver => self.on_game_over(input),
            State::PlayerWon => self.on_player_won(input),
        }

        self.registry.reap_dead(&mut self.world);
        self.overlays.update(self.frame_clock);
    }

    /// Hand every live entity to the renderer
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.registry.draw_all(target, &self.resources);
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    fn on_initialization(&mut self) {
        log::info!("Initialized with {} levels", self.levels.len());
        self.goto_welcome_screen();
    }

    fn on_welcome_screen(&mut self, input: &FrameInput) {
        match input.menu {
            Some(MenuChoice::Credits) => return self.goto_screen(State::CreditsScreen),
            Some(MenuChoice::Options) => return self.goto_screen(State::OptionsScreen),
            Some(MenuChoice::Achievements) => return self.goto_screen(State::AchievementsScreen),
            Some(MenuChoice::SingleLevel(index)) => {
                if index < self.levels.len() {
                    return self.new_game(Playmode::SingleLevel, index);
                }
                log::warn!("No level {} to play, {} available", index + 1, self.levels.len());
            }
            None => {}
        }
        match input.action {
            Action::Continue => self.new_game(Playmode::Campaign, 0),
            Action::Back => {
                log::info!("Quit requested");
                self.quit_requested = true;
            }
            _ => {}
        }
    }

    fn on_credits_screen(&mut self, input: &FrameInput) {
        self.leave_info_screen(input);
    }

    fn on_options_screen(&mut self, input: &FrameInput) {
        self.leave_info_screen(input);
    }

    fn on_achievements_screen(&mut self, input: &FrameInput) {
        self.leave_info_screen(input);
    }

    fn leave_info_screen(&mut self, input: &FrameInput) {
        if matches!(input.action, Action::Back | Action::Continue) {
            self.goto_welcome_screen();
        }
    }

    fn on_playing(&mut self, input: &FrameInput, dt: Duration) {
        match input.action {
            Action::Pause => return self.goto_pausing(),
            Action::Back => return self.goto_welcome_screen(),
            Action::Restart => return self.restart_level(),
            Action::NewBall => self.new_ball(),
            Action::Continue | Action::None => {}
        }

        if let Some(racket) = self
            .racket
            .and_then(|id| self.registry.get_mut(id))
            .and_then(Entity::as_racket_mut)
        {
            racket.push(input.paddle_delta);
        }

        self.sim_clock += dt;
        self.contacts.begin_step();
        self.world.step(
            dt.as_secs_f32(),
            VELOCITY_ITERATIONS,
            POSITION_ITERATIONS,
            &mut self.contacts,
        );

        let consequences = evaluate(self.contacts.points(), &self.registry, &self.evaluator);
        for consequence in consequences {
            self.apply(consequence);
        }

        self.registry.update_all(dt, &mut self.world);

        if self.effects.take_expired_aberration(self.sim_clock) {
            log::debug!("Aberration over, gravity restored");
            self.world.set_gravity(Vec2::new(0.0, GRAVITY));
        }

        if self
            .ball_density
            .is_some_and(|(_, until)| self.sim_clock >= until)
        {
            log::debug!("Ball density restored");
            self.ball_density = None;
            self.set_ball_density(BALL_DENSITY);
        }

        if self.blocks_left == 0 {
            self.goto_level_completed();
        } else if self.lives == 0 && self.ball.is_none() {
            self.goto_game_over();
        }
    }

    fn on_pausing(&mut self, input: &FrameInput) {
        match input.action {
            Action::Continue | Action::Pause => {
                log::info!("Resumed");
                self.state = State::Playing;
            }
            Action::Back => self.goto_welcome_screen(),
            _ => {}
        }
    }

    fn on_level_completed(&mut self, input: &FrameInput) {
        match input.action {
            Action::Continue if self.playmode == Playmode::SingleLevel => {
                self.goto_welcome_screen();
            }
            Action::Continue => {
                let next = self.level_index + 1;
                if next < self.levels.len() {
                    self.start_level(next);
                } else {
                    self.goto_player_won();
                }
            }
            Action::Back => self.goto_welcome_screen(),
            _ => {}
        }
    }

    fn on_game_over(&mut self, input: &FrameInput) {
        if matches!(input.action, Action::Back | Action::Continue) {
            self.goto_welcome_screen();
        }
    }

    fn on_player_won(&mut self, input: &FrameInput) {
        if matches!(input.action, Action::Back | Action::Continue) {
            self.goto_welcome_screen();
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Reject transitions from states that cannot reach `to`
    fn allow_transition(&self, allowed: &[State], to: State) -> bool {
        if allowed.contains(&self.state) {
            return true;
        }
        log::error!("Invalid transition {:?} -> {:?}", self.state, to);
        debug_assert!(false, "invalid transition {:?} -> {:?}", self.state, to);
        false
    }

    fn goto_welcome_screen(&mut self) {
        self.clear_world();
        self.effects.start_fade(self.frame_clock, FadeDirection::Lighten, FADE_EFFECT_DURATION);
        self.state = State::WelcomeScreen;
        log::info!("Welcome screen");
    }

    fn goto_screen(&mut self, screen: State) {
        if !self.allow_transition(&[State::WelcomeScreen], screen) {
            return;
        }
        self.state = screen;
    }

    fn goto_pausing(&mut self) {
        if !self.allow_transition(&[State::Playing], State::Pausing) {
            return;
        }
        log::info!("Paused at {:.2}s", self.sim_clock.as_secs_f32());
        self.state = State::Pausing;
    }

    fn goto_level_completed(&mut self) {
        if !self.allow_transition(&[State::Playing], State::LevelCompleted) {
            return;
        }
        self.level_timer.stop(self.sim_clock);
        let elapsed = self.level_timer.elapsed(self.sim_clock);
        self.time_bonus = self
            .levels
            .get(self.level_index)
            .map_or(0, |level| level.time_bonus(elapsed));
        if self.time_bonus > 0 {
            self.events.push(GameEvent::TimeBonus {
                points: self.time_bonus,
            });
            self.add_to_score(self.time_bonus, 0.5 * playground_size());
        }
        log::info!(
            "Level {} completed in {:.1}s, level score {} (time bonus {}), total {}",
            self.level_index + 1,
            elapsed.as_secs_f32(),
            self.level_score(),
            self.time_bonus,
            self.score
        );
        self.events.push(GameEvent::LevelCompleted);
        self.overlays.push(Overlay::new(
            "Level complete",
            format!("Score {}", self.score),
            OVERLAY_DURATION,
        ));
        self.state = State::LevelCompleted;
    }

    fn goto_game_over(&mut self) {
        if !self.allow_transition(&[State::Playing], State::GameOver) {
            return;
        }
        log::info!("Game over, score {}", self.score);
        self.events.push(GameEvent::GameOver);
        self.effects.start_fade(self.frame_clock, FadeDirection::Darken, FADE_EFFECT_DURATION);
        self.overlays.push(Overlay::new("Game over", "", OVERLAY_DURATION));
        self.record_high_score();
        self.state = State::GameOver;
    }

    fn goto_player_won(&mut self) {
        if !self.allow_transition(&[State::LevelCompleted], State::PlayerWon) {
            return;
        }
        log::info!("Campaign won, score {}", self.score);
        self.events.push(GameEvent::PlayerWon);
        self.effects.start_fade(self.frame_clock, FadeDirection::Darken, FADE_EFFECT_DURATION);
        self.overlays.push(Overlay::new("You won", format!("Score {}", self.score), OVERLAY_DURATION));
        self.record_high_score();
        self.state = State::PlayerWon;
    }

    /// Fresh attempt starting at `first_level`
    fn new_game(&mut self, playmode: Playmode, first_level: usize) {
        log::info!("New game ({:?})", playmode);
        self.playmode = playmode;
        self.score = 0;
        self.lives = DEFAULT_LIVES;
        self.extra_lives_awarded = 0;
        self.last_rank = None;
        self.start_level(first_level);
    }

    fn restart_level(&mut self) {
        log::info!("Restarting level {}", self.level_index + 1);
        self.score = self.level_start_score;
        self.start_level(self.level_index);
    }

    /// Rebuild the playground for a level and enter Playing
    fn start_level(&mut self, index: usize) {
        if !self.allow_transition(
            &[State::WelcomeScreen, State::LevelCompleted, State::Playing],
            State::Playing,
        ) {
            return;
        }
        let Some(level) = self.levels.get(index).cloned() else {
            log::error!("No level {}", index);
            return;
        };

        self.clear_world();
        self.level_index = index;
        self.level_start_score = self.score;

        self.registry.add(Ground::spawn(&mut self.world));
        for side in [WallSide::Left, WallSide::Right, WallSide::Top] {
            self.registry.add(Wall::spawn(&mut self.world, side));
        }
        self.racket = Some(self.registry.add(Racket::spawn(&mut self.world)));
        for p in &level.placements {
            let block = Block::spawn(&mut self.world, to_meters(p.position), p.score, p.special);
            self.registry.add(block);
        }
        self.blocks_left = level.placements.len();
        self.level_timer = LevelTimer::start(self.sim_clock);
        self.time_bonus = 0;
        self.spawn_ball();

        self.effects.start_fade(self.frame_clock, FadeDirection::Lighten, FADE_EFFECT_DURATION);
        self.overlays.push(Overlay::new(
            level.name.clone(),
            format!("{} blocks", self.blocks_left),
            OVERLAY_DURATION,
        ));
        self.state = State::Playing;
        log::info!("Level {} ({}) started with {} blocks", index + 1, level.name, self.blocks_left);
    }

    /// Drop every entity and reset per-level state
    fn clear_world(&mut self) {
        self.registry.clear(&mut self.world);
        self.world.set_gravity(Vec2::new(0.0, GRAVITY));
        self.contacts.begin_step();
        self.effects.clear_gameplay();
        self.ball = None;
        self.racket = None;
        self.blocks_left = 0;
        self.recent_kills.clear();
        self.ball_density = None;
    }

    // ========================================================================
    // Gameplay
    // ========================================================================

    fn racket_position(&self) -> Option<Vec2> {
        match self.racket.and_then(|id| self.registry.get(id)) {
            Some(Entity::Racket(r)) => Some(r.position()),
            _ => None,
        }
    }

    fn ball_position(&self) -> Option<Vec2> {
        self.ball
            .and_then(|id| self.registry.get(id))
            .and_then(Entity::as_ball)
            .map(Ball::position)
    }

    /// Launch a ball upward from just above the racket
    fn spawn_ball(&mut self) {
        let size = Vec2::new(PLAYGROUND_WIDTH, PLAYGROUND_HEIGHT) * INV_SCALE;
        let racket = self
            .racket_position()
            .unwrap_or(Vec2::new(0.5 * size.x, size.y - RACKET_BOTTOM_OFFSET * INV_SCALE));
        let position = racket - Vec2::new(0.0, RACKET_HALF_HEIGHT + BALL_RADIUS + 0.25);
        let velocity = Vec2::new(self.rng.random_range(-4.0..=4.0), -12.0);
        let ball = Ball::spawn(&mut self.world, position, velocity);
        self.ball = Some(self.registry.add(ball));
        if let Some((scale, _)) = self.ball_density {
            self.set_ball_density(BALL_DENSITY * scale);
        }
        self.events.push(GameEvent::NewBall);
    }

    fn set_ball_density(&mut self, density: f32) {
        let handle = self
            .ball
            .and_then(|id| self.registry.get(id))
            .and_then(|ball| ball.handles().first().copied());
        if let Some(handle) = handle {
            self.world.set_density(handle, density);
        }
    }

    fn new_ball(&mut self) {
        if self.ball.is_some() || self.lives == 0 {
            return;
        }
        self.spawn_ball();
    }

    fn apply(&mut self, consequence: Consequence) {
        match consequence {
            Consequence::BlockDestroyed { block, .. } => self.destroy_block(block),
            Consequence::BallLost { ball } => self.lose_ball(ball),
            Consequence::RacketHit { position, impulse } => {
                log::debug!("Racket hit with impulse {:.2}", impulse);
                self.events.push(GameEvent::RacketHit);
                self.spawn_sparks(position);
            }
            Consequence::RacketHitBlock { block, .. } => {
                log::debug!("Racket touched block {:?}", block);
                self.events.push(GameEvent::RacketHitBlock);
            }
        }
    }

    fn destroy_block(&mut self, id: EntityId) {
        let Some(block) = self
            .registry
            .get(id)
            .and_then(Entity::as_block)
            .filter(|b| b.is_alive())
        else {
            return;
        };
        let (position, points, special) = (block.position(), block.score(), block.special());

        self.registry.kill(id, &mut self.world);
        self.blocks_left = self.blocks_left.saturating_sub(1);
        self.events.push(GameEvent::BlockHit);
        self.add_to_score(points, position);
        self.register_kill(position);
        self.spawn_explosion(position);
        self.trigger_special(special);
    }

    fn lose_ball(&mut self, id: EntityId) {
        if self.ball != Some(id) {
            return;
        }
        let position = self.ball_position().unwrap_or_default();
        self.registry.kill(id, &mut self.world);
        self.ball = None;
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::BallOut);
        self.add_to_score(-self.penalty, position);
        log::info!("Ball lost, {} lives left", self.lives);
    }

    /// Change the score and award any extra lives reached
    fn add_to_score(&mut self, points: i64, position: Vec2) {
        self.score = (self.score + points).max(0);
        self.events.push(GameEvent::ScorePopup {
            points,
            position: to_pixels(position),
        });

        while self.score >= extra_life_threshold(self.extra_lives_awarded) {
            self.extra_lives_awarded += 1;
            self.lives += 1;
            self.events.push(GameEvent::NewLife);
            self.overlays
                .push(Overlay::new("Extra life", "", OVERLAY_DURATION));
            log::info!("Extra life at {} points", self.score);
        }
    }

    /// Count a block kill toward a killing spree
    fn register_kill(&mut self, position: Vec2) {
        let now = self.sim_clock;
        self.recent_kills.push_back(now);
        while self
            .recent_kills
            .front()
            .is_some_and(|&t| now - t > KILLING_SPREE_INTERVAL)
        {
            self.recent_kills.pop_front();
        }
        if self.recent_kills.len() >= KILLINGS_PER_KILLING_SPREE {
            self.recent_kills.clear();
            self.events.push(GameEvent::KillingSpree {
                bonus: KILLING_SPREE_BONUS,
            });
            self.overlays.push(Overlay::new(
                "Killing spree",
                format!("+{}", KILLING_SPREE_BONUS),
                OVERLAY_DURATION,
            ));
            self.add_to_score(KILLING_SPREE_BONUS, position);
        }
    }

    fn trigger_special(&mut self, special: BlockSpecial) {
        match special {
            BlockSpecial::None => {}
            BlockSpecial::Earthquake {
                intensity,
                duration_ms,
            } => {
                self.effects.start_earthquake(
                    self.sim_clock,
                    intensity,
                    Duration::from_millis(duration_ms),
                );
                self.events.push(GameEvent::Earthquake);
            }
            BlockSpecial::Aberration {
                gravity_scale,
                duration_ms,
            } => {
                let duration = Duration::from_millis(duration_ms).max(ABERRATION_EFFECT_DURATION);
                self.world.set_gravity(Vec2::new(0.0, GRAVITY * gravity_scale));
                self.effects
                    .start_aberration(self.sim_clock, gravity_scale, duration);
            }
            BlockSpecial::BallDensity { scale, duration_ms } => {
                let until = self.sim_clock + Duration::from_millis(duration_ms);
                self.ball_density = Some((scale, until));
                self.set_ball_density(BALL_DENSITY * scale);
                log::debug!("Ball density x{} for {}ms", scale, duration_ms);
            }
        }
    }

    fn spawn_explosion(&mut self, position: Vec2) {
        let mut def = ParticleEffectDef::explosion(position, self.resources.textures.particle);
        def.count = self.settings.explosion_particles();
        if def.count == 0 {
            return;
        }
        def.ball_collision_enabled = self.settings.explosion_ball_collision;
        let shader = if self.settings.explosion_shaders_enabled() {
            self.resources.explosion_shaders.next_shader()
        } else {
            None
        };
        let effect = ParticleEffect::new(&def, &mut self.world, &mut self.rng, shader);
        self.registry.add(effect);
        self.events.push(GameEvent::Explosion);
    }

    fn spawn_sparks(&mut self, position: Vec2) {
        let mut def = ParticleEffectDef::sparks(position, self.resources.textures.soft_particle);
        def.count = self.settings.particle_budget(def.count);
        if def.count == 0 {
            return;
        }
        let shader = if self.settings.use_shaders {
            self.resources.particle_system_shader
        } else {
            None
        };
        let effect = ParticleEffect::new(&def, &mut self.world, &mut self.rng, shader);
        self.registry.add(effect);
    }

    fn record_high_score(&mut self) {
        if self.playmode != Playmode::Campaign {
            return;
        }
        let level = self.level_index as u32 + 1;
        self.last_rank = self.highscores.add_score(self.score, level, now_millis());
        if let Some(rank) = self.last_rank {
            log::info!("New high score #{}: {}", rank, self.score);
            self.events.push(GameEvent::NewHighScore { rank });
        }
    }

    // ========================================================================
    // Driver helpers
    // ========================================================================

    /// Input that plays the game unattended: starts games, serves new balls
    /// and keeps the racket under the ball
    pub fn autopilot(&self) -> FrameInput {
        match self.state {
            State::WelcomeScreen | State::LevelCompleted => FrameInput::action(Action::Continue),
            State::Pausing => FrameInput::action(Action::Continue),
            State::Playing => {
                if self.ball.is_none() {
                    return FrameInput::action(Action::NewBall);
                }
                let delta = match (self.ball_position(), self.racket_position()) {
                    (Some(ball), Some(racket)) => ((ball.x - racket.x) * SCALE).clamp(-12.0, 12.0),
                    _ => 0.0,
                };
                FrameInput {
                    paddle_delta: delta,
                    ..Default::default()
                }
            }
            _ => FrameInput::default(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> State {
        self.state
    }

    pub fn playmode(&self) -> Playmode {
        self.playmode
    }

    /// Total score of the game so far
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Points gained since the current level started, time bonus included
    pub fn level_score(&self) -> i64 {
        self.score - self.level_start_score
    }

    /// Time bonus awarded for the last completed level
    pub fn time_bonus(&self) -> i64 {
        self.time_bonus
    }

    /// Simulated play time of the current level
    pub fn level_time(&self) -> Duration {
        self.level_timer.elapsed(self.sim_clock)
    }

    /// Current ball density multiplier (1 when no special is active)
    pub fn ball_density_scale(&self) -> f32 {
        self.ball_density.map_or(1.0, |(scale, _)| scale)
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn blocks_left(&self) -> usize {
        self.blocks_left
    }

    /// Simulated time spent in Playing
    pub fn sim_time(&self) -> Duration {
        self.sim_clock
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Rank of the last recorded high score
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn earthquake(&self) -> Option<EarthquakeSignal> {
        if !self.settings.effective_earthquake() {
            return None;
        }
        self.effects.earthquake(self.sim_clock)
    }

    pub fn aberration(&self) -> Option<AberrationSignal> {
        self.effects.aberration(self.sim_clock)
    }

    pub fn fade(&self) -> Option<FadeSignal> {
        self.effects.fade(self.frame_clock)
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlays.current()
    }

    pub fn contacts(&self) -> &ContactCollector {
        &self.contacts
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Live particle effects
    pub fn effect_count(&self) -> usize {
        self.registry.count_kind(BodyKind::Particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingTarget;
    use crate::settings::QualityPreset;
    use crate::sim::level::{BlockPlacement, LevelDef};

    fn dt() -> Duration {
        Duration::from_secs_f32(SIM_DT)
    }

    fn single_block_levels(count: usize) -> LevelSet {
        let levels = (0..count)
            .map(|i| LevelDef {
                name: format!("Test {}", i + 1),
                par_time_secs: 0,
                placements: vec![BlockPlacement {
                    position: Vec2::new(320.0, 200.0),
                    score: 250,
                    special: BlockSpecial::None,
                }],
            })
            .collect();
        LevelSet { levels }
    }

    fn playing_game(levels: LevelSet) -> Game {
        let mut game = Game::new(Settings::default(), Resources::default(), levels, 42);
        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.state(), State::WelcomeScreen);
        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.state(), State::Playing);
        game
    }

    fn ball_handle(game: &Game) -> crate::physics::BodyHandle {
        let id = game.ball.unwrap();
        game.registry.get(id).unwrap().handles()[0]
    }

    fn block_ids(game: &Game) -> Vec<EntityId> {
        game.registry
            .iter()
            .filter(|(_, e)| e.kind() == BodyKind::Block)
            .map(|(id, _)| id)
            .collect()
    }

    fn clear_blocks(game: &mut Game) {
        let ball = game.ball.unwrap();
        for block in block_ids(game) {
            game.apply(Consequence::BlockDestroyed {
                block,
                ball,
                position: Vec2::ZERO,
            });
        }
    }

    #[test]
    fn test_level_is_built() {
        let game = playing_game(LevelSet::demo());
        let blocks = LevelSet::demo().levels[0].placements.len();
        assert_eq!(game.registry.count_kind(BodyKind::Block), blocks);
        assert_eq!(game.registry.count_kind(BodyKind::Ball), 1);
        assert_eq!(game.registry.count_kind(BodyKind::Wall), 3);
        assert_eq!(game.blocks_left(), blocks);
        assert_eq!(game.overlay().unwrap().title, "Level 1");
        assert!(game.fade().is_some());
    }

    #[test]
    fn test_menu_screens_return_to_welcome() {
        let mut game = Game::new(Settings::default(), Resources::default(), LevelSet::demo(), 1);
        game.tick(&FrameInput::default(), dt());
        let credits = FrameInput {
            menu: Some(MenuChoice::Credits),
            ..Default::default()
        };
        game.tick(&credits, dt());
        assert_eq!(game.state(), State::CreditsScreen);
        game.tick(&FrameInput::action(Action::Back), dt());
        assert_eq!(game.state(), State::WelcomeScreen);
        game.tick(&FrameInput::action(Action::Back), dt());
        assert!(game.quit_requested());
    }

    #[test]
    fn test_pause_freezes_and_resumes_without_drift() {
        let mut game = playing_game(LevelSet::demo());
        for _ in 0..10 {
            game.tick(&FrameInput::default(), dt());
        }
        let handle = ball_handle(&game);
        let ball_id = game.ball.unwrap();
        let before = game.world.position(handle).unwrap();
        let sim_before = game.sim_time();
        let age_before = game.registry.get(ball_id).unwrap().timed().age();

        game.tick(&FrameInput::action(Action::Pause), dt());
        assert_eq!(game.state(), State::Pausing);
        assert_eq!(game.world.position(handle).unwrap(), before, "no step on the pause frame");

        for _ in 0..100 {
            game.tick(&FrameInput::default(), dt());
        }
        assert_eq!(game.world.position(handle).unwrap(), before);
        assert_eq!(game.sim_time(), sim_before);
        assert_eq!(game.registry.get(ball_id).unwrap().timed().age(), age_before);

        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.state(), State::Playing);
        assert_eq!(game.sim_time(), sim_before);

        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.sim_time(), sim_before + dt());
        assert_eq!(
            game.registry.get(ball_id).unwrap().timed().age(),
            age_before + dt()
        );
    }

    #[test]
    fn test_ball_block_contact_scores_once() {
        let mut game = playing_game(single_block_levels(1));
        game.drain_events();
        let handle = ball_handle(&game);
        game.world.set_linear_velocity(handle, Vec2::new(0.0, -20.0));

        for _ in 0..120 {
            game.tick(&FrameInput::default(), dt());
            if game.state() != State::Playing {
                break;
            }
        }

        assert_eq!(game.state(), State::LevelCompleted);
        assert_eq!(game.score(), 250);
        assert_eq!(game.blocks_left(), 0);
        let events = game.drain_events();
        let hits = events.iter().filter(|e| **e == GameEvent::BlockHit).count();
        assert_eq!(hits, 1);
        assert!(events.contains(&GameEvent::Explosion));
        assert_eq!(game.registry.count_kind(BodyKind::Block), 0);
    }

    #[test]
    fn test_lost_ball_costs_life_and_penalty() {
        let mut game = playing_game(LevelSet::demo());
        game.score = 500;
        let handle = ball_handle(&game);
        game.world.set_position(handle, Vec2::new(20.0, 24.4));
        game.world.set_linear_velocity(handle, Vec2::new(0.0, 10.0));

        for _ in 0..60 {
            game.tick(&FrameInput::default(), dt());
            if game.ball.is_none() {
                break;
            }
        }
        assert!(game.ball.is_none());
        assert_eq!(game.lives(), DEFAULT_LIVES - 1);
        assert_eq!(game.score(), 400);
        assert_eq!(game.state(), State::Playing);

        game.tick(&FrameInput::action(Action::NewBall), dt());
        assert!(game.ball.is_some());
    }

    #[test]
    fn test_last_life_ends_game_and_records_score() {
        let mut game = playing_game(LevelSet::demo());
        game.score = 500;
        game.lives = 1;
        let ball = game.ball.unwrap();
        game.apply(Consequence::BallLost { ball });
        game.tick(&FrameInput::default(), dt());

        assert_eq!(game.state(), State::GameOver);
        assert_eq!(game.highscores().top_score(), Some(400));
        assert_eq!(game.last_rank(), Some(1));
        assert_eq!(game.fade().unwrap().direction, FadeDirection::Darken);

        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.state(), State::WelcomeScreen);
        assert!(game.registry.is_empty());
    }

    #[test]
    fn test_campaign_ends_in_player_won() {
        let mut game = playing_game(single_block_levels(2));
        for level in 0..2 {
            assert_eq!(game.level_index(), level);
            clear_blocks(&mut game);
            game.tick(&FrameInput::default(), dt());
            assert_eq!(game.state(), State::LevelCompleted);
            game.tick(&FrameInput::action(Action::Continue), dt());
        }
        assert_eq!(game.state(), State::PlayerWon);
        assert_eq!(game.score(), 500);
        assert!(game.highscores().top_score().is_some());
    }

    #[test]
    fn test_extra_life_thresholds() {
        assert_eq!(extra_life_threshold(0), 2_500);
        assert_eq!(extra_life_threshold(5), 100_000);
        assert_eq!(extra_life_threshold(6), 200_000);
        assert_eq!(extra_life_threshold(8), 400_000);

        let mut game = playing_game(LevelSet::demo());
        game.add_to_score(5_000, Vec2::ZERO);
        assert_eq!(game.lives(), DEFAULT_LIVES + 2);
        assert_eq!(
            game.drain_events()
                .iter()
                .filter(|e| **e == GameEvent::NewLife)
                .count(),
            2
        );
    }

    #[test]
    fn test_killing_spree_window() {
        let mut game = playing_game(LevelSet::demo());
        for _ in 0..4 {
            game.register_kill(Vec2::ZERO);
            game.sim_clock += Duration::from_millis(500);
        }
        game.register_kill(Vec2::ZERO);
        assert_eq!(game.score(), KILLING_SPREE_BONUS);

        // Kills spread wider than the window never add up
        let mut game = playing_game(LevelSet::demo());
        for _ in 0..10 {
            game.register_kill(Vec2::ZERO);
            game.sim_clock += Duration::from_millis(1_000);
        }
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_spree_bonus_can_earn_extra_life() {
        let mut game = playing_game(LevelSet::demo());
        game.score = 2_000;
        game.drain_events();
        let at = Vec2::new(1.0, 2.0);
        for _ in 0..KILLINGS_PER_KILLING_SPREE {
            game.register_kill(at);
        }

        assert_eq!(game.score(), 3_000);
        assert_eq!(game.lives(), DEFAULT_LIVES + 1);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::KillingSpree {
            bonus: KILLING_SPREE_BONUS
        }));
        assert!(events.contains(&GameEvent::NewLife));
        assert!(events.contains(&GameEvent::ScorePopup {
            points: KILLING_SPREE_BONUS,
            position: to_pixels(at),
        }));
    }

    #[test]
    fn test_time_bonus_on_level_completed() {
        let mut levels = single_block_levels(1);
        levels.levels[0].par_time_secs = 60;
        let mut game = playing_game(levels);
        game.drain_events();
        clear_blocks(&mut game);
        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.state(), State::LevelCompleted);

        // One frame of play leaves 59 whole seconds on the clock
        let bonus = 59 * LEVEL_TIME_BONUS_PER_SECOND;
        assert_eq!(game.time_bonus(), bonus);
        assert_eq!(game.level_score(), 250 + bonus);
        assert_eq!(game.score(), 250 + bonus);
        assert_eq!(game.level_time(), dt());
        assert!(
            game.drain_events()
                .contains(&GameEvent::TimeBonus { points: bonus })
        );

        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.level_time(), dt());
    }

    #[test]
    fn test_level_score_is_per_level() {
        let mut game = playing_game(single_block_levels(2));
        clear_blocks(&mut game);
        game.tick(&FrameInput::default(), dt());
        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.score(), 250);
        assert_eq!(game.level_score(), 0);
        assert_eq!(game.time_bonus(), 0);
    }

    #[test]
    fn test_single_level_play() {
        let mut game = Game::new(Settings::default(), Resources::default(), single_block_levels(3), 5);
        game.tick(&FrameInput::default(), dt());
        let pick = |index| FrameInput {
            menu: Some(MenuChoice::SingleLevel(index)),
            ..Default::default()
        };

        game.tick(&pick(7), dt());
        assert_eq!(game.state(), State::WelcomeScreen);

        game.tick(&pick(2), dt());
        assert_eq!(game.state(), State::Playing);
        assert_eq!(game.playmode(), Playmode::SingleLevel);
        assert_eq!(game.level_index(), 2);

        clear_blocks(&mut game);
        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.state(), State::LevelCompleted);
        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.state(), State::WelcomeScreen);
        assert!(game.highscores().is_empty());

        // Losing a single level leaves the table alone too
        game.tick(&pick(0), dt());
        game.score = 500;
        game.lives = 1;
        let ball = game.ball.unwrap();
        game.apply(Consequence::BallLost { ball });
        game.tick(&FrameInput::default(), dt());
        assert_eq!(game.state(), State::GameOver);
        assert!(game.highscores().is_empty());
        assert_eq!(game.last_rank(), None);

        game.tick(&FrameInput::action(Action::Continue), dt());
        game.tick(&FrameInput::action(Action::Continue), dt());
        assert_eq!(game.playmode(), Playmode::Campaign);
        assert_eq!(game.level_index(), 0);
    }

    #[test]
    fn test_ball_density_special() {
        let mut game = playing_game(single_block_levels(1));
        let base = game.world.mass(ball_handle(&game)).unwrap();
        game.trigger_special(BlockSpecial::BallDensity {
            scale: 3.0,
            duration_ms: 300,
        });
        assert_eq!(game.ball_density_scale(), 3.0);
        assert!((game.world.mass(ball_handle(&game)).unwrap() - 3.0 * base).abs() < 1e-4);

        // A ball served while the special runs is heavy as well
        let ball = game.ball.unwrap();
        game.apply(Consequence::BallLost { ball });
        game.tick(&FrameInput::action(Action::NewBall), dt());
        assert!((game.world.mass(ball_handle(&game)).unwrap() - 3.0 * base).abs() < 1e-4);

        for _ in 0..30 {
            game.tick(&FrameInput::default(), dt());
        }
        assert_eq!(game.ball_density_scale(), 1.0);
        assert!((game.world.mass(ball_handle(&game)).unwrap() - base).abs() < 1e-4);
    }

    #[test]
    fn test_racket_touching_block_is_feedback_only() {
        let mut game = playing_game(single_block_levels(1));
        game.drain_events();
        let block = block_ids(&game)[0];
        game.apply(Consequence::RacketHitBlock {
            block,
            position: Vec2::ZERO,
        });
        assert_eq!(game.drain_events(), vec![GameEvent::RacketHitBlock]);
        assert_eq!(game.blocks_left(), 1);
        assert!(game.registry.get(block).is_some_and(|b| b.is_alive()));
    }

    #[test]
    fn test_explosion_size_follows_quality() {
        let mut game = playing_game(single_block_levels(1));
        game.settings = Settings::from_preset(QualityPreset::High);
        let before = game.world.body_count();
        game.spawn_explosion(Vec2::new(10.0, 5.0));
        assert_eq!(game.world.body_count() - before, 120);

        game.settings = Settings::from_preset(QualityPreset::Low);
        let before = game.world.body_count();
        game.spawn_explosion(Vec2::new(10.0, 5.0));
        assert_eq!(game.world.body_count() - before, 20);
    }

    #[test]
    fn test_aberration_scales_then_restores_gravity() {
        let mut game = playing_game(LevelSet::demo());
        game.trigger_special(BlockSpecial::Aberration {
            gravity_scale: -0.5,
            duration_ms: 300,
        });
        assert!((game.world.gravity().y + 0.5 * GRAVITY).abs() < 1e-5);
        assert!(game.aberration().is_some());

        for _ in 0..30 {
            game.tick(&FrameInput::default(), dt());
        }
        assert_eq!(game.world.gravity(), Vec2::new(0.0, GRAVITY));
        assert!(game.aberration().is_none());
    }

    #[test]
    fn test_earthquake_respects_reduced_motion() {
        let mut game = playing_game(LevelSet::demo());
        game.trigger_special(BlockSpecial::Earthquake {
            intensity: 1.0,
            duration_ms: 1_000,
        });
        assert!(game.earthquake().is_some());
        game.settings.reduced_motion = true;
        assert!(game.earthquake().is_none());
    }

    #[test]
    fn test_restart_resets_level_score() {
        let mut game = playing_game(LevelSet::demo());
        game.add_to_score(300, Vec2::ZERO);
        game.tick(&FrameInput::action(Action::Restart), dt());
        assert_eq!(game.state(), State::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.registry.count_kind(BodyKind::Ball), 1);
    }

    #[test]
    fn test_draw_after_start() {
        let mut game = playing_game(LevelSet::demo());
        game.tick(&FrameInput::default(), dt());
        let mut target = RecordingTarget::default();
        game.draw(&mut target);
        // Ball, racket and every block
        let blocks = LevelSet::demo().levels[0].placements.len();
        assert_eq!(target.sprites.len(), blocks + 2);
    }

    #[test]
    fn test_autopilot_plays_without_panicking() {
        let mut game = Game::new(Settings::default(), Resources::default(), LevelSet::demo(), 9);
        for _ in 0..3_000 {
            let input = game.autopilot();
            game.tick(&input, dt());
            game.drain_events();
            assert!(game.contacts().len() <= ContactCollector::CAPACITY);
            if matches!(game.state(), State::GameOver | State::PlayerWon) {
                break;
            }
        }
    }
}
