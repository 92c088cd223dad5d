//! Impact headless driver
//!
//! Runs the game core on the autopilot with a fixed-timestep accumulator and
//! a counting render sink, then prints a summary.
//!
//! Usage: `impact [levels.json] [max_seconds]`
//! Settings and high scores live in `$IMPACT_DATA_DIR` (default `./impact-data`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use impact::consts::{MAX_SUBSTEPS, SIM_DT};
use impact::render::{RecordingTarget, Resources, ShaderId, ShaderPool, TextureId, Textures};
use impact::sim::{Game, GameEvent, LevelSet, State};
use impact::{HighScores, Settings};

/// Host frame rate; deliberately off the simulation rate to exercise the accumulator
const HOST_FPS: f32 = 50.0;

const DEFAULT_SEED: u64 = 2015;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let levels = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading level file {}", path))?;
            LevelSet::from_json(&json).with_context(|| format!("loading levels from {}", path))?
        }
        None => LevelSet::demo(),
    };
    let max_seconds: f32 = match args.next() {
        Some(s) => s.parse().context("max_seconds must be a number")?,
        None => 120.0,
    };

    let data_dir = std::env::var_os("IMPACT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("impact-data"));
    let settings_path = data_dir.join("settings.json");
    let scores_path = data_dir.join("highscores.json");

    let settings = Settings::load(&settings_path);
    let highscores = HighScores::load(&scores_path);

    let resources = Resources {
        textures: Textures {
            ball: TextureId(1),
            racket: TextureId(2),
            block: TextureId(3),
            particle: TextureId(4),
            soft_particle: TextureId(5),
        },
        explosion_shaders: ShaderPool::new((0..4).map(ShaderId).collect()),
        particle_system_shader: Some(ShaderId(10)),
    };

    let seed = std::env::var("IMPACT_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let mut game = Game::new(settings, resources, levels, seed).with_highscores(highscores);

    let frame_time = 1.0 / HOST_FPS;
    let sim_dt = Duration::from_secs_f32(SIM_DT);
    let max_frames = (max_seconds * HOST_FPS) as u64;

    let mut accumulator = 0.0f32;
    let mut target = RecordingTarget::default();
    let mut sprites_drawn = 0usize;
    let mut peak_contacts = 0usize;
    let mut blocks_hit = 0usize;

    for _ in 0..max_frames {
        accumulator += frame_time;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = game.autopilot();
            game.tick(&input, sim_dt);
            accumulator -= SIM_DT;
            substeps += 1;

            peak_contacts = peak_contacts.max(game.contacts().len());
            for event in game.drain_events() {
                match event {
                    GameEvent::BlockHit => blocks_hit += 1,
                    GameEvent::KillingSpree { bonus } => log::info!("Killing spree (+{})", bonus),
                    GameEvent::TimeBonus { points } => log::info!("Time bonus (+{})", points),
                    GameEvent::NewHighScore { rank } => log::info!("High score rank #{}", rank),
                    _ => {}
                }
            }
        }
        if substeps == MAX_SUBSTEPS {
            accumulator = 0.0;
        }

        target.sprites.clear();
        game.draw(&mut target);
        sprites_drawn += target.sprites.len();

        if matches!(game.state(), State::GameOver | State::PlayerWon) || game.quit_requested() {
            break;
        }
    }

    log::info!(
        "Finished in {:?} after {:.1}s of play: score {}, level {}, {} blocks hit",
        game.state(),
        game.sim_time().as_secs_f32(),
        game.score(),
        game.level_index() + 1,
        blocks_hit
    );
    log::info!(
        "{} sprites drawn, peak {} contacts/step, {} contacts dropped",
        sprites_drawn,
        peak_contacts,
        game.contacts().dropped_total()
    );

    game.highscores()
        .save(&scores_path)
        .with_context(|| format!("saving {}", scores_path.display()))?;
    game.settings()
        .save(&settings_path)
        .with_context(|| format!("saving {}", settings_path.display()))?;

    Ok(())
}
