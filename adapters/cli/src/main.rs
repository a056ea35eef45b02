#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Mobile Defense session.
//!
//! The adapter owns the frame loop: it feeds last frame's events to the pure
//! systems, applies the commands they emit, advances the world by one fixed
//! step, and prints a one-line HUD once per simulated second. Construction is
//! driven by a simple policy that builds a basic turret on the first vacant
//! site whenever the score allows it.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mobile_defense_core::{Command, EnemyKind, Event, SiteSpec, WaveSpec, WorldPoint};
use mobile_defense_system_builder::{BuildInput, Builder};
use mobile_defense_system_combat::Combat;
use mobile_defense_system_targeting::Targeting;
use mobile_defense_system_wave_director::{Config, Phase, WaveDirector};
use mobile_defense_world::{self as world, query, World};

/// Headless Mobile Defense session runner.
#[derive(Parser, Debug)]
#[command(name = "mobile-defense")]
#[command(about = "Runs a headless Mobile Defense session")]
struct Args {
    /// Number of waves that must be cleared to win.
    #[arg(long, default_value_t = 5)]
    wave_goal: u32,

    /// Fixed simulation step in milliseconds.
    #[arg(long, default_value_t = 100)]
    frame_millis: u64,

    /// Safety cap on the number of frames before the run aborts.
    #[arg(long, default_value_t = 60_000)]
    max_frames: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.frame_millis == 0 {
        bail!("frame-millis must be greater than zero");
    }
    tracing::info!(
        wave_goal = args.wave_goal,
        frame_millis = args.frame_millis,
        "session starting"
    );

    let mut game = World::new();
    let mut events = Vec::new();
    install_demo_level(&mut game, &mut events);

    let waves = demo_waves().context("demo wave list is invalid")?;
    let mut director = WaveDirector::new(Config::new(waves, args.wave_goal));
    let mut targeting = Targeting::new();
    let mut combat = Combat::new();
    let mut builder = Builder::new();

    let dt = Duration::from_millis(args.frame_millis);
    let frames_per_second = (1_000 / args.frame_millis).max(1);

    for frame in 0..args.max_frames {
        let mut commands = Vec::new();
        director.handle(&events, &mut commands);
        builder.handle(construction_policy(&game, &builder), &mut commands);

        let turrets = query::turret_view(&game);
        let enemies = query::enemy_view(&game);
        targeting.handle(&events, &turrets, &enemies, &mut commands);
        combat.handle(&turrets, &enemies, &mut commands);

        events.clear();
        for command in commands {
            world::apply(&mut game, command, &mut events);
        }
        world::apply(&mut game, Command::Tick { dt }, &mut events);

        if frame % frames_per_second == 0 {
            print_hud(&game, &director, frame / frames_per_second);
        }

        match director.phase() {
            Phase::Won => {
                println!(
                    "victory: cleared {} waves with {} lives left",
                    director.wave_index(),
                    query::lives(&game)
                );
                return Ok(());
            }
            Phase::Lost => {
                println!("defeat: overrun during wave {}", director.wave_index());
                return Ok(());
            }
            Phase::Idle | Phase::Spawning => {}
        }
    }

    bail!("session did not finish within {} frames", args.max_frames)
}

/// Installs the demo route and its flanking build sites.
fn install_demo_level(game: &mut World, events: &mut Vec<Event>) {
    let waypoints = vec![
        WorldPoint::new(0.0, 0.0),
        WorldPoint::new(30.0, 0.0),
        WorldPoint::new(30.0, 20.0),
        WorldPoint::new(60.0, 20.0),
    ];
    let sites = vec![
        SiteSpec::new(WorldPoint::new(10.0, 4.0), true),
        SiteSpec::new(WorldPoint::new(22.0, -4.0), true),
        SiteSpec::new(WorldPoint::new(34.0, 10.0), true),
        SiteSpec::new(WorldPoint::new(45.0, 16.0), true),
    ];

    world::apply(game, Command::ConfigurePath { waypoints }, events);
    world::apply(game, Command::ConfigureSites { sites }, events);
}

fn demo_waves() -> Result<Vec<WaveSpec>> {
    Ok(vec![
        WaveSpec::new(EnemyKind::Standard, 8, 1.0)?,
        WaveSpec::new(EnemyKind::Runner, 6, 1.5)?,
        WaveSpec::new(EnemyKind::Juggernaut, 3, 0.5)?,
    ])
}

/// Builds on the first vacant buildable site whenever the score allows it.
fn construction_policy(game: &World, builder: &Builder) -> BuildInput {
    if query::score(game) < builder.selected().cost() {
        return BuildInput::default();
    }

    let site = query::site_view(game)
        .into_vec()
        .into_iter()
        .find(|site| site.buildable && site.occupant.is_none())
        .map(|site| site.id);

    BuildInput::new(site, None, None)
}

fn print_hud(game: &World, director: &WaveDirector, second: u64) {
    println!(
        "t={second:>4}s wave={:<3} phase={:?} lives={:<2} score={:<4} enemies={}",
        director.wave_index(),
        director.phase(),
        query::lives(game),
        query::score(game),
        director.live_enemies(),
    );
}
