use std::time::Duration;

use mobile_defense_core::{
    Command, EnemyId, EnemyKind, Event, WaveSpec, WorldPoint, INITIAL_LIVES,
};
use mobile_defense_system_wave_director::{Config, Phase, WaveDirector};
use mobile_defense_world::{self as world, query, World};

fn fast_config(wave_goal: u32) -> Config {
    let wave = WaveSpec::new(EnemyKind::Runner, 2, 1.0).expect("valid wave");
    Config::new(vec![wave], wave_goal)
        .with_timings(Duration::from_millis(100), Duration::from_millis(100))
}

fn advance(director: &mut WaveDirector, dt: Duration) -> Vec<Command> {
    let mut out = Vec::new();
    director.handle(&[Event::TimeAdvanced { dt }], &mut out);
    out
}

/// Runs the countdown and cadence frame by frame until the director leaves
/// the spawning phase, returning every emitted command.
fn drain_wave(director: &mut WaveDirector) -> Vec<Command> {
    let mut commands = Vec::new();
    for _ in 0..200 {
        commands.extend(advance(director, Duration::from_millis(100)));
        if director.phase() != Phase::Spawning && !commands.is_empty() {
            return commands;
        }
    }
    panic!("wave never completed; emitted {commands:?}");
}

#[test]
fn repeated_waves_escalate_count_and_cadence() {
    let mut director = WaveDirector::new(fast_config(2));

    let first_wave = drain_wave(&mut director);
    assert_eq!(first_wave.len(), 2);
    assert_eq!(director.wave_index(), 1);
    assert_eq!(director.phase(), Phase::Idle);

    // The world confirms the spawns, then both enemies die.
    let confirmations: Vec<Event> = (0..2)
        .map(|index| Event::EnemySpawned {
            enemy: EnemyId::new(index),
            kind: EnemyKind::Runner,
            position: WorldPoint::new(0.0, 0.0),
        })
        .collect();
    director.handle(&confirmations, &mut Vec::new());
    assert_eq!(director.live_enemies(), 2);

    director.handle(
        &[
            Event::EnemyKilled {
                enemy: EnemyId::new(0),
                bounty: 5,
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(1),
                bounty: 5,
            },
        ],
        &mut Vec::new(),
    );
    assert_eq!(director.live_enemies(), 0);

    // Second cycle doubles both the count (4) and the spawn rate (2/s).
    let second_wave = drain_wave(&mut director);
    assert_eq!(second_wave.len(), 4);
    assert_eq!(director.wave_index(), 2);
}

#[test]
fn countdown_holds_while_enemies_remain_alive() {
    let mut director = WaveDirector::new(fast_config(2));
    let _ = drain_wave(&mut director);

    // One of the two spawns is still alive.
    director.handle(
        &[
            Event::EnemySpawned {
                enemy: EnemyId::new(0),
                kind: EnemyKind::Runner,
                position: WorldPoint::new(0.0, 0.0),
            },
            Event::EnemySpawned {
                enemy: EnemyId::new(1),
                kind: EnemyKind::Runner,
                position: WorldPoint::new(0.0, 0.0),
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(0),
                bounty: 5,
            },
        ],
        &mut Vec::new(),
    );
    assert_eq!(director.live_enemies(), 1);

    // The survivor blocks the next countdown no matter how long we wait.
    let held = advance(&mut director, Duration::from_secs(120));
    assert!(held.is_empty());
    assert_eq!(director.wave_index(), 1);
    assert_eq!(director.phase(), Phase::Idle);
}

#[test]
fn clearing_the_goal_transitions_to_won() {
    let mut director = WaveDirector::new(fast_config(1));
    let _ = drain_wave(&mut director);
    assert_eq!(director.wave_index(), 1);

    // No enemies alive and the goal already met: the next countdown expiry
    // declares victory instead of starting another wave.
    let after = advance(&mut director, Duration::from_secs(1));
    assert!(after.is_empty());
    assert_eq!(director.phase(), Phase::Won);
}

#[test]
fn undefended_session_ends_in_defeat() {
    let mut game = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut game,
        Command::ConfigurePath {
            waypoints: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(4.0, 0.0)],
        },
        &mut events,
    );

    let mut director = WaveDirector::new(fast_config(u32::MAX));
    assert_eq!(query::lives(&game), INITIAL_LIVES);

    // Fixed-step frame loop: the director reads last frame's events and the
    // world applies its commands plus one tick per frame.
    for _ in 0..10_000 {
        let mut commands = Vec::new();
        director.handle(&events, &mut commands);
        events.clear();

        for command in commands {
            world::apply(&mut game, command, &mut events);
        }
        world::apply(
            &mut game,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        if director.phase() == Phase::Lost {
            break;
        }
    }

    assert_eq!(director.phase(), Phase::Lost);
    assert_eq!(query::lives(&game), 0);
}
