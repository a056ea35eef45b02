#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduling system driving the session's enemy pressure.
//!
//! The director consumes world events, counts the enemies still alive, and
//! emits spawn commands on a fixed cadence. It never touches world state
//! directly; everything it knows arrives through the event stream.

use std::time::Duration;

use mobile_defense_core::{Command, EnemyKind, Event, WaveSpec};

/// Countdown before the first wave of a session begins.
pub const DEFAULT_INITIAL_COUNTDOWN: Duration = Duration::from_secs(4);

/// Breather between the last enemy of a wave dying and the next countdown.
pub const DEFAULT_TIME_BETWEEN_WAVES: Duration = Duration::from_secs(15);

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug)]
pub struct Config {
    waves: Vec<WaveSpec>,
    wave_goal: u32,
    initial_countdown: Duration,
    time_between_waves: Duration,
}

impl Config {
    /// Creates a configuration with the default countdown timings.
    ///
    /// `wave_goal` is the number of waves the player must clear to win; when
    /// it exceeds the wave list's length the list is cycled with escalating
    /// counts and spawn rates.
    #[must_use]
    pub fn new(waves: Vec<WaveSpec>, wave_goal: u32) -> Self {
        Self {
            waves,
            wave_goal,
            initial_countdown: DEFAULT_INITIAL_COUNTDOWN,
            time_between_waves: DEFAULT_TIME_BETWEEN_WAVES,
        }
    }

    /// Overrides both countdown durations, mainly for tests and demos.
    #[must_use]
    pub fn with_timings(mut self, initial_countdown: Duration, time_between_waves: Duration) -> Self {
        self.initial_countdown = initial_countdown;
        self.time_between_waves = time_between_waves;
        self
    }
}

/// Externally observable lifecycle state of the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Counting down toward the next wave; holds while enemies remain alive.
    Idle,
    /// Emitting the current wave's spawn commands on cadence.
    Spawning,
    /// The wave goal was cleared with lives remaining.
    Won,
    /// Lives reached zero; no further waves will be scheduled.
    Lost,
}

/// Pure system that schedules enemy waves from the world's event stream.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    phase: Phase,
    wave_index: u32,
    live_enemies: u32,
    countdown: Duration,
    spawn_interval: Duration,
    accumulator: Duration,
    remaining: u32,
    pending_kind: EnemyKind,
    warned_empty: bool,
}

impl WaveDirector {
    /// Creates a director that will begin its first countdown immediately.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let countdown = config.initial_countdown;
        Self {
            config,
            phase: Phase::Idle,
            wave_index: 0,
            live_enemies: 0,
            countdown,
            spawn_interval: Duration::ZERO,
            accumulator: Duration::ZERO,
            remaining: 0,
            pending_kind: EnemyKind::Standard,
            warned_empty: false,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of waves started so far.
    #[must_use]
    pub fn wave_index(&self) -> u32 {
        self.wave_index
    }

    /// Number of enemies the director believes are still alive.
    #[must_use]
    pub fn live_enemies(&self) -> u32 {
        self.live_enemies
    }

    /// Consumes the latest event batch and emits spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = elapsed.saturating_add(*dt);
                }
                Event::EnemySpawned { .. } => {
                    self.live_enemies = self.live_enemies.saturating_add(1);
                }
                Event::EnemyKilled { .. } | Event::EnemyReachedEnd { .. } => {
                    self.live_enemies = self.live_enemies.saturating_sub(1);
                }
                Event::LivesChanged { lives: 0 } => {
                    self.phase = Phase::Lost;
                }
                _ => {}
            }
        }

        match self.phase {
            Phase::Won | Phase::Lost => {}
            Phase::Idle => self.advance_countdown(elapsed, out),
            Phase::Spawning => self.emit_spawns(elapsed, out),
        }
    }

    fn advance_countdown(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        // The breather does not start ticking until the field is clear.
        if self.live_enemies > 0 {
            return;
        }

        self.countdown = self.countdown.saturating_sub(elapsed);
        if !self.countdown.is_zero() {
            return;
        }

        if self.wave_index >= self.config.wave_goal {
            self.phase = Phase::Won;
            return;
        }

        self.start_wave(out);
    }

    fn start_wave(&mut self, out: &mut Vec<Command>) {
        if self.config.waves.is_empty() {
            if !self.warned_empty {
                tracing::warn!("wave list is empty; director will idle forever");
                self.warned_empty = true;
            }
            return;
        }

        let base = &self.config.waves[self.wave_index as usize % self.config.waves.len()];
        let cycle = self.wave_index / self.config.waves.len() as u32;
        let multiplier = cycle + 1;

        self.pending_kind = base.enemy();
        self.remaining = base.count().saturating_mul(multiplier);
        let rate = base.spawn_rate() * multiplier as f32;
        self.spawn_interval = Duration::from_secs_f32(1.0 / rate);
        // Priming the accumulator makes the first spawn land immediately.
        self.accumulator = self.spawn_interval;
        self.wave_index += 1;
        self.phase = Phase::Spawning;

        tracing::debug!(
            wave = self.wave_index,
            count = self.remaining,
            "wave started"
        );

        self.emit_spawns(Duration::ZERO, out);
    }

    fn emit_spawns(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        self.accumulator = self.accumulator.saturating_add(elapsed);

        while self.remaining > 0 && self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            self.remaining -= 1;
            out.push(Command::SpawnEnemy {
                kind: self.pending_kind,
            });
        }

        if self.remaining == 0 {
            self.phase = Phase::Idle;
            self.countdown = self.config.time_between_waves;
            self.accumulator = Duration::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_wave_config() -> Config {
        let wave = WaveSpec::new(EnemyKind::Standard, 3, 2.0).expect("valid wave");
        Config::new(vec![wave], 1)
            .with_timings(Duration::from_secs(1), Duration::from_secs(2))
    }

    fn advance(director: &mut WaveDirector, dt: Duration) -> Vec<Command> {
        let mut out = Vec::new();
        director.handle(&[Event::TimeAdvanced { dt }], &mut out);
        out
    }

    #[test]
    fn countdown_must_elapse_before_the_first_spawn() {
        let mut director = WaveDirector::new(single_wave_config());

        let early = advance(&mut director, Duration::from_millis(500));
        assert!(early.is_empty());
        assert_eq!(director.phase(), Phase::Idle);

        let first = advance(&mut director, Duration::from_millis(500));
        assert_eq!(first.len(), 1, "first spawn should land immediately");
        assert_eq!(director.phase(), Phase::Spawning);
    }

    #[test]
    fn spawns_follow_the_configured_cadence() {
        let mut director = WaveDirector::new(single_wave_config());
        let _ = advance(&mut director, Duration::from_secs(1));

        // 2 spawns per second; one full second drains the rest of the wave.
        let rest = advance(&mut director, Duration::from_secs(1));
        assert_eq!(rest.len(), 2);
        assert_eq!(director.phase(), Phase::Idle);
    }

    #[test]
    fn empty_wave_list_idles_without_commands() {
        let mut director = WaveDirector::new(
            Config::new(Vec::new(), 3).with_timings(Duration::ZERO, Duration::ZERO),
        );
        let out = advance(&mut director, Duration::from_secs(10));
        assert!(out.is_empty());
        assert_eq!(director.phase(), Phase::Idle);
    }

    #[test]
    fn zero_lives_transitions_to_lost() {
        let mut director = WaveDirector::new(single_wave_config());
        let mut out = Vec::new();
        director.handle(&[Event::LivesChanged { lives: 0 }], &mut out);
        assert_eq!(director.phase(), Phase::Lost);

        // Once lost, time no longer schedules anything.
        let after = advance(&mut director, Duration::from_secs(60));
        assert!(after.is_empty());
    }
}
