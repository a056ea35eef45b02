#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic turret targets from world views.
//!
//! Targets are re-evaluated on a fixed polling cadence rather than every
//! frame; between polls turrets keep tracking whatever the world already
//! assigned them.

use std::time::Duration;

use mobile_defense_core::{Command, EnemyId, EnemyView, Event, TurretSnapshot, TurretView};

/// Default interval between target re-evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Turret targeting system that assigns each turret its nearest enemy.
#[derive(Debug)]
pub struct Targeting {
    poll_interval: Duration,
    accumulator: Duration,
}

impl Targeting {
    /// Creates a targeting system with the default polling cadence.
    #[must_use]
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Creates a targeting system with a custom polling cadence.
    ///
    /// A zero interval re-evaluates on every call.
    #[must_use]
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and world views to emit target assignments.
    ///
    /// Only changes are emitted: a turret already tracking its nearest
    /// in-range enemy produces no command.
    pub fn handle(
        &mut self,
        events: &[Event],
        turrets: &TurretView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        if self.accumulator < self.poll_interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        for turret in turrets.iter() {
            let best = nearest_in_range(turret, enemies);
            match (best, turret.target) {
                (Some(enemy), current) if current != Some(enemy) => {
                    out.push(Command::SetTurretTarget {
                        turret: turret.id,
                        target: Some(enemy),
                    });
                }
                (None, Some(_)) => {
                    out.push(Command::SetTurretTarget {
                        turret: turret.id,
                        target: None,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Default for Targeting {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the nearest enemy within the turret's range, breaking distance ties
/// toward the lowest identifier for determinism.
fn nearest_in_range(turret: &TurretSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    let max_distance = turret.kind.range() * turret.kind.range();
    let mut best: Option<(f32, EnemyId)> = None;

    for enemy in enemies.iter() {
        let distance_sq = turret.position.distance_squared_to(enemy.position);
        if distance_sq > max_distance {
            continue;
        }

        // Strict comparison keeps the first-seen minimum; the view iterates
        // in identifier order.
        match best {
            Some((best_distance, _)) if distance_sq >= best_distance => {}
            _ => best = Some((distance_sq, enemy.id)),
        }
    }

    best.map(|(_, enemy)| enemy)
}
