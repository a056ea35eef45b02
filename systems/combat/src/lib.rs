#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands for ready turrets.
//!
//! The world remains the sole authority on whether a shot actually happens;
//! this system only proposes shots for turrets whose cooldown has elapsed and
//! whose assigned target is still alive in the current view.

use mobile_defense_core::{Command, EnemyView, TurretView};

/// Turret combat system that queues firing commands for ready turrets.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for turrets ready to fire.
    pub fn handle(&mut self, turrets: &TurretView, enemies: &EnemyView, out: &mut Vec<Command>) {
        if turrets.is_empty() || enemies.is_empty() {
            return;
        }

        self.scratch.clear();

        for turret in turrets.iter() {
            if !turret.ready_in.is_zero() {
                continue;
            }
            // An empty magazine means the turret is already dismantling.
            if turret.ammo == Some(0) {
                continue;
            }

            let Some(target) = turret.target else {
                continue;
            };
            if enemies.get(target).is_none() {
                continue;
            }

            self.scratch.push(Command::FireProjectile {
                turret: turret.id,
                target,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
