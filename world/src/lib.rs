#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mobile Defense.
//!
//! The world owns every live actor (enemies, turrets, projectiles), the
//! build-site registry, and the session economy. Adapters and systems submit
//! [`Command`] values through [`apply`]; the world mutates deterministically
//! and broadcasts [`Event`] values describing what actually happened.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use mobile_defense_core::{
    BuildRejection, Command, EnemyId, EnemyKind, Event, Health, ProjectileId, SiteId, TurretId,
    TurretKind, UpgradeRejection, WorldPoint, INITIAL_LIVES, INITIAL_SCORE, UPGRADE_COST,
    UPGRADE_FIRE_RATE_FACTOR,
};

mod economy;
mod sites;

use economy::Economy;
use sites::SiteRegistry;

/// Distance at which an enemy is considered to have reached its waypoint.
const WAYPOINT_EPSILON: f32 = 0.2;

/// Delay between a turret's final round and its self-dismantling.
const AMMO_GRACE: Duration = Duration::from_secs(1);

/// Represents the authoritative Mobile Defense world state.
#[derive(Debug)]
pub struct World {
    path: Vec<WorldPoint>,
    enemies: Vec<Enemy>,
    turrets: Vec<Turret>,
    projectiles: Vec<Projectile>,
    sites: SiteRegistry,
    economy: Economy,
    next_enemy_id: u32,
    next_turret_id: u32,
    next_projectile_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates a new world ready for simulation.
    ///
    /// The route and build sites start empty; levels install them with
    /// [`Command::ConfigurePath`] and [`Command::ConfigureSites`] before the
    /// first tick.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            enemies: Vec::new(),
            turrets: Vec::new(),
            projectiles: Vec::new(),
            sites: SiteRegistry::new(),
            economy: Economy::new(INITIAL_SCORE, INITIAL_LIVES),
            next_enemy_id: 0,
            next_turret_id: 0,
            next_projectile_id: 0,
            tick_index: 0,
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_turret_id(&mut self) -> TurretId {
        let id = TurretId::new(self.next_turret_id);
        self.next_turret_id = self.next_turret_id.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        if self.path.len() < 2 {
            tracing::warn!("spawn requested without a configured route; ignoring");
            return;
        }

        let id = self.allocate_enemy_id();
        let position = self.path[0];
        self.enemies.push(Enemy {
            id,
            kind,
            position,
            waypoint_index: 1,
            health: kind.max_health(),
        });
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
        });
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.path.len() < 2 {
            return;
        }

        let dt_secs = dt.as_secs_f32();
        let mut arrived: Vec<EnemyId> = Vec::new();

        for enemy in &mut self.enemies {
            let target = self.path[enemy.waypoint_index];
            let step = enemy.kind.speed() * dt_secs;
            enemy.position = enemy.position.step_toward(target, step);

            if enemy.position.distance_to(target) <= WAYPOINT_EPSILON {
                if enemy.waypoint_index + 1 >= self.path.len() {
                    arrived.push(enemy.id);
                } else {
                    enemy.waypoint_index += 1;
                }
            }
        }

        // Reaching the end is a single atomic event: the life deduction and
        // the enemy removal happen together, exactly once.
        for enemy in arrived {
            let lives = self.economy.lose_life();
            out_events.push(Event::EnemyReachedEnd {
                enemy,
                lives_remaining: lives,
            });
            out_events.push(Event::LivesChanged { lives });
            self.remove_enemy(enemy);
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt_secs = dt.as_secs_f32();
        let mut index = 0;

        while index < self.projectiles.len() {
            let target = self.projectiles[index].target;
            let Some(target_position) = enemy_position(&self.enemies, target) else {
                // Target died before impact: discard with no damage.
                let expired = self.projectiles.remove(index);
                out_events.push(Event::ProjectileExpired {
                    projectile: expired.id,
                });
                continue;
            };

            let (position, kind) = {
                let projectile = &self.projectiles[index];
                (projectile.position, projectile.kind)
            };
            let step = kind.projectile_speed().unwrap_or(0.0) * dt_secs;

            if position.distance_to(target_position) <= step {
                let resolved = self.projectiles.remove(index);
                self.resolve_impact(resolved, target_position, out_events);
                continue;
            }

            self.projectiles[index].position = position.step_toward(target_position, step);
            index += 1;
        }
    }

    fn resolve_impact(
        &mut self,
        projectile: Projectile,
        impact_point: WorldPoint,
        out_events: &mut Vec<Event>,
    ) {
        let struck: Vec<EnemyId> = match projectile.kind.blast_radius() {
            Some(radius) => {
                let radius_squared = radius * radius;
                self.enemies
                    .iter()
                    .filter(|enemy| {
                        enemy.position.distance_squared_to(impact_point) <= radius_squared
                    })
                    .map(|enemy| enemy.id)
                    .collect()
            }
            None => vec![projectile.target],
        };

        out_events.push(Event::ProjectileImpact {
            projectile: projectile.id,
            struck: struck.clone(),
        });

        let damage = projectile.kind.damage();
        for enemy in struck {
            self.damage_enemy(enemy, damage, out_events);
        }
    }

    fn damage_enemy(&mut self, enemy_id: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        // A stale identifier means the enemy already died; damage is a no-op.
        let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == enemy_id) else {
            return;
        };

        enemy.health = enemy.health.saturating_sub(amount);
        if enemy.health.is_zero() {
            let bounty = enemy.kind.bounty();
            let score = self.economy.add_score(bounty);
            out_events.push(Event::EnemyKilled {
                enemy: enemy_id,
                bounty,
            });
            out_events.push(Event::ScoreChanged { score });
            self.remove_enemy(enemy_id);
        } else {
            out_events.push(Event::EnemyDamaged {
                enemy: enemy_id,
                health: enemy.health,
                max_health: enemy.kind.max_health(),
            });
        }
    }

    fn remove_enemy(&mut self, enemy: EnemyId) {
        self.enemies.retain(|candidate| candidate.id != enemy);

        // Invalidate every outstanding reference within the same tick so no
        // turret keeps aiming at a destroyed enemy.
        for turret in &mut self.turrets {
            if turret.target == Some(enemy) {
                turret.target = None;
            }
        }
    }

    fn update_turrets(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt_secs = dt.as_secs_f32();
        let mut expired: Vec<TurretId> = Vec::new();

        for turret in &mut self.turrets {
            turret.ready_in = turret.ready_in.saturating_sub(dt);

            if let Some(target) = turret.target {
                match enemy_position(&self.enemies, target) {
                    Some(position) => {
                        let desired = turret.position.heading_toward(position);
                        let max_delta = turret.kind.rotation_speed() * dt_secs;
                        turret.heading = rotate_toward(turret.heading, desired, max_delta);
                    }
                    None => turret.target = None,
                }
            }

            if let Some(grace) = turret.grace {
                let remaining = grace.saturating_sub(dt);
                if remaining.is_zero() {
                    expired.push(turret.id);
                } else {
                    turret.grace = Some(remaining);
                }
            }
        }

        for turret in expired {
            self.dismantle_turret(turret, out_events);
        }
    }

    fn dismantle_turret(&mut self, turret_id: TurretId, out_events: &mut Vec<Event>) {
        let Some(index) = self
            .turrets
            .iter()
            .position(|turret| turret.id == turret_id)
        else {
            return;
        };

        let turret = self.turrets.remove(index);
        self.sites.vacate(turret.site);
        out_events.push(Event::TurretExpired { turret: turret.id });
    }

    fn set_turret_target(&mut self, turret_id: TurretId, target: Option<EnemyId>) {
        let Some(turret) = self
            .turrets
            .iter_mut()
            .find(|turret| turret.id == turret_id)
        else {
            tracing::debug!(turret = turret_id.get(), "target assigned to unknown turret");
            return;
        };

        turret.target = match target {
            Some(enemy) if enemy_position(&self.enemies, enemy).is_some() => Some(enemy),
            _ => None,
        };
    }

    fn fire(&mut self, turret_id: TurretId, target: EnemyId, out_events: &mut Vec<Event>) {
        // Re-validate immediately before discharging: a target that died
        // between acquisition and firing must not produce a shot.
        if enemy_position(&self.enemies, target).is_none() {
            return;
        }

        let Some(index) = self
            .turrets
            .iter()
            .position(|turret| turret.id == turret_id)
        else {
            tracing::debug!(turret = turret_id.get(), "fire requested for unknown turret");
            return;
        };

        {
            let turret = &mut self.turrets[index];
            if !turret.ready_in.is_zero() || turret.grace.is_some() {
                return;
            }

            turret.ready_in = turret.cooldown();
            if let Some(ammo) = turret.ammo.as_mut() {
                *ammo = ammo.saturating_sub(1);
                if *ammo == 0 {
                    turret.grace = Some(AMMO_GRACE);
                }
            }
        }

        let turret = self.turrets[index];
        if turret.kind.projectile_speed().is_some() {
            let projectile = self.allocate_projectile_id();
            self.projectiles.push(Projectile {
                id: projectile,
                kind: turret.kind,
                position: turret.position,
                target,
            });
            out_events.push(Event::ProjectileLaunched {
                projectile,
                turret: turret.id,
                target,
            });
        } else {
            self.fire_beam(turret, out_events);
        }
    }

    fn fire_beam(&mut self, turret: Turret, out_events: &mut Vec<Event>) {
        let half_width = turret.kind.beam_half_width().unwrap_or(0.0);
        let pierce_limit = turret
            .kind
            .pierce_limit()
            .map_or(usize::MAX, |limit| limit as usize);

        let direction_x = turret.heading.cos();
        let direction_y = turret.heading.sin();

        let mut candidates: Vec<(f32, EnemyId)> = Vec::new();
        for enemy in &self.enemies {
            let relative_x = enemy.position.x() - turret.position.x();
            let relative_y = enemy.position.y() - turret.position.y();

            let along = relative_x * direction_x + relative_y * direction_y;
            if along < 0.0 {
                continue;
            }

            let perpendicular = (relative_x * direction_y - relative_y * direction_x).abs();
            if perpendicular <= half_width {
                candidates.push((along, enemy.id));
            }
        }

        candidates.sort_by(|left, right| {
            left.0
                .partial_cmp(&right.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(left.1.cmp(&right.1))
        });
        candidates.truncate(pierce_limit);

        let struck: Vec<EnemyId> = candidates.into_iter().map(|(_, enemy)| enemy).collect();
        out_events.push(Event::BeamFired {
            turret: turret.id,
            struck: struck.clone(),
        });

        let damage = turret.kind.damage();
        for enemy in struck {
            self.damage_enemy(enemy, damage, out_events);
        }
    }

    fn build_turret(&mut self, site_id: SiteId, kind: TurretKind, out_events: &mut Vec<Event>) {
        let Some(site) = self.sites.get(site_id) else {
            out_events.push(Event::BuildRejected {
                site: site_id,
                kind,
                reason: BuildRejection::UnknownSite,
            });
            return;
        };

        if !site.buildable {
            out_events.push(Event::BuildRejected {
                site: site_id,
                kind,
                reason: BuildRejection::NotBuildable,
            });
            return;
        }

        if site.occupant.is_some() {
            out_events.push(Event::BuildRejected {
                site: site_id,
                kind,
                reason: BuildRejection::Occupied,
            });
            return;
        }

        let position = site.position;
        if !self.economy.try_spend(kind.cost()) {
            out_events.push(Event::BuildRejected {
                site: site_id,
                kind,
                reason: BuildRejection::InsufficientScore,
            });
            return;
        }

        let turret = self.allocate_turret_id();
        self.turrets.push(Turret::new(turret, site_id, kind, position));
        self.sites.occupy(site_id, turret);
        out_events.push(Event::TurretBuilt {
            site: site_id,
            turret,
            kind,
        });
        out_events.push(Event::ScoreChanged {
            score: self.economy.score(),
        });
    }

    fn upgrade_turret(&mut self, site_id: SiteId, out_events: &mut Vec<Event>) {
        let Some(site) = self.sites.get(site_id) else {
            out_events.push(Event::UpgradeRejected {
                site: site_id,
                reason: UpgradeRejection::UnknownSite,
            });
            return;
        };

        let Some(turret_id) = site.occupant else {
            out_events.push(Event::UpgradeRejected {
                site: site_id,
                reason: UpgradeRejection::Unoccupied,
            });
            return;
        };

        let Some(index) = self
            .turrets
            .iter()
            .position(|turret| turret.id == turret_id)
        else {
            out_events.push(Event::UpgradeRejected {
                site: site_id,
                reason: UpgradeRejection::Unoccupied,
            });
            return;
        };

        if self.turrets[index].upgraded {
            out_events.push(Event::UpgradeRejected {
                site: site_id,
                reason: UpgradeRejection::AlreadyUpgraded,
            });
            return;
        }

        if !self.economy.try_spend(UPGRADE_COST) {
            out_events.push(Event::UpgradeRejected {
                site: site_id,
                reason: UpgradeRejection::InsufficientScore,
            });
            return;
        }

        let turret = &mut self.turrets[index];
        turret.upgraded = true;
        out_events.push(Event::TurretUpgraded {
            site: site_id,
            turret: turret.id,
            fire_rate: turret.effective_fire_rate(),
        });
        out_events.push(Event::ScoreChanged {
            score: self.economy.score(),
        });
    }

    fn remove_turret(&mut self, site_id: SiteId, out_events: &mut Vec<Event>) {
        let occupant = self.sites.get(site_id).and_then(|site| site.occupant);
        let Some(turret_id) = occupant else {
            tracing::debug!(site = site_id.get(), "removal requested for empty site");
            return;
        };

        let Some(index) = self
            .turrets
            .iter()
            .position(|turret| turret.id == turret_id)
        else {
            return;
        };

        let turret = self.turrets.remove(index);
        self.sites.vacate(site_id);
        out_events.push(Event::TurretRemoved {
            site: site_id,
            turret: turret.id,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePath { waypoints } => {
            if !world.enemies.is_empty() {
                tracing::warn!("route change ignored while enemies are live");
                return;
            }
            if waypoints.len() < 2 {
                tracing::warn!(
                    waypoints = waypoints.len(),
                    "route needs at least two waypoints; spawns remain disabled"
                );
                world.path.clear();
                return;
            }
            world.path = waypoints;
        }
        Command::ConfigureSites { sites } => {
            if !world.turrets.is_empty() {
                tracing::warn!("site layout change ignored while turrets exist");
                return;
            }
            world.sites.rebuild(&sites);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_enemies(dt, out_events);
            world.advance_projectiles(dt, out_events);
            world.update_turrets(dt, out_events);
        }
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::SetTurretTarget { turret, target } => world.set_turret_target(turret, target),
        Command::FireProjectile { turret, target } => world.fire(turret, target, out_events),
        Command::BuildTurret { site, kind } => world.build_turret(site, kind, out_events),
        Command::UpgradeTurret { site } => world.upgrade_turret(site, out_events),
        Command::RemoveTurret { site } => world.remove_turret(site, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use mobile_defense_core::{
        EnemySnapshot, EnemyView, ProjectileSnapshot, ProjectileView, SiteView, TurretSnapshot,
        TurretView, WorldPoint,
    };

    /// Captures a read-only view of all live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                waypoint_index: enemy.waypoint_index,
                health: enemy.health,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of all constructed turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        let snapshots: Vec<TurretSnapshot> = world
            .turrets
            .iter()
            .map(|turret| TurretSnapshot {
                id: turret.id,
                site: turret.site,
                kind: turret.kind,
                position: turret.position,
                heading: turret.heading,
                ready_in: turret.ready_in,
                ammo: turret.ammo,
                target: turret.target,
                upgraded: turret.upgraded,
            })
            .collect();
        TurretView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of all projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                kind: projectile.kind,
                position: projectile.position,
                target: projectile.target,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of all build sites.
    #[must_use]
    pub fn site_view(world: &World) -> SiteView {
        SiteView::from_snapshots(world.sites.snapshots())
    }

    /// Score currently available to the player.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.economy.score()
    }

    /// Lives currently remaining.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.economy.lives()
    }

    /// Waypoint route enemies follow, in walk order.
    #[must_use]
    pub fn waypoints(world: &World) -> &[WorldPoint] {
        &world.path
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: WorldPoint,
    waypoint_index: usize,
    health: Health,
}

#[derive(Clone, Copy, Debug)]
struct Turret {
    id: TurretId,
    site: SiteId,
    kind: TurretKind,
    position: WorldPoint,
    heading: f32,
    ready_in: Duration,
    ammo: Option<u32>,
    grace: Option<Duration>,
    target: Option<EnemyId>,
    upgraded: bool,
}

impl Turret {
    fn new(id: TurretId, site: SiteId, kind: TurretKind, position: WorldPoint) -> Self {
        let mut turret = Self {
            id,
            site,
            kind,
            position,
            heading: 0.0,
            ready_in: Duration::ZERO,
            ammo: kind.ammo(),
            grace: None,
            target: None,
            upgraded: false,
        };
        // A fresh turret starts with a full cooldown rather than firing on
        // the construction tick.
        turret.ready_in = turret.cooldown();
        turret
    }

    fn effective_fire_rate(&self) -> f32 {
        let base = self.kind.fire_rate();
        if self.upgraded {
            base * UPGRADE_FIRE_RATE_FACTOR
        } else {
            base
        }
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.effective_fire_rate())
    }
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    kind: TurretKind,
    position: WorldPoint,
    target: EnemyId,
}

fn enemy_position(enemies: &[Enemy], id: EnemyId) -> Option<WorldPoint> {
    enemies
        .iter()
        .find(|enemy| enemy.id == id)
        .map(|enemy| enemy.position)
}

fn rotate_toward(current: f32, desired: f32, max_delta: f32) -> f32 {
    let mut difference = desired - current;
    while difference > PI {
        difference -= TAU;
    }
    while difference < -PI {
        difference += TAU;
    }
    current + difference.clamp(-max_delta, max_delta)
}
