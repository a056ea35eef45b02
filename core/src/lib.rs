#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mobile Defense simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score available to the player when a session begins.
pub const INITIAL_SCORE: u32 = 10;

/// Lives available to the player when a session begins.
pub const INITIAL_LIVES: u32 = 25;

/// Score cost of the one-time fire-rate upgrade applied to an occupied site.
pub const UPGRADE_COST: u32 = 10;

/// Multiplier applied to a turret's fire rate by the one-time upgrade.
pub const UPGRADE_FIRE_RATE_FACTOR: f32 = 1.5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the waypoint route that spawned enemies will follow.
    ConfigurePath {
        /// Ordered waypoint positions from spawn to exit.
        waypoints: Vec<WorldPoint>,
    },
    /// Installs the set of build sites available for turret placement.
    ConfigureSites {
        /// Descriptors of every placement slot in the level.
        sites: Vec<SiteSpec>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the route at the spawn waypoint.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Assigns or clears the enemy a turret is currently tracking.
    SetTurretTarget {
        /// Identifier of the turret whose target changes.
        turret: TurretId,
        /// Enemy to track, or `None` to stand down.
        target: Option<EnemyId>,
    },
    /// Requests that a turret discharge at the provided enemy.
    FireProjectile {
        /// Identifier of the firing turret.
        turret: TurretId,
        /// Enemy the shot is aimed at.
        target: EnemyId,
    },
    /// Requests construction of a turret on a build site.
    BuildTurret {
        /// Site selected for construction.
        site: SiteId,
        /// Kind of turret to construct.
        kind: TurretKind,
    },
    /// Requests the one-time fire-rate upgrade for an occupied site.
    UpgradeTurret {
        /// Site whose occupant should be upgraded.
        site: SiteId,
    },
    /// Requests demolition of the turret occupying a site.
    RemoveTurret {
        /// Site to clear.
        site: SiteId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the route.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
        /// Position the enemy occupies after spawning.
        position: WorldPoint,
    },
    /// Reports that an enemy absorbed damage and survived.
    EnemyDamaged {
        /// Identifier of the wounded enemy.
        enemy: EnemyId,
        /// Health remaining after the hit.
        health: Health,
        /// Health the enemy spawned with, for fraction displays.
        max_health: Health,
    },
    /// Confirms that an enemy was destroyed and its bounty awarded.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Score awarded for the kill.
        bounty: u32,
    },
    /// Reports that an enemy walked off the end of the route.
    EnemyReachedEnd {
        /// Identifier of the leaked enemy.
        enemy: EnemyId,
        /// Lives remaining after the leak.
        lives_remaining: u32,
    },
    /// Announces the player's new score total.
    ScoreChanged {
        /// Score after the mutation.
        score: u32,
    },
    /// Announces the player's new life total.
    LivesChanged {
        /// Lives after the mutation.
        lives: u32,
    },
    /// Confirms that a turret was constructed on a site.
    TurretBuilt {
        /// Site that now hosts the turret.
        site: SiteId,
        /// Identifier allocated to the turret.
        turret: TurretId,
        /// Kind of turret constructed.
        kind: TurretKind,
    },
    /// Reports that a construction request was rejected.
    BuildRejected {
        /// Site named in the request.
        site: SiteId,
        /// Kind of turret requested.
        kind: TurretKind,
        /// Specific reason the construction failed.
        reason: BuildRejection,
    },
    /// Confirms that a site's occupant received the fire-rate upgrade.
    TurretUpgraded {
        /// Site whose occupant was upgraded.
        site: SiteId,
        /// Identifier of the upgraded turret.
        turret: TurretId,
        /// Effective fire rate after the upgrade, in shots per second.
        fire_rate: f32,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Site named in the request.
        site: SiteId,
        /// Specific reason the upgrade failed.
        reason: UpgradeRejection,
    },
    /// Confirms that a turret was demolished by the player.
    TurretRemoved {
        /// Site that was cleared.
        site: SiteId,
        /// Identifier of the demolished turret.
        turret: TurretId,
    },
    /// Reports that a turret exhausted its ammunition and dismantled itself.
    TurretExpired {
        /// Identifier of the expired turret.
        turret: TurretId,
    },
    /// Confirms that a turret launched a homing projectile.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Turret that fired.
        turret: TurretId,
        /// Enemy the projectile is homing toward.
        target: EnemyId,
    },
    /// Reports that a projectile's target vanished before impact.
    ProjectileExpired {
        /// Identifier of the discarded projectile.
        projectile: ProjectileId,
    },
    /// Confirms that a projectile detonated and struck enemies.
    ProjectileImpact {
        /// Identifier of the resolved projectile.
        projectile: ProjectileId,
        /// Enemies damaged by the impact, in identifier order.
        struck: Vec<EnemyId>,
    },
    /// Confirms that a railgun discharged its instantaneous beam.
    BeamFired {
        /// Turret that discharged.
        turret: TurretId,
        /// Enemies pierced by the beam, nearest first.
        struck: Vec<EnemyId>,
    },
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated monotonically and never reused within a session,
/// so holders may keep one across ticks and treat a failed lookup as "the
/// enemy no longer exists".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a build site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(u32);

impl SiteId {
    /// Creates a new site identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position expressed in continuous world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Range comparisons use the squared form to avoid the square root.
    #[must_use]
    pub fn distance_squared_to(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Returns the point reached by moving at most `max_step` toward `target`.
    ///
    /// Overshoot is clamped: when the remaining distance is within
    /// `max_step`, the returned point is exactly `target`.
    #[must_use]
    pub fn step_toward(self, target: WorldPoint, max_step: f32) -> Self {
        if max_step <= 0.0 {
            return self;
        }

        let distance = self.distance_to(target);
        if distance <= max_step {
            return target;
        }

        let scale = max_step / distance;
        Self {
            x: self.x + (target.x - self.x) * scale,
            y: self.y + (target.y - self.y) * scale,
        }
    }

    /// Angle in radians of the direction from this point toward `target`.
    #[must_use]
    pub fn heading_toward(self, target: WorldPoint) -> f32 {
        (target.y - self.y).atan2(target.x - self.x)
    }
}

/// Remaining health pool of an enemy.
///
/// Negative inputs are clamped so the invariant `health >= 0` holds for every
/// observable value.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Health(f32);

impl Health {
    /// Creates a health value, clamping negative inputs to zero.
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }

    /// Subtracts `amount`, clamping the result at zero.
    ///
    /// Negative amounts are treated as zero: damage never heals.
    #[must_use]
    pub fn saturating_sub(self, amount: f32) -> Self {
        Self::new(self.0 - amount.max(0.0))
    }

    /// Reports whether the pool is depleted.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 <= 0.0
    }

    /// Fraction of `max` remaining, for health-bar displays.
    #[must_use]
    pub fn fraction_of(&self, max: Health) -> f32 {
        if max.0 <= 0.0 {
            return 0.0;
        }
        (self.0 / max.0).clamp(0.0, 1.0)
    }
}

/// Kinds of enemies that can walk the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker with default speed and health.
    Standard,
    /// Fast but fragile walker.
    Runner,
    /// Slow walker with a deep health pool.
    Juggernaut,
}

impl EnemyKind {
    /// Movement speed in world units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Standard => 4.0,
            Self::Runner => 8.0,
            Self::Juggernaut => 2.0,
        }
    }

    /// Health pool assigned at spawn.
    #[must_use]
    pub fn max_health(self) -> Health {
        match self {
            Self::Standard => Health::new(100.0),
            Self::Runner => Health::new(50.0),
            Self::Juggernaut => Health::new(300.0),
        }
    }

    /// Score awarded to the player when the enemy is destroyed.
    #[must_use]
    pub const fn bounty(self) -> u32 {
        match self {
            Self::Standard | Self::Runner => 5,
            Self::Juggernaut => 20,
        }
    }
}

/// Kinds of turrets that can be constructed on build sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurretKind {
    /// Single-target turret firing homing bullets.
    Basic,
    /// Turret firing homing missiles that splash on impact.
    Missile,
    /// Hitscan turret whose beam pierces every enemy along its ray.
    Railgun,
}

impl TurretKind {
    /// Score cost of constructing the turret.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Basic => 5,
            Self::Missile => 15,
            Self::Railgun => 20,
        }
    }

    /// Targeting range in world units.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Basic | Self::Missile => 15.0,
            Self::Railgun => 20.0,
        }
    }

    /// Maximum aiming rotation in radians per second.
    #[must_use]
    pub const fn rotation_speed(self) -> f32 {
        match self {
            Self::Basic | Self::Railgun => 10.0,
            Self::Missile => 6.0,
        }
    }

    /// Shots per second before any upgrade.
    #[must_use]
    pub const fn fire_rate(self) -> f32 {
        match self {
            Self::Basic => 1.0,
            Self::Missile => 0.5,
            Self::Railgun => 0.25,
        }
    }

    /// Damage applied to each enemy struck by one shot.
    #[must_use]
    pub const fn damage(self) -> f32 {
        match self {
            Self::Basic | Self::Missile => 25.0,
            Self::Railgun => 40.0,
        }
    }

    /// Travel speed of the emitted projectile, or `None` for hitscan kinds.
    #[must_use]
    pub const fn projectile_speed(self) -> Option<f32> {
        match self {
            Self::Basic => Some(70.0),
            Self::Missile => Some(40.0),
            Self::Railgun => None,
        }
    }

    /// Splash radius applied around the impact point, where supported.
    #[must_use]
    pub const fn blast_radius(self) -> Option<f32> {
        match self {
            Self::Missile => Some(5.0),
            Self::Basic | Self::Railgun => None,
        }
    }

    /// Maximum number of enemies one beam discharge may pierce.
    #[must_use]
    pub const fn pierce_limit(self) -> Option<u32> {
        match self {
            Self::Railgun => Some(8),
            Self::Basic | Self::Missile => None,
        }
    }

    /// Half-width of the beam corridor used for ray intersection tests.
    #[must_use]
    pub const fn beam_half_width(self) -> Option<f32> {
        match self {
            Self::Railgun => Some(0.5),
            Self::Basic | Self::Missile => None,
        }
    }

    /// Rounds available before the turret dismantles itself, if limited.
    #[must_use]
    pub const fn ammo(self) -> Option<u32> {
        match self {
            Self::Basic => Some(100),
            Self::Missile | Self::Railgun => None,
        }
    }
}

/// Reasons a turret construction request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildRejection {
    /// No site with the provided identifier exists.
    UnknownSite,
    /// The site is not a valid build location.
    NotBuildable,
    /// The site already hosts a turret.
    Occupied,
    /// The turret's cost exceeds the available score.
    InsufficientScore,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeRejection {
    /// No site with the provided identifier exists.
    UnknownSite,
    /// The site hosts no turret to upgrade.
    Unoccupied,
    /// The occupant already received its one-time upgrade.
    AlreadyUpgraded,
    /// The upgrade cost exceeds the available score.
    InsufficientScore,
}

/// Errors raised while validating level-authoring data.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A wave was configured with a zero enemy count.
    #[error("wave enemy count must be positive")]
    ZeroEnemyCount,
    /// A wave was configured with a non-positive spawn rate.
    #[error("wave spawn rate must be positive, got {rate}")]
    InvalidSpawnRate {
        /// The offending rate in spawns per second.
        rate: f32,
    },
}

/// Configured composition of a single wave.
///
/// Waves are level-authoring data: read-only at runtime and validated when
/// constructed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    enemy: EnemyKind,
    count: u32,
    spawn_rate: f32,
}

impl WaveSpec {
    /// Creates a validated wave descriptor.
    pub fn new(enemy: EnemyKind, count: u32, spawn_rate: f32) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroEnemyCount);
        }
        if !(spawn_rate > 0.0) {
            return Err(ConfigError::InvalidSpawnRate { rate: spawn_rate });
        }
        Ok(Self {
            enemy,
            count,
            spawn_rate,
        })
    }

    /// Kind of enemy the wave emits.
    #[must_use]
    pub const fn enemy(&self) -> EnemyKind {
        self.enemy
    }

    /// Number of enemies emitted before any cycle scaling.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Spawns per second before any cycle scaling.
    #[must_use]
    pub const fn spawn_rate(&self) -> f32 {
        self.spawn_rate
    }
}

/// Configured descriptor of a single build site.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteSpec {
    position: WorldPoint,
    buildable: bool,
}

impl SiteSpec {
    /// Creates a new site descriptor.
    #[must_use]
    pub const fn new(position: WorldPoint, buildable: bool) -> Self {
        Self {
            position,
            buildable,
        }
    }

    /// World position of the placement slot.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Whether turrets may be constructed on the slot.
    #[must_use]
    pub const fn buildable(&self) -> bool {
        self.buildable
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// World position currently occupied by the enemy.
    pub position: WorldPoint,
    /// Index of the waypoint the enemy is walking toward.
    pub waypoint_index: usize,
    /// Health remaining in the enemy's pool.
    pub health: Health,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a specific enemy, if it is still alive.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single turret's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret by the world.
    pub id: TurretId,
    /// Site the turret occupies.
    pub site: SiteId,
    /// Kind of turret constructed.
    pub kind: TurretKind,
    /// World position of the turret.
    pub position: WorldPoint,
    /// Current aim direction in radians.
    pub heading: f32,
    /// Time remaining until the turret may fire again.
    pub ready_in: Duration,
    /// Rounds remaining, for ammo-limited kinds.
    pub ammo: Option<u32>,
    /// Enemy the turret is currently tracking, if any.
    pub target: Option<EnemyId>,
    /// Whether the one-time fire-rate upgrade was purchased.
    pub upgraded: bool,
}

/// Read-only snapshot describing all constructed turrets.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether the view contains no turrets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Kind of turret that launched the projectile.
    pub kind: TurretKind,
    /// World position of the projectile.
    pub position: WorldPoint,
    /// Enemy the projectile is homing toward.
    pub target: EnemyId,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether the view contains no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a build site used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteSnapshot {
    /// Identifier of the site.
    pub id: SiteId,
    /// World position of the placement slot.
    pub position: WorldPoint,
    /// Whether turrets may be constructed on the slot.
    pub buildable: bool,
    /// Turret currently occupying the slot, if any.
    pub occupant: Option<TurretId>,
}

/// Read-only snapshot describing all build sites.
#[derive(Clone, Debug, Default)]
pub struct SiteView {
    snapshots: Vec<SiteSnapshot>,
}

impl SiteView {
    /// Creates a new site view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SiteSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &SiteSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SiteSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn step_toward_clamps_overshoot() {
        let origin = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(3.0, 4.0);
        assert_eq!(origin.step_toward(target, 10.0), target);
    }

    #[test]
    fn step_toward_moves_exactly_max_step() {
        let origin = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(10.0, 0.0);
        let stepped = origin.step_toward(target, 4.0);
        assert!((stepped.x() - 4.0).abs() < 1e-6);
        assert_eq!(stepped.y(), 0.0);
    }

    #[test]
    fn step_toward_ignores_non_positive_steps() {
        let origin = WorldPoint::new(1.0, 2.0);
        let target = WorldPoint::new(5.0, 5.0);
        assert_eq!(origin.step_toward(target, 0.0), origin);
        assert_eq!(origin.step_toward(target, -1.0), origin);
    }

    #[test]
    fn health_never_observably_negative() {
        let health = Health::new(10.0).saturating_sub(25.0);
        assert!(health.is_zero());
        assert_eq!(health.get(), 0.0);
        assert_eq!(Health::new(-5.0).get(), 0.0);
    }

    #[test]
    fn health_ignores_negative_damage() {
        let health = Health::new(10.0).saturating_sub(-25.0);
        assert_eq!(health.get(), 10.0);
    }

    #[test]
    fn health_fraction_is_bounded() {
        let max = Health::new(100.0);
        assert_eq!(Health::new(50.0).fraction_of(max), 0.5);
        assert_eq!(Health::new(0.0).fraction_of(max), 0.0);
        assert_eq!(Health::new(100.0).fraction_of(Health::new(0.0)), 0.0);
    }

    #[test]
    fn basic_turret_stats_match_authoring_table() {
        assert_eq!(TurretKind::Basic.cost(), 5);
        assert!((TurretKind::Basic.range() - 15.0).abs() < f32::EPSILON);
        assert!((TurretKind::Basic.fire_rate() - 1.0).abs() < f32::EPSILON);
        assert_eq!(TurretKind::Basic.ammo(), Some(100));
        assert_eq!(TurretKind::Basic.projectile_speed(), Some(70.0));
    }

    #[test]
    fn railgun_is_hitscan_with_pierce() {
        assert_eq!(TurretKind::Railgun.projectile_speed(), None);
        assert_eq!(TurretKind::Railgun.pierce_limit(), Some(8));
        assert!((TurretKind::Railgun.damage() - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missile_carries_blast_radius() {
        assert_eq!(TurretKind::Missile.blast_radius(), Some(5.0));
        assert_eq!(TurretKind::Basic.blast_radius(), None);
    }

    #[test]
    fn wave_spec_rejects_zero_count() {
        assert_eq!(
            WaveSpec::new(EnemyKind::Standard, 0, 1.0),
            Err(ConfigError::ZeroEnemyCount)
        );
    }

    #[test]
    fn wave_spec_rejects_non_positive_rate() {
        assert!(matches!(
            WaveSpec::new(EnemyKind::Standard, 5, 0.0),
            Err(ConfigError::InvalidSpawnRate { .. })
        ));
        assert!(matches!(
            WaveSpec::new(EnemyKind::Standard, 5, f32::NAN),
            Err(ConfigError::InvalidSpawnRate { .. })
        ));
    }

    #[test]
    fn enemy_views_sort_and_resolve_by_id() {
        let view = EnemyView::from_snapshots(vec![
            snapshot(7, 1.0),
            snapshot(2, 2.0),
            snapshot(5, 3.0),
        ]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 7]);
        assert!(view.get(EnemyId::new(5)).is_some());
        assert!(view.get(EnemyId::new(4)).is_none());
    }

    fn snapshot(id: u32, x: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Standard,
            position: WorldPoint::new(x, 0.0),
            waypoint_index: 1,
            health: EnemyKind::Standard.max_health(),
        }
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn wave_spec_round_trips_through_bincode() {
        let spec = WaveSpec::new(EnemyKind::Runner, 8, 2.0).expect("valid spec");
        assert_round_trip(&spec);
    }

    #[test]
    fn turret_kind_round_trips_through_bincode() {
        assert_round_trip(&TurretKind::Railgun);
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&BuildRejection::Occupied);
        assert_round_trip(&UpgradeRejection::AlreadyUpgraded);
    }

    #[test]
    fn site_spec_round_trips_through_bincode() {
        let spec = SiteSpec::new(WorldPoint::new(3.0, -2.5), true);
        assert_round_trip(&spec);
    }
}
