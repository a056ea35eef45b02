#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that translates shop selection and player input into
//! construction commands.
//!
//! The builder performs no validation of its own: the world owns the
//! occupancy, buildability, and affordability rules and answers invalid
//! requests with rejection events the UI can surface.

use mobile_defense_core::{Command, SiteId, TurretKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildInput {
    /// Site the player asked to build the selected turret on this frame.
    pub build_site: Option<SiteId>,
    /// Site whose occupant the player asked to upgrade this frame.
    pub upgrade_site: Option<SiteId>,
    /// Site whose occupant the player asked to demolish this frame.
    pub remove_site: Option<SiteId>,
}

impl BuildInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        build_site: Option<SiteId>,
        upgrade_site: Option<SiteId>,
        remove_site: Option<SiteId>,
    ) -> Self {
        Self {
            build_site,
            upgrade_site,
            remove_site,
        }
    }
}

/// Shop and placement system that holds the player's selected turret kind.
#[derive(Clone, Copy, Debug)]
pub struct Builder {
    selected: TurretKind,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            selected: TurretKind::Basic,
        }
    }
}

impl Builder {
    /// Creates a builder with the basic turret pre-selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turret kind the next build request will construct.
    #[must_use]
    pub fn selected(&self) -> TurretKind {
        self.selected
    }

    /// Changes the turret kind used by subsequent build requests.
    pub fn select_turret(&mut self, kind: TurretKind) {
        self.selected = kind;
    }

    /// Consumes one frame of input and emits construction commands.
    pub fn handle(&mut self, input: BuildInput, out: &mut Vec<Command>) {
        if let Some(site) = input.build_site {
            out.push(Command::BuildTurret {
                site,
                kind: self.selected,
            });
        }

        if let Some(site) = input.upgrade_site {
            out.push(Command::UpgradeTurret { site });
        }

        if let Some(site) = input.remove_site {
            out.push(Command::RemoveTurret { site });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_basic_turret() {
        let mut builder = Builder::new();
        assert_eq!(builder.selected(), TurretKind::Basic);

        let mut out = Vec::new();
        builder.handle(
            BuildInput::new(Some(SiteId::new(2)), None, None),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::BuildTurret {
                site: SiteId::new(2),
                kind: TurretKind::Basic,
            }]
        );
    }

    #[test]
    fn selection_changes_the_requested_kind() {
        let mut builder = Builder::new();
        builder.select_turret(TurretKind::Railgun);

        let mut out = Vec::new();
        builder.handle(
            BuildInput::new(Some(SiteId::new(0)), None, None),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::BuildTurret {
                site: SiteId::new(0),
                kind: TurretKind::Railgun,
            }]
        );
    }

    #[test]
    fn idle_frames_emit_nothing() {
        let mut builder = Builder::new();
        let mut out = Vec::new();
        builder.handle(BuildInput::default(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn one_frame_can_carry_all_three_requests() {
        let mut builder = Builder::new();
        let mut out = Vec::new();
        builder.handle(
            BuildInput::new(
                Some(SiteId::new(0)),
                Some(SiteId::new(1)),
                Some(SiteId::new(2)),
            ),
            &mut out,
        );
        assert_eq!(out.len(), 3);
    }
}
