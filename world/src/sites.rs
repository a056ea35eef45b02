//! Authoritative build-site state management utilities.

use std::collections::BTreeMap;

use mobile_defense_core::{SiteId, SiteSnapshot, SiteSpec, TurretId, WorldPoint};

/// State of a single placement slot stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SiteState {
    /// Identifier allocated by the world for the site.
    pub(crate) id: SiteId,
    /// World position of the placement slot.
    pub(crate) position: WorldPoint,
    /// Whether turrets may be constructed on the slot.
    pub(crate) buildable: bool,
    /// Turret currently occupying the slot, if any.
    pub(crate) occupant: Option<TurretId>,
}

/// Registry that stores build sites and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct SiteRegistry {
    entries: BTreeMap<SiteId, SiteState>,
}

impl SiteRegistry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Replaces all sites with freshly allocated identifiers in spec order.
    pub(crate) fn rebuild(&mut self, specs: &[SiteSpec]) {
        self.entries.clear();
        for (index, spec) in specs.iter().enumerate() {
            let id = SiteId::new(index as u32);
            let _ = self.entries.insert(
                id,
                SiteState {
                    id,
                    position: spec.position(),
                    buildable: spec.buildable(),
                    occupant: None,
                },
            );
        }
    }

    /// Looks up a site by identifier.
    pub(crate) fn get(&self, site: SiteId) -> Option<&SiteState> {
        self.entries.get(&site)
    }

    /// Marks a site as hosting the provided turret.
    pub(crate) fn occupy(&mut self, site: SiteId, turret: TurretId) {
        if let Some(state) = self.entries.get_mut(&site) {
            state.occupant = Some(turret);
        }
    }

    /// Clears a site's occupant.
    pub(crate) fn vacate(&mut self, site: SiteId) {
        if let Some(state) = self.entries.get_mut(&site) {
            state.occupant = None;
        }
    }

    /// Captures snapshots of every site in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<SiteSnapshot> {
        self.entries
            .values()
            .map(|state| SiteSnapshot {
                id: state.id,
                position: state.position,
                buildable: state.buildable,
                occupant: state.occupant,
            })
            .collect()
    }
}
