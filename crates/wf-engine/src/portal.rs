//! Temporary portal pairs opened by actors.

use tracing::{debug, info};
use wf_core::{ActorId, Exit, ExitFlag, Location, Portal, RoomFlag, RoomKey};

use crate::engine::Engine;
use crate::error::{EngineResult, MoveError, Unresolved};
use crate::event::{Audience, NavEventKind};
use crate::gate::{self, RoomFacts};
use crate::resolver;
use crate::zone::ZoneKind;

/// Exit name both ends of a portal use.
pub const PORTAL_EXIT: &str = "portal";

/// Uses a portal opened at `level` can carry.
pub fn portal_charges(level: u32) -> u32 {
    (level.saturating_sub(28) / 2).max(1)
}

impl Engine {
    /// Open a portal pair between the owner's room and `target`.
    pub fn create_portal(&mut self, owner: ActorId, target: &Location) -> EngineResult<()> {
        let a = self.world.try_actor(owner)?.clone();
        gate::can_depart(&a, false, self.config.staff_bypass)?;
        let source = self
            .world
            .room_of(owner)
            .ok_or_else(|| MoveError::Restricted("You are nowhere.".into()))?;
        if self.portal_of(&a.name).is_some() {
            return Err(MoveError::Restricted("You already have a portal open.".into()).into());
        }
        let from = a
            .location
            .clone()
            .ok_or_else(|| MoveError::Restricted("You are nowhere.".into()))?;
        let to = resolver::resolve_location(&self.world, target, &a)?;
        if to == from {
            return Err(MoveError::Restricted("You are already there.".into()).into());
        }

        let here = self
            .world
            .room(&source)
            .map(|r| RoomFacts::of_room(&self.world, r))
            .unwrap_or_default();
        let there = match self.world.room_key_of(&to).and_then(|k| self.world.room(&k)) {
            Some(room) => RoomFacts::of_room(&self.world, room),
            None => self.facts_of_unloaded(&to)?,
        };
        for facts in [&here, &there] {
            if facts.flags.contains(&RoomFlag::Jail) || facts.flags.contains(&RoomFlag::Limbo) {
                return Err(MoveError::Restricted("Portals cannot be opened here.".into()).into());
            }
        }
        if !(self.config.staff_bypass && a.is_staff()) {
            gate::check_distance(self.zones.as_ref(), &from, &to, ZoneKind::Teleport, &there)?;
        }

        let dest = self.load_room(&to)?;
        for key in [&source, &dest] {
            let taken = self
                .world
                .room(key)
                .is_some_and(|r| r.exits.iter().any(|e| e.name == PORTAL_EXIT));
            if taken {
                return Err(MoveError::Blocked("There is already a portal there.".into()).into());
            }
        }

        let charges = portal_charges(a.level);
        self.add_portal_end(&source, &a.name, to.clone(), charges)?;
        self.add_portal_end(&dest, &a.name, from.clone(), charges)?;
        info!(owner = %a.name, from = %from, to = %to, charges, "portal opened");
        self.emit(
            NavEventKind::PortalOpened {
                owner,
                to: to.clone(),
            },
            Audience::Room {
                at: from,
                exclude: Vec::new(),
            },
            format!("{} opens a shimmering portal.", a.name),
        );
        Ok(())
    }

    fn add_portal_end(
        &mut self,
        key: &RoomKey,
        owner: &str,
        to: Location,
        charges: u32,
    ) -> EngineResult<()> {
        let authored = matches!(key, RoomKey::Authored(_));
        let room = self.world.try_room_mut(key)?;
        let mut exit = Exit::new(PORTAL_EXIT, to).with_flag(ExitFlag::Portal);
        exit.portal = Some(Portal {
            owner: owner.to_string(),
            charges,
        });
        room.exits.push(exit);
        if authored {
            room.dirty = true;
        }
        Ok(())
    }

    /// A resident room holding one end of `owner`'s portal.
    pub fn portal_of(&self, owner: &str) -> Option<RoomKey> {
        self.world
            .resident_rooms()
            .into_iter()
            .find(|(_, r)| {
                r.exits
                    .iter()
                    .any(|e| e.portal.as_ref().is_some_and(|p| p.owner == owner))
            })
            .map(|(k, _)| k)
    }

    /// Spend one charge of the portal the party crossed. Both ends share the
    /// count; the pair collapses when it runs out.
    pub(crate) fn consume_portal(&mut self, owner: &str) {
        let keys: Vec<RoomKey> = self
            .world
            .resident_rooms()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let mut remaining = None;
        for key in &keys {
            let Some(room) = self.world.room_mut(key) else {
                continue;
            };
            for exit in &mut room.exits {
                if let Some(p) = exit.portal.as_mut().filter(|p| p.owner == owner) {
                    p.charges = p.charges.saturating_sub(1);
                    remaining = Some(p.charges);
                }
            }
        }
        debug!(owner, ?remaining, "portal charge used");
        if remaining == Some(0) {
            self.collapse_portal(owner);
        }
    }

    /// Remove both ends of `owner`'s portal. Returns whether one existed.
    pub fn collapse_portal(&mut self, owner: &str) -> bool {
        let keys: Vec<RoomKey> = self
            .world
            .resident_rooms()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let mut ends = Vec::new();
        for key in keys {
            let Some(room) = self.world.room_mut(&key) else {
                continue;
            };
            let before = room.exits.len();
            room.exits
                .retain(|e| e.portal.as_ref().is_none_or(|p| p.owner != owner));
            if room.exits.len() != before {
                ends.push((key, room.location()));
            }
        }
        if ends.is_empty() {
            return false;
        }
        for (key, at) in ends {
            self.emit(
                NavEventKind::PortalCollapsed {
                    owner: owner.to_string(),
                },
                Audience::Room {
                    at,
                    exclude: Vec::new(),
                },
                "The portal shimmers and vanishes.",
            );
            self.tidy(&key);
        }
        info!(owner, "portal collapsed");
        true
    }

    /// Entry facts for a destination that is not resident yet.
    pub(crate) fn facts_of_unloaded(&self, at: &Location) -> Result<RoomFacts, MoveError> {
        match at {
            Location::Symbolic(s) => self
                .store
                .load(s)
                .map(|def| RoomFacts::of_def(&def))
                .ok_or_else(|| MoveError::Unresolvable(Unresolved::NoRoom(s.clone()))),
            Location::Grid(g) => self
                .world
                .area(&g.region)
                .map(|area| RoomFacts::of_tile(area.tile_at(g.coord)))
                .ok_or_else(|| MoveError::Unresolvable(Unresolved::NoRegion(g.region.clone()))),
        }
    }
}
