use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::actor::Size;
use crate::addressing::Location;

/// Traits an exit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitFlag {
    /// Shut; must be opened before anyone passes.
    Closed,
    /// Can be closed.
    Closable,
    /// Locked; needs a key to open.
    Locked,
    /// Can be locked.
    Lockable,
    /// Hidden from casual view.
    Secret,
    /// Hidden until searched for.
    Concealed,
    /// Decorative; leaves no tracks.
    DescriptionOnly,
    /// One end of a temporary portal.
    Portal,
    /// Guard monsters in the room bar this exit.
    PassiveGuard,
    /// A tollkeeper must be paid before passing.
    TollToPass,
    /// Climbing without gear risks a fall.
    NeedsClimbingGear,
    /// Climbing down without gear risks a fall.
    ClimbingGearToRappel,
    /// Falls here are twice as likely.
    DifficultClimb,
    /// Only flyers may pass.
    NeedsFly,
    /// Only staff may pass.
    StaffOnly,
    /// Can be looked through but never walked through.
    LookOnly,
    /// Monsters may not pass.
    NoMonsters,
    /// Mist-form actors may not pass.
    NoMist,
}

/// Where an exit leads. Traveler-relative kinds are resolved per actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitTarget {
    /// A fixed location.
    Location(Location),
    /// The traveler's previous location.
    Previous,
    /// The traveler's bound (home) location.
    Bound,
    /// The traveler's single storage room.
    Storage,
}

impl From<Location> for ExitTarget {
    fn from(loc: Location) -> Self {
        Self::Location(loc)
    }
}

/// What a magical wall is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    /// Burns everyone who crosses.
    Fire,
    /// Scratches everyone who crosses on foot.
    Thorns,
}

/// A magical barrier covering an exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    /// What the wall is made of.
    pub kind: WallKind,
    /// Upper bound of the damage dealt to whoever crosses.
    pub strength: u32,
}

/// Runtime state of one end of a portal pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Name of the actor who opened the portal.
    pub owner: String,
    /// Uses left before the portal collapses.
    pub charges: u32,
}

/// A named link from a room to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Name travelers use to take this exit.
    pub name: String,
    /// Where the exit leads.
    pub target: ExitTarget,
    /// Traits, including the mutable closed and locked pair.
    #[serde(default)]
    pub flags: BTreeSet<ExitFlag>,
    /// Name of the key that locks and unlocks this exit.
    #[serde(default)]
    pub key: Option<String>,
    /// Gold charged by the tollkeeper.
    #[serde(default)]
    pub toll: u64,
    /// Largest body size that fits through.
    #[serde(default)]
    pub max_size: Option<Size>,
    /// Lowest level allowed through.
    #[serde(default)]
    pub min_level: Option<u32>,
    /// Highest level allowed through.
    #[serde(default)]
    pub max_level: Option<u32>,
    /// Magical wall covering the exit.
    #[serde(default)]
    pub wall: Option<Wall>,
    /// Portal state, for portal exits.
    #[serde(default)]
    pub portal: Option<Portal>,
    /// Narration when the exit is opened.
    #[serde(default)]
    pub open_text: Option<String>,
    /// Narration when the exit is closed.
    #[serde(default)]
    pub close_text: Option<String>,
    /// Narration shown to each traveler passing through.
    #[serde(default)]
    pub enter_text: Option<String>,
}

impl Exit {
    /// A plain exit with no traits.
    pub fn new(name: impl Into<String>, target: impl Into<ExitTarget>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            flags: BTreeSet::new(),
            key: None,
            toll: 0,
            max_size: None,
            min_level: None,
            max_level: None,
            wall: None,
            portal: None,
            open_text: None,
            close_text: None,
            enter_text: None,
        }
    }

    /// Builder-style flag setter.
    pub fn with_flag(mut self, flag: ExitFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Whether the exit carries `flag`.
    pub fn is(&self, flag: ExitFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Add a trait.
    pub fn set(&mut self, flag: ExitFlag) {
        self.flags.insert(flag);
    }

    /// Remove a trait.
    pub fn clear(&mut self, flag: ExitFlag) {
        self.flags.remove(&flag);
    }

    /// Exits that should not be narrated by name when someone leaves.
    pub fn is_hidden(&self) -> bool {
        self.is(ExitFlag::Secret) || self.is(ExitFlag::Concealed) || self.is(ExitFlag::DescriptionOnly)
    }

    /// Leaving through these exits never leaves footprints.
    pub fn is_track_exempt(&self) -> bool {
        self.is(ExitFlag::DescriptionOnly) || self.is(ExitFlag::Portal)
    }

    /// Climbing gear is needed either to climb or to rappel.
    pub fn needs_climbing_gear(&self) -> bool {
        self.is(ExitFlag::NeedsClimbingGear) || self.is(ExitFlag::ClimbingGearToRappel)
    }

    /// Closed or locked: nothing can pass without opening it first.
    pub fn is_shut(&self) -> bool {
        self.is(ExitFlag::Closed) || self.is(ExitFlag::Locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_exit_with_defaults() {
        let json = r#"{"name": "north", "target": {"location": "town:2"}, "flags": ["closed", "closable"]}"#;
        let exit: Exit = serde_json::from_str(json).unwrap();
        assert_eq!(exit.target, ExitTarget::Location(Location::symbolic("town", 2)));
        assert!(exit.is_shut());
        assert!(exit.is(ExitFlag::Closable));
        assert_eq!(exit.toll, 0);
    }

    #[test]
    fn traveler_relative_target_from_json() {
        let exit: Exit = serde_json::from_str(r#"{"name": "home", "target": "bound"}"#).unwrap();
        assert_eq!(exit.target, ExitTarget::Bound);
    }

    #[test]
    fn portal_and_description_exits_are_track_exempt() {
        let target = Location::symbolic("town", 1);
        assert!(Exit::new("portal", target.clone()).with_flag(ExitFlag::Portal).is_track_exempt());
        assert!(
            Exit::new("mural", target.clone())
                .with_flag(ExitFlag::DescriptionOnly)
                .is_hidden()
        );
        assert!(!Exit::new("north", target).is_track_exempt());
    }
}
