use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::addressing::{Location, SymbolicRef};
use crate::group::GroupId;

/// Unique identifier for every actor in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Generate a new random actor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Whether an actor is controlled by a player or by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A player character.
    Player,
    /// A creature run by the world.
    Monster,
}

/// Privilege level. Staff bypass most movement rules; builders are
/// confined to the authored rooms of the regions they are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// An ordinary player.
    #[default]
    Player,
    /// A builder limited to the listed regions.
    Builder {
        /// Regions whose authored rooms the builder may enter.
        regions: Vec<String>,
    },
    /// Staff: bypasses most movement rules.
    Staff,
}

/// Body size, smallest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    /// Smaller than tiny insects.
    Fine,
    /// Insect-sized.
    Diminutive,
    /// Cat-sized.
    Tiny,
    /// Halfling-sized.
    Small,
    /// Human-sized.
    #[default]
    Medium,
    /// Horse-sized.
    Large,
    /// Giant-sized.
    Huge,
    /// Dragon-sized.
    Gargantuan,
    /// Larger than anything else.
    Colossal,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fine => "fine",
            Self::Diminutive => "diminutive",
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Huge => "huge",
            Self::Gargantuan => "gargantuan",
            Self::Colossal => "colossal",
        };
        f.write_str(s)
    }
}

/// Transient states an actor can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Killed.
    Dead,
    /// Knocked out.
    Unconscious,
    /// Stunned and unable to act.
    Stunned,
    /// Magically held in place.
    Held,
    /// In the middle of an action that forbids movement.
    Busy,
    /// Hiding; required before sneaking.
    Hidden,
    /// Unseen by those without detect invisible.
    Invisible,
    /// Sees invisible actors.
    DetectInvisible,
    /// In mist form.
    Mist,
    /// Flying.
    Fly,
    /// Levitating.
    Levitate,
    /// Leaves no footprints.
    PassWithoutTrace,
    /// Immune to being held.
    FreeAction,
    /// Sitting down.
    Sitting,
}

/// Permanent behaviour flags, mostly for monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorFlag {
    /// Chases its current target through exits.
    FollowAttacker,
    /// Bars enemies from leaving through any exit.
    BlockExit,
    /// Bars passage through exits flagged as passively guarded.
    PassiveExitGuard,
    /// Charges the toll on toll exits.
    Tollkeeper,
    /// Attacks on sight.
    Aggressive,
}

const STAT_BONUS: [i32; 40] = [
    -4, -4, -4, -3, -3, -2, -2, -1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 5,
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
];

/// Bonus granted by a raw attribute value.
pub fn stat_bonus(stat: u32) -> i32 {
    let idx = (stat / 10) as usize;
    STAT_BONUS[idx.min(STAT_BONUS.len() - 1)]
}

/// A player or monster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Player or monster.
    pub kind: ActorKind,
    /// Privilege level.
    #[serde(default)]
    pub role: Role,
    /// Experience level.
    pub level: u32,
    /// Body size, compared against exit size limits.
    #[serde(default)]
    pub size: Size,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Raw dexterity; see [`stat_bonus`].
    pub dexterity: u32,
    /// Weight currently carried.
    #[serde(default)]
    pub weight: u32,
    /// Most weight the actor can carry and still move.
    pub max_weight: u32,
    /// Gold on hand, spent on tolls.
    #[serde(default)]
    pub gold: u64,
    /// Transient states.
    #[serde(default)]
    pub conditions: BTreeSet<Condition>,
    /// Permanent behaviour flags.
    #[serde(default)]
    pub flags: BTreeSet<ActorFlag>,
    /// Skill name to level (0-100).
    #[serde(default)]
    pub skills: BTreeMap<String, u32>,
    /// Key names this actor carries.
    #[serde(default)]
    pub keys: BTreeSet<String>,
    /// Wearing climbing gear. Climbs that need it are safe.
    #[serde(default)]
    pub climbing_gear: bool,
    /// Strength of magical flight, compared against tile requirements.
    #[serde(default)]
    pub fly_strength: u8,
    /// Actors this one is fighting; the first entry is the current target.
    #[serde(default)]
    pub enemies: Vec<ActorId>,
    /// Tamed creatures that follow this actor.
    #[serde(default)]
    pub pets: Vec<ActorId>,
    /// Owner, for pets.
    #[serde(default)]
    pub master: Option<ActorId>,
    /// Group this actor belongs to.
    #[serde(default)]
    pub group: Option<GroupId>,

    /// Where the actor is. Written only by the movement engine.
    #[serde(default)]
    pub location: Option<Location>,
    /// Last location the actor left.
    #[serde(default)]
    pub previous: Option<Location>,
    /// Designated home location.
    #[serde(default)]
    pub bound: Option<Location>,
    /// Storage rooms the actor owns.
    #[serde(default)]
    pub storage: Vec<SymbolicRef>,
}

impl Actor {
    fn base(kind: ActorKind, name: impl Into<String>, level: u32) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            role: Role::Player,
            level,
            size: Size::Medium,
            hp: 30,
            max_hp: 30,
            dexterity: 100,
            weight: 0,
            max_weight: 200,
            gold: 0,
            conditions: BTreeSet::new(),
            flags: BTreeSet::new(),
            skills: BTreeMap::new(),
            keys: BTreeSet::new(),
            climbing_gear: false,
            fly_strength: 0,
            enemies: Vec::new(),
            pets: Vec::new(),
            master: None,
            group: None,
            location: None,
            previous: None,
            bound: None,
            storage: Vec::new(),
        }
    }

    /// Create a player character.
    pub fn player(name: impl Into<String>, level: u32) -> Self {
        Self::base(ActorKind::Player, name, level)
    }

    /// Create a monster.
    pub fn monster(name: impl Into<String>, level: u32) -> Self {
        Self::base(ActorKind::Monster, name, level)
    }

    /// Return `true` for player characters.
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    /// Return `true` for staff.
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Return `true` for builders.
    pub fn is_builder(&self) -> bool {
        matches!(self.role, Role::Builder { .. })
    }

    /// Return `true` for monsters with a master.
    pub fn is_pet(&self) -> bool {
        self.kind == ActorKind::Monster && self.master.is_some()
    }

    /// Whether the actor is in `condition`.
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Whether the actor carries `flag`.
    pub fn flagged(&self, flag: ActorFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Skill level, 0 if untrained.
    pub fn skill(&self, name: &str) -> u32 {
        self.skills.get(name).copied().unwrap_or(0)
    }

    /// Dead by condition or by hit points.
    pub fn is_dead(&self) -> bool {
        self.has(Condition::Dead) || self.hp <= 0
    }

    /// Dead, unconscious or stunned.
    pub fn is_incapacitated(&self) -> bool {
        self.is_dead() || self.has(Condition::Unconscious) || self.has(Condition::Stunned)
    }

    /// Held in place and not protected by free action.
    pub fn is_immobilized(&self) -> bool {
        self.has(Condition::Held) && !self.has(Condition::FreeAction)
    }

    /// Carrying more than it can move with.
    pub fn is_overloaded(&self) -> bool {
        self.weight > self.max_weight
    }

    /// Flying or levitating.
    pub fn is_airborne(&self) -> bool {
        self.has(Condition::Fly) || self.has(Condition::Levitate)
    }

    /// Bonus from dexterity.
    pub fn dex_bonus(&self) -> i32 {
        stat_bonus(self.dexterity)
    }

    /// Bonus against falling when climbing without gear.
    pub fn fall_bonus(&self) -> i32 {
        self.dex_bonus() * 5
    }

    /// Percent chance a sneak attempt succeeds.
    pub fn sneak_chance(&self) -> u32 {
        self.skill("sneak").min(100)
    }

    /// Whether this actor can perceive `other`.
    pub fn can_see(&self, other: &Actor) -> bool {
        if self.is_staff() {
            return true;
        }
        if other.is_staff() && other.has(Condition::Invisible) {
            return false;
        }
        !other.has(Condition::Invisible) || self.has(Condition::DetectInvisible)
    }

    /// Whether `other` is among this actor's enemies.
    pub fn is_enemy(&self, other: ActorId) -> bool {
        self.enemies.contains(&other)
    }

    /// The enemy this actor is fighting right now.
    pub fn current_target(&self) -> Option<ActorId> {
        self.enemies.first().copied()
    }

    /// Players leave footprints unless they are airborne, untraceable or staff.
    pub fn leaves_tracks(&self) -> bool {
        self.is_player()
            && !self.is_staff()
            && !self.is_airborne()
            && !self.has(Condition::PassWithoutTrace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_bonus_table_edges() {
        assert_eq!(stat_bonus(0), -4);
        assert_eq!(stat_bonus(79), -1);
        assert_eq!(stat_bonus(100), 0);
        assert_eq!(stat_bonus(140), 1);
        assert_eq!(stat_bonus(280), 5);
        assert_eq!(stat_bonus(9000), 5);
    }

    #[test]
    fn fall_bonus_scales_with_dexterity() {
        let mut a = Actor::player("Kael", 5);
        assert_eq!(a.fall_bonus(), 0);
        a.dexterity = 170;
        assert_eq!(a.fall_bonus(), 10);
    }

    #[test]
    fn held_actor_with_free_action_can_move() {
        let mut a = Actor::player("Kael", 5);
        a.conditions.insert(Condition::Held);
        assert!(a.is_immobilized());
        a.conditions.insert(Condition::FreeAction);
        assert!(!a.is_immobilized());
    }

    #[test]
    fn invisibility_requires_detection() {
        let mut seer = Actor::monster("orc", 3);
        let mut target = Actor::player("Kael", 5);
        target.conditions.insert(Condition::Invisible);
        assert!(!seer.can_see(&target));
        seer.conditions.insert(Condition::DetectInvisible);
        assert!(seer.can_see(&target));
    }

    #[test]
    fn flying_players_leave_no_tracks() {
        let mut a = Actor::player("Kael", 5);
        assert!(a.leaves_tracks());
        a.conditions.insert(Condition::Fly);
        assert!(!a.leaves_tracks());
        assert!(!Actor::monster("wolf", 2).leaves_tracks());
    }

    #[test]
    fn display_is_short_uuid() {
        let id = ActorId::new();
        assert_eq!(id.to_string().len(), 8);
    }
}
