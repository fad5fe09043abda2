//! Damage taken while crossing an exit.

use wf_core::{Actor, Condition, Exit, ExitFlag, Room, RoomFlag, WallKind};

use crate::dice::Dice;

/// Something that can hurt a traveler on the way through an exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hazard {
    /// Climbing without gear.
    Fall {
        /// Harder climb, more likely to end in a fall.
        difficult: bool,
    },
    /// A magical wall across the exit.
    Wall {
        /// Element of the wall.
        kind: WallKind,
        /// Upper bound of the damage roll.
        strength: u32,
    },
}

/// Result of resolving one hazard against one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardOutcome {
    /// No harm done.
    Safe,
    /// The actor took damage and lived.
    Hurt {
        /// Hit points lost.
        damage: i32,
    },
    /// The damage killed the actor.
    Fatal {
        /// Hit points lost.
        damage: i32,
    },
}

impl Hazard {
    /// Hazards `actor` faces crossing `exit` out of `room`.
    pub fn for_crossing(actor: &Actor, room: &Room, exit: &Exit) -> Vec<Hazard> {
        let mut hazards = Vec::new();
        if actor.is_staff() {
            return hazards;
        }
        let floats = actor.has(Condition::Levitate) || actor.has(Condition::Mist);
        if exit.needs_climbing_gear() && !actor.climbing_gear && !floats {
            hazards.push(Hazard::Fall {
                difficult: exit.is(ExitFlag::DifficultClimb) || room.has(RoomFlag::DifficultToMove),
            });
        }
        if let Some(wall) = &exit.wall {
            hazards.push(Hazard::Wall {
                kind: wall.kind,
                strength: wall.strength,
            });
        }
        hazards
    }

    /// Roll this hazard. Does not modify the actor.
    pub fn resolve(&self, actor: &Actor, dice: &mut dyn Dice) -> HazardOutcome {
        let damage = match self {
            Self::Fall { difficult } => {
                let base = if *difficult { 100 } else { 50 };
                let fall = base - actor.fall_bonus();
                if dice.roll(1, 100) >= fall {
                    return HazardOutcome::Safe;
                }
                dice.roll(5, 15 + fall / 10)
            }
            Self::Wall { kind, strength } => {
                if *kind == WallKind::Thorns && actor.is_airborne() {
                    return HazardOutcome::Safe;
                }
                dice.roll(1, (*strength).max(1) as i32)
            }
        };
        if actor.hp - damage <= 0 {
            HazardOutcome::Fatal { damage }
        } else {
            HazardOutcome::Hurt { damage }
        }
    }

    /// Short phrase naming the hazard in messages.
    pub fn cause(&self) -> &'static str {
        match self {
            Self::Fall { .. } => "a fall",
            Self::Wall {
                kind: WallKind::Fire,
                ..
            } => "a wall of fire",
            Self::Wall {
                kind: WallKind::Thorns,
                ..
            } => "a wall of thorns",
        }
    }
}
