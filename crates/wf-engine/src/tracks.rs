//! Footprints: recording them on departure and searching for them.

use tracing::debug;
use wf_core::{ActorId, Location, RoomFlag, Size, World};

use crate::engine::Engine;
use crate::error::{EngineResult, MoveError};
use crate::event::{Audience, NavEventKind};
use crate::gate::{self, RoomFacts};
use crate::schedule::{Deferred, DeferredKind};
use crate::zone::ZoneKind;

/// Overwrite the footprint at `at` with the party that just left through
/// `exit`. Only actors that leave tracks are counted; a party with none
/// leaves the previous footprint untouched.
pub fn record(world: &mut World, at: &Location, exit: &str, leavers: &[ActorId], permanent: bool) {
    if permanent {
        return;
    }
    let sizes: Vec<Size> = leavers
        .iter()
        .filter_map(|id| world.actor(*id))
        .filter(|a| a.leaves_tracks())
        .map(|a| a.size)
        .collect();
    if sizes.is_empty() {
        return;
    }
    let Some(track) = world.track_mut(at) else {
        return;
    };
    track.reset(exit);
    for size in sizes {
        track.record(size);
    }
    debug!(at = %at, exit, count = track.count, "tracks recorded");
}

/// What a successful search reveals. Size and count need more skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFinding {
    /// Exit the tracks lead through.
    pub direction: String,
    /// Size of whoever left them, if skilled enough.
    pub size: Option<Size>,
    /// How many passed, if skilled enough.
    pub count: Option<u32>,
}

/// Result of asking to search for tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSearch {
    /// The search will finish at the given tick.
    Pending {
        /// Tick the search finishes.
        due: u64,
    },
    /// The search finished at once.
    Found(TrackFinding),
    /// No tracks here.
    Nothing,
}

impl Engine {
    /// Search the current room for tracks. Vast rooms take a while; the
    /// search is then deferred and finishes on a later tick.
    pub fn search_tracks(&mut self, actor: ActorId) -> EngineResult<TrackSearch> {
        let a = self.world.try_actor(actor)?;
        if a.is_incapacitated() {
            return Err(MoveError::Restricted("You are in no condition to do that.".into()).into());
        }
        let skill = a.skill("track");
        if skill == 0 {
            return Err(MoveError::Restricted("You don't know how to track.".into()).into());
        }
        if self.scheduler.is_pending(actor) {
            return Err(MoveError::Restricted("You are already searching for tracks.".into()).into());
        }
        let dex_bonus = a.dex_bonus();
        let Some(at) = a.location.clone() else {
            return Err(MoveError::Restricted("You are nowhere.".into()).into());
        };

        let vast = self
            .world
            .room_key_of(&at)
            .and_then(|k| self.world.room(&k))
            .is_some_and(|r| r.has(RoomFlag::Vast));
        if vast {
            let base = self.config.track_search_base_delay as i64;
            let delay = (base - dex_bonus as i64).max(1) as u64;
            let now = self.clock.tick();
            self.scheduler
                .schedule(actor, DeferredKind::TrackSearch { at: at.clone() }, now, delay);
            self.emit(
                NavEventKind::TrackSearchStarted { actor },
                Audience::Actor(actor),
                "You begin searching the area for tracks.",
            );
            return Ok(TrackSearch::Pending { due: now + delay });
        }
        Ok(self.finish_track_search(actor, &at))
    }

    /// Roll a track search at `at`.
    fn finish_track_search(&mut self, actor: ActorId, at: &Location) -> TrackSearch {
        let Some(a) = self.world.actor(actor) else {
            return TrackSearch::Nothing;
        };
        let skill = a.skill("track") as i32;
        let chance = 25 + (a.dex_bonus() + skill) * 5;
        let track = self.world.track_at(at).filter(|t| !t.is_empty()).cloned();

        let Some(track) = track else {
            self.emit(
                NavEventKind::TracksNotFound { actor },
                Audience::Actor(actor),
                "There are no tracks here.",
            );
            return TrackSearch::Nothing;
        };
        if self.dice.roll(1, 100) > chance {
            self.emit(
                NavEventKind::TracksNotFound { actor },
                Audience::Actor(actor),
                "You fail to find any tracks.",
            );
            return TrackSearch::Nothing;
        }

        let direction = track.direction.unwrap_or_default();
        let finding = TrackFinding {
            direction: direction.clone(),
            size: track.size.filter(|_| skill >= 5),
            count: (skill >= 10).then_some(track.count),
        };
        let mut line = String::from("You find");
        match finding.count {
            Some(n) => line.push_str(&format!(" {n} set(s) of")),
            None => line.push_str(" some"),
        }
        if let Some(size) = finding.size {
            line.push_str(&format!(" {size}"));
        }
        line.push_str(&format!(" tracks leading {direction}."));
        self.emit(
            NavEventKind::TracksFound { actor, direction },
            Audience::Actor(actor),
            line,
        );
        TrackSearch::Found(finding)
    }

    /// Run a deferred action whose delay has elapsed.
    pub(crate) fn fire(&mut self, deferred: Deferred) {
        match deferred.kind {
            DeferredKind::TrackSearch { at } => {
                let Some(here) = self
                    .world
                    .actor(deferred.actor)
                    .filter(|a| !a.is_incapacitated())
                    .and_then(|a| a.location.clone())
                else {
                    return;
                };
                let open = RoomFacts::default();
                if gate::check_distance(self.zones.as_ref(), &at, &here, ZoneKind::Track, &open)
                    .is_err()
                {
                    self.emit(
                        NavEventKind::TracksNotFound {
                            actor: deferred.actor,
                        },
                        Audience::Actor(deferred.actor),
                        "You have wandered too far to finish your search.",
                    );
                    return;
                }
                self.finish_track_search(deferred.actor, &at);
            }
        }
    }
}
