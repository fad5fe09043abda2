use wf_core::{ActorId, Location, WallKind};

/// What kind of navigation event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEventKind {
    // Movement
    /// An actor left a room.
    Departed {
        /// The actor that left.
        actor: ActorId,
        /// The exit taken; empty for teleports.
        exit: String,
    },
    /// An actor entered a room.
    Arrived {
        /// The actor that arrived.
        actor: ActorId,
        /// The room arrived in.
        at: Location,
    },
    /// A dependent could not come along.
    LeftBehind {
        /// The dependent left in the source room.
        actor: ActorId,
        /// The refusal that kept it there.
        reason: String,
    },
    /// An actor passed through an exit's enter text.
    Entered {
        /// The traveler.
        actor: ActorId,
        /// The exit's enter text.
        text: String,
    },
    /// A stealthy departure was noticed.
    SneakFailed {
        /// The actor that was noticed.
        actor: ActorId,
    },
    /// A tollkeeper was paid.
    TollPaid {
        /// The actor that paid.
        actor: ActorId,
        /// Gold paid.
        amount: u64,
    },

    // Hazards
    /// An actor fell while climbing.
    Fell {
        /// The actor that fell.
        actor: ActorId,
        /// Hit points lost.
        damage: i32,
    },
    /// An actor crossed a damaging wall.
    WallDamage {
        /// The actor that crossed.
        actor: ActorId,
        /// What the wall is made of.
        wall: WallKind,
        /// Hit points lost.
        damage: i32,
    },
    /// An actor was killed by a hazard.
    Died {
        /// The actor that died.
        actor: ActorId,
        /// What killed it.
        cause: String,
    },

    // Exits
    /// An exit was opened.
    ExitOpened {
        /// The actor that opened it.
        actor: ActorId,
        /// The exit.
        exit: String,
    },
    /// An exit was closed.
    ExitClosed {
        /// The actor that closed it.
        actor: ActorId,
        /// The exit.
        exit: String,
    },
    /// An exit was locked.
    ExitLocked {
        /// The actor that locked it.
        actor: ActorId,
        /// The exit.
        exit: String,
    },
    /// An exit was unlocked.
    ExitUnlocked {
        /// The actor that unlocked it.
        actor: ActorId,
        /// The exit.
        exit: String,
    },
    /// A portal pair was opened.
    PortalOpened {
        /// The actor that opened it.
        owner: ActorId,
        /// The far end.
        to: Location,
    },
    /// A portal pair vanished.
    PortalCollapsed {
        /// Name of the actor that opened it.
        owner: String,
    },

    // Tracking
    /// A deferred track search was scheduled.
    TrackSearchStarted {
        /// The searcher.
        actor: ActorId,
    },
    /// A pending track search was cancelled.
    TrackSearchInterrupted {
        /// The searcher.
        actor: ActorId,
    },
    /// A track search succeeded.
    TracksFound {
        /// The searcher.
        actor: ActorId,
        /// Direction the tracks lead.
        direction: String,
    },
    /// The search failed or there was nothing to find.
    TracksNotFound {
        /// The searcher.
        actor: ActorId,
    },
}

impl NavEventKind {
    /// Check whether a given actor is involved in this event.
    pub fn involves(&self, id: ActorId) -> bool {
        match self {
            Self::Departed { actor, .. }
            | Self::Arrived { actor, .. }
            | Self::LeftBehind { actor, .. }
            | Self::Entered { actor, .. }
            | Self::SneakFailed { actor }
            | Self::TollPaid { actor, .. }
            | Self::Fell { actor, .. }
            | Self::WallDamage { actor, .. }
            | Self::Died { actor, .. }
            | Self::ExitOpened { actor, .. }
            | Self::ExitClosed { actor, .. }
            | Self::ExitLocked { actor, .. }
            | Self::ExitUnlocked { actor, .. }
            | Self::TrackSearchStarted { actor }
            | Self::TrackSearchInterrupted { actor }
            | Self::TracksFound { actor, .. }
            | Self::TracksNotFound { actor } => *actor == id,
            Self::PortalOpened { owner, .. } => *owner == id,
            Self::PortalCollapsed { .. } => false,
        }
    }
}

/// Who gets to see an event. Formatting and delivery belong to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Only this actor.
    Actor(ActorId),
    /// Everyone in the room except the listed actors.
    Room {
        /// The room.
        at: Location,
        /// Actors who do not see it.
        exclude: Vec<ActorId>,
    },
    /// Only staff in the room.
    Staff {
        /// The room.
        at: Location,
    },
}

/// A record of something that happened while moving around.
#[derive(Debug, Clone)]
pub struct NavEvent {
    /// The tick when this event occurred.
    pub tick: u64,
    /// What happened.
    pub kind: NavEventKind,
    /// Who sees it.
    pub audience: Audience,
    /// A human-readable description of the event.
    pub description: String,
}

impl NavEvent {
    /// Create a new event.
    pub fn new(
        tick: u64,
        kind: NavEventKind,
        audience: Audience,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tick,
            kind,
            audience,
            description: description.into(),
        }
    }
}

/// Accumulates narration.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<NavEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: NavEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[NavEvent] {
        &self.events
    }

    /// Events that happened at `tick`.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&NavEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Events involving the given actor.
    pub fn events_for_actor(&self, id: ActorId) -> Vec<&NavEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&NavEvent> {
        self.events.last()
    }

    /// Number of events held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
