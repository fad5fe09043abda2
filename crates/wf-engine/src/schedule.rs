use wf_core::{ActorId, Location};

/// What a deferred action does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredKind {
    /// Finish searching a vast room for tracks.
    TrackSearch {
        /// Room being searched.
        at: Location,
    },
}

/// An action queued to run after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred {
    /// Id returned when the action was scheduled.
    pub id: u64,
    /// Actor the action belongs to.
    pub actor: ActorId,
    /// What the action does.
    pub kind: DeferredKind,
    /// Tick at which the action fires.
    pub due: u64,
}

/// Queue of deferred actions, fired in the order they were scheduled.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Vec<Deferred>,
    next_id: u64,
}

impl Scheduler {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action `delay` ticks after `now`. Returns its id.
    pub fn schedule(&mut self, actor: ActorId, kind: DeferredKind, now: u64, delay: u64) -> u64 {
        self.next_id += 1;
        self.queue.push(Deferred {
            id: self.next_id,
            actor,
            kind,
            due: now + delay,
        });
        self.next_id
    }

    /// Drop every pending action of an actor. Returns how many were dropped.
    pub fn interrupt(&mut self, actor: ActorId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|d| d.actor != actor);
        before - self.queue.len()
    }

    /// Pending actions of one actor.
    pub fn pending_for(&self, actor: ActorId) -> impl Iterator<Item = &Deferred> {
        self.queue.iter().filter(move |d| d.actor == actor)
    }

    /// Whether the actor has anything pending.
    pub fn is_pending(&self, actor: ActorId) -> bool {
        self.pending_for(actor).next().is_some()
    }

    /// Remove and return the actions due at or before `now`.
    pub fn take_due(&mut self, now: u64) -> Vec<Deferred> {
        let (due, later): (Vec<_>, Vec<_>) = self.queue.drain(..).partition(|d| d.due <= now);
        self.queue = later;
        due
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
