use wf_core::{Location, SymbolicRef, WfError};

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Arena misuse in the world model.
    #[error(transparent)]
    World(#[from] WfError),

    /// A refused move.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// A world file that is not valid JSON for the schema.
    #[error("invalid world file: {0}")]
    Json(#[from] serde_json::Error),

    /// A world file that parses but does not hold together.
    #[error("load error: {0}")]
    Load(String),
}

impl EngineError {
    /// The movement refusal inside this error, if that is what it is.
    pub fn as_move(&self) -> Option<&MoveError> {
        match self {
            Self::Move(m) => Some(m),
            _ => None,
        }
    }
}

/// Why a move was refused. Every variant carries the text shown to the
/// actor who asked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// No exit by that name in the current room.
    #[error("You can't go \"{0}\" from here.")]
    NoSuchExit(String),

    /// The exit does not lead anywhere for this traveler.
    #[error("{0}")]
    Unresolvable(Unresolved),

    /// Refused by the exit itself or by someone guarding it.
    #[error("{0}")]
    Blocked(String),

    /// Refused for reasons unrelated to the exit.
    #[error("{0}")]
    Restricted(String),

    /// The destination is full.
    #[error("{0} is full.")]
    CapacityExceeded(String),
}

/// Why an exit target could not be turned into a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unresolved {
    /// The target region is not loaded.
    #[error("That region does not exist ({0}).")]
    NoRegion(String),

    /// Terrain at the target cell cannot be crossed.
    #[error("You can't go that way: {0} is impassable.")]
    Impassable(Location),

    /// The room store has no such room.
    #[error("That leads nowhere ({0}).")]
    NoRoom(SymbolicRef),

    /// The traveler has no previous location.
    #[error("You have nowhere to go back to.")]
    NoPrevious,

    /// The traveler has no bound location.
    #[error("You are not bound anywhere.")]
    NoBound,

    /// The traveler owns no storage room.
    #[error("You must purchase a storage room first.")]
    NoStorage,

    /// The traveler owns more than one storage room.
    #[error("You are affiliated with more than one storage room.")]
    AmbiguousStorage,
}
