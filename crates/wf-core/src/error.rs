use crate::actor::ActorId;
use crate::group::GroupId;

/// Alias for `Result<T, WfError>`.
pub type WfResult<T> = Result<T, WfError>;

/// Errors that can occur when manipulating the world arena.
#[derive(Debug, thiserror::Error)]
pub enum WfError {
    /// The requested actor ID does not exist in the world.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// An actor with the same name already exists.
    #[error("actor already exists: \"{0}\"")]
    DuplicateActor(String),

    /// The requested group ID does not exist in the world.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// No region is registered under this name.
    #[error("region not found: \"{0}\"")]
    RegionNotFound(String),

    /// A region with the same name is already registered.
    #[error("region already exists: \"{0}\"")]
    DuplicateRegion(String),

    /// The addressed room is not resident.
    #[error("room not resident: {0}")]
    RoomNotResident(String),

    /// A textual location could not be parsed.
    #[error("invalid location \"{0}\": expected region:id or region.x.y[.z]")]
    InvalidLocation(String),

    /// A named reference could not be resolved to an existing actor.
    #[error("invalid reference: actor \"{0}\" not found")]
    InvalidReference(String),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
