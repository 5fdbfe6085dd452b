use crate::moves::BuildType;
use crate::types::Coord;
use thiserror::Error;

/// A move that does not fit the state it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no ant at {0}")]
    NoAntAt(Coord),

    #[error("ant move with an empty path")]
    EmptyPath,

    #[error("{0} cannot be built")]
    Unbuildable(BuildType),

    #[error("ant at {coord} belongs to {owner}, not the player to move")]
    NotOwned {
        coord: Coord,
        owner: crate::types::PlayerId,
    },
}

pub type Result<T> = std::result::Result<T, TransitionError>;
