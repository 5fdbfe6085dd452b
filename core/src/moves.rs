use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a BUILD move creates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Ant(AntType),
    Construction(ConstrType),
}

impl BuildType {
    /// Food cost, or None when the type cannot be built.
    pub const fn cost(self) -> Option<u32> {
        match self {
            BuildType::Ant(ant_type) => ant_type.stats().cost,
            BuildType::Construction(constr_type) => constr_type.build_cost(),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Ant(t) => write!(f, "{:?}", t),
            BuildType::Construction(t) => write!(f, "{:?}", t),
        }
    }
}

/// A single move. Moves are never mutated after they are issued.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Move {
    Build { build: BuildType, coord: Coord },
    /// Only the first and last coordinates have any effect.
    MoveAnt { path: Vec<Coord> },
    End,
}

impl Move {
    pub fn build_ant(ant_type: AntType, coord: Coord) -> Self {
        Move::Build {
            build: BuildType::Ant(ant_type),
            coord,
        }
    }

    pub fn build_constr(constr_type: ConstrType, coord: Coord) -> Self {
        Move::Build {
            build: BuildType::Construction(constr_type),
            coord,
        }
    }

    pub fn move_ant(path: impl Into<Vec<Coord>>) -> Self {
        Move::MoveAnt { path: path.into() }
    }

    /// Origin of an ant move.
    pub fn from(&self) -> Option<Coord> {
        match self {
            Move::MoveAnt { path } => path.first().copied(),
            _ => None,
        }
    }

    /// Destination of an ant move.
    pub fn to(&self) -> Option<Coord> {
        match self {
            Move::MoveAnt { path } => path.last().copied(),
            _ => None,
        }
    }

    pub fn is_build(&self) -> bool {
        matches!(self, Move::Build { .. })
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Move::End)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Build { build, coord } => write!(f, "build {} at {}", build, coord),
            Move::MoveAnt { path } => {
                write!(f, "move")?;
                for coord in path {
                    write!(f, " {}", coord)?;
                }
                Ok(())
            }
            Move::End => write!(f, "end"),
        }
    }
}
