use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the square board.
pub const BOARD_LENGTH: u8 = 10;

/// Food count at which a player wins outright.
pub const FOOD_GOAL: i32 = 11;

/// Full health of a queen. Several heuristics measure damage against it.
pub const QUEEN_MAX_HEALTH: u8 = AntType::Queen.stats().health;

/// Owner of an inventory. The neutral inventory holds food and grass only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
    Neutral,
}

impl PlayerId {
    /// Returns the opposing player. Neutral has no opponent and maps to itself.
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
            PlayerId::Neutral => PlayerId::Neutral,
        }
    }

    /// Returns the inventory slot (0, 1, 2) for this id.
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
            PlayerId::Neutral => 2,
        }
    }

    /// Returns true for the two players that take turns.
    pub const fn is_player(self) -> bool {
        !matches!(self, PlayerId::Neutral)
    }

    /// Rows (inclusive) forming this player's half of the board.
    pub const fn home_rows(self) -> (u8, u8) {
        match self {
            PlayerId::One => (0, 3),
            PlayerId::Two => (BOARD_LENGTH - 4, BOARD_LENGTH - 1),
            PlayerId::Neutral => (0, BOARD_LENGTH - 1),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => write!(f, "player one"),
            PlayerId::Two => write!(f, "player two"),
            PlayerId::Neutral => write!(f, "neutral"),
        }
    }
}

/// Phase of the game.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Players place their anthill, tunnel and grass.
    Setup1,
    /// Players place food on the opponent's side.
    Setup2,
    Play,
    End,
}

/// A cell on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Creates a coordinate, returning None if it lies off the board.
    pub const fn checked(x: u8, y: u8) -> Option<Self> {
        if x < BOARD_LENGTH && y < BOARD_LENGTH {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub const fn is_on_board(self) -> bool {
        self.x < BOARD_LENGTH && self.y < BOARD_LENGTH
    }

    /// Manhattan distance, assuming every step costs one.
    pub const fn manhattan(self, other: Coord) -> u32 {
        (self.x.abs_diff(other.x) as u32) + (self.y.abs_diff(other.y) as u32)
    }

    /// Squared Euclidean distance, used for attack range checks.
    pub const fn distance_squared(self, other: Coord) -> u32 {
        let dx = self.x.abs_diff(other.x) as u32;
        let dy = self.y.abs_diff(other.y) as u32;
        dx * dx + dy * dy
    }

    /// Number of cells between this coordinate and the nearest board edge.
    pub const fn edge_distance(self) -> u32 {
        let last = BOARD_LENGTH - 1;
        let dx = if self.x < last - self.x { self.x } else { last - self.x };
        let dy = if self.y < last - self.y { self.y } else { last - self.y };
        if dx < dy {
            dx as u32
        } else {
            dy as u32
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Fixed statistics shared by every ant of a type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnitStats {
    pub movement: u8,
    pub health: u8,
    pub attack: u8,
    pub range: u8,
    /// Food cost to build; None for units that cannot be built.
    pub cost: Option<u32>,
    pub ignores_grass: bool,
}

/// The kinds of ants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum AntType {
    Queen,
    Worker,
    Drone,
    Soldier,
    RangedSoldier,
}

impl AntType {
    pub const ALL: [AntType; 5] = [
        AntType::Queen,
        AntType::Worker,
        AntType::Drone,
        AntType::Soldier,
        AntType::RangedSoldier,
    ];

    pub const fn stats(self) -> UnitStats {
        match self {
            AntType::Queen => UnitStats {
                movement: 2,
                health: 4,
                attack: 1,
                range: 1,
                cost: None,
                ignores_grass: false,
            },
            AntType::Worker => UnitStats {
                movement: 2,
                health: 1,
                attack: 0,
                range: 0,
                cost: Some(1),
                ignores_grass: false,
            },
            AntType::Drone => UnitStats {
                movement: 3,
                health: 2,
                attack: 1,
                range: 1,
                cost: Some(1),
                ignores_grass: true,
            },
            AntType::Soldier => UnitStats {
                movement: 2,
                health: 4,
                attack: 2,
                range: 1,
                cost: Some(2),
                ignores_grass: false,
            },
            AntType::RangedSoldier => UnitStats {
                movement: 2,
                health: 2,
                attack: 1,
                range: 3,
                cost: Some(2),
                ignores_grass: false,
            },
        }
    }

    /// Returns true for the soldier types whose job is to fight.
    pub const fn is_attacker(self) -> bool {
        matches!(
            self,
            AntType::Drone | AntType::Soldier | AntType::RangedSoldier
        )
    }
}

/// The kinds of constructions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ConstrType {
    Anthill,
    Tunnel,
    Grass,
    Food,
}

impl ConstrType {
    /// Food cost to build; None when the construction is only placed in setup.
    pub const fn build_cost(self) -> Option<u32> {
        match self {
            ConstrType::Tunnel => Some(3),
            ConstrType::Anthill | ConstrType::Grass | ConstrType::Food => None,
        }
    }

    /// Returns true for constructions where a worker can drop off food.
    pub const fn is_drop_off(self) -> bool {
        matches!(self, ConstrType::Anthill | ConstrType::Tunnel)
    }
}
