//! Per-player holdings: ants, constructions and food.
//! Lookups scan these lists; the board is small enough that no grid is kept.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// A single ant on the board.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ant {
    /// Creation id, unique within a game. Used as the canonical ordering key.
    pub id: u32,
    pub ant_type: AntType,
    pub coords: Coord,
    pub owner: PlayerId,
    pub health: u8,
    /// Only meaningful for workers.
    #[serde(default)]
    pub carrying: bool,
    /// Reset at turn boundaries.
    #[serde(default)]
    pub has_moved: bool,
}

impl Ant {
    /// Creates a fresh ant at full health.
    pub fn new(id: u32, ant_type: AntType, coords: Coord, owner: PlayerId) -> Self {
        Self {
            id,
            ant_type,
            coords,
            owner,
            health: ant_type.stats().health,
            carrying: false,
            has_moved: false,
        }
    }

    pub fn stats(&self) -> UnitStats {
        self.ant_type.stats()
    }

    /// Returns true if `target` lies within this ant's attack range.
    pub fn in_range(&self, target: Coord) -> bool {
        let range = self.stats().range as u32;
        self.coords.distance_squared(target) <= range * range
    }
}

/// A structure or resource tile.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub constr_type: ConstrType,
    pub coords: Coord,
    /// None for food and grass.
    #[serde(default)]
    pub owner: Option<PlayerId>,
}

impl Construction {
    pub fn new(constr_type: ConstrType, coords: Coord, owner: Option<PlayerId>) -> Self {
        Self {
            constr_type,
            coords,
            owner,
        }
    }
}

/// Everything one owner holds. Ant and construction order is insertion order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub owner: PlayerId,
    #[serde(default)]
    pub ants: Vec<Ant>,
    #[serde(default)]
    pub constrs: Vec<Construction>,
    /// Signed: the transition engine deducts build costs without clamping.
    #[serde(default)]
    pub food_count: i32,
}

impl Inventory {
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            ants: Vec::new(),
            constrs: Vec::new(),
            food_count: 0,
        }
    }

    /// Returns the living queen, if any.
    pub fn queen(&self) -> Option<&Ant> {
        self.ants.iter().find(|ant| ant.ant_type == AntType::Queen)
    }

    pub fn has_queen(&self) -> bool {
        self.queen().is_some()
    }

    pub fn anthill(&self) -> Option<&Construction> {
        self.constrs
            .iter()
            .find(|c| c.constr_type == ConstrType::Anthill)
    }

    pub fn tunnels(&self) -> impl Iterator<Item = &Construction> {
        self.constrs
            .iter()
            .filter(|c| c.constr_type == ConstrType::Tunnel)
    }

    /// Anthill and tunnels: the tiles where workers deposit food.
    pub fn drop_offs(&self) -> impl Iterator<Item = &Construction> {
        self.constrs.iter().filter(|c| c.constr_type.is_drop_off())
    }

    pub fn ants_of(&self, ant_type: AntType) -> impl Iterator<Item = &Ant> {
        self.ants.iter().filter(move |ant| ant.ant_type == ant_type)
    }

    pub fn workers(&self) -> impl Iterator<Item = &Ant> {
        self.ants_of(AntType::Worker)
    }

    /// Drones, soldiers and ranged soldiers.
    pub fn attackers(&self) -> impl Iterator<Item = &Ant> {
        self.ants.iter().filter(|ant| ant.ant_type.is_attacker())
    }

    /// Every ant except the queen, ordered by creation id.
    pub fn non_queen_ants(&self) -> Vec<&Ant> {
        let mut ants: Vec<&Ant> = self
            .ants
            .iter()
            .filter(|ant| ant.ant_type != AntType::Queen)
            .collect();
        ants.sort_by_key(|ant| ant.id);
        ants
    }

    pub fn ant_at(&self, coord: Coord) -> Option<&Ant> {
        self.ants.iter().find(|ant| ant.coords == coord)
    }

    pub fn constr_at(&self, coord: Coord) -> Option<&Construction> {
        self.constrs.iter().find(|c| c.coords == coord)
    }

    /// Total health of every ant in this inventory.
    pub fn total_health(&self) -> u32 {
        self.ants.iter().map(|ant| ant.health as u32).sum()
    }
}
