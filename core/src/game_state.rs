//! Complete game state: three inventories, the turn flag and the phase.
//! This module provides the read-side interface used by evaluators and search.

use crate::inventory::*;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Outcome of a game from a fixed player's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Complete state of a game.
///
/// Cloning produces a fully independent copy: every ant, construction and
/// inventory is owned by value, so search branches never share mutable data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Indexed by `PlayerId::index`: player one, player two, neutral.
    pub inventories: [Inventory; 3],
    pub whose_turn: PlayerId,
    pub phase: Phase,
}

impl GameState {
    /// Creates an empty play-phase state with player one to move.
    pub fn empty() -> Self {
        Self {
            inventories: [
                Inventory::new(PlayerId::One),
                Inventory::new(PlayerId::Two),
                Inventory::new(PlayerId::Neutral),
            ],
            whose_turn: PlayerId::One,
            phase: Phase::Play,
        }
    }

    pub fn inventory(&self, player: PlayerId) -> &Inventory {
        &self.inventories[player.index()]
    }

    pub fn inventory_mut(&mut self, player: PlayerId) -> &mut Inventory {
        &mut self.inventories[player.index()]
    }

    /// Inventory of the player to move.
    pub fn mover(&self) -> &Inventory {
        self.inventory(self.whose_turn)
    }

    /// Inventory of the player not to move.
    pub fn opponent(&self) -> &Inventory {
        self.inventory(self.whose_turn.opponent())
    }

    pub fn neutral(&self) -> &Inventory {
        self.inventory(PlayerId::Neutral)
    }

    /// Iterates over every ant on the board.
    pub fn all_ants(&self) -> impl Iterator<Item = &Ant> {
        self.inventories.iter().flat_map(|inv| inv.ants.iter())
    }

    /// Iterates over every construction on the board, food and grass included.
    pub fn all_constrs(&self) -> impl Iterator<Item = &Construction> {
        self.inventories.iter().flat_map(|inv| inv.constrs.iter())
    }

    pub fn ant_at(&self, coord: Coord) -> Option<&Ant> {
        self.all_ants().find(|ant| ant.coords == coord)
    }

    pub fn constr_at(&self, coord: Coord) -> Option<&Construction> {
        self.all_constrs().find(|c| c.coords == coord)
    }

    /// Food tiles, which live in the neutral inventory.
    pub fn food(&self) -> impl Iterator<Item = &Construction> {
        self.all_constrs()
            .filter(|c| c.constr_type == ConstrType::Food)
    }

    /// Decides whether the game is over from `player`'s point of view.
    ///
    /// Loss conditions are checked first, so a state where both sides meet a
    /// condition counts as lost.
    pub fn outcome_for(&self, player: PlayerId) -> Option<Outcome> {
        let own = self.inventory(player);
        let enemy = self.inventory(player.opponent());

        if !own.has_queen() || enemy.food_count >= FOOD_GOAL {
            return Some(Outcome::Lost);
        }
        if !enemy.has_queen() || own.food_count >= FOOD_GOAL {
            return Some(Outcome::Won);
        }
        None
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome_for(self.whose_turn).is_some()
    }

    /// Returns the winner, if either player has met a win condition.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome_for(PlayerId::One)? {
            Outcome::Won => Some(PlayerId::One),
            Outcome::Lost => Some(PlayerId::Two),
        }
    }

    /// Smallest id not used by any ant.
    pub fn next_ant_id(&self) -> u32 {
        self.all_ants().map(|ant| ant.id + 1).max().unwrap_or(0)
    }

    /// Clears every ant's `has_moved` flag.
    pub fn clear_moved_flags(&mut self) {
        for inv in self.inventories.iter_mut() {
            for ant in inv.ants.iter_mut() {
                ant.has_moved = false;
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for hand-made states, mostly used by tests and the CLI.
#[derive(Clone, Debug, Default)]
pub struct StateBuilder {
    state: GameState,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn(mut self, player: PlayerId) -> Self {
        self.state.whose_turn = player;
        self
    }

    pub fn ant(mut self, owner: PlayerId, ant_type: AntType, coords: Coord) -> Self {
        let id = self.state.next_ant_id();
        self.state
            .inventory_mut(owner)
            .ants
            .push(Ant::new(id, ant_type, coords, owner));
        self
    }

    pub fn constr(mut self, owner: PlayerId, constr_type: ConstrType, coords: Coord) -> Self {
        let tag = if owner.is_player() { Some(owner) } else { None };
        self.state
            .inventory_mut(owner)
            .constrs
            .push(Construction::new(constr_type, coords, tag));
        self
    }

    pub fn food(mut self, owner: PlayerId, count: i32) -> Self {
        self.state.inventory_mut(owner).food_count = count;
        self
    }

    pub fn build(self) -> GameState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_queens() -> StateBuilder {
        StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(1, 1))
            .ant(PlayerId::Two, AntType::Queen, Coord::new(8, 8))
    }

    #[test]
    fn test_empty_state() {
        let state = GameState::empty();
        assert_eq!(state.whose_turn, PlayerId::One);
        assert_eq!(state.phase, Phase::Play);
        assert_eq!(state.neutral().owner, PlayerId::Neutral);
        assert_eq!(state.next_ant_id(), 0);
    }

    #[test]
    fn test_lookups_span_inventories() {
        let state = two_queens()
            .constr(PlayerId::Neutral, ConstrType::Food, Coord::new(3, 3))
            .constr(PlayerId::Two, ConstrType::Anthill, Coord::new(8, 8))
            .build();

        assert_eq!(
            state.ant_at(Coord::new(8, 8)).map(|a| a.owner),
            Some(PlayerId::Two)
        );
        assert_eq!(
            state.constr_at(Coord::new(3, 3)).map(|c| c.constr_type),
            Some(ConstrType::Food)
        );
        assert_eq!(
            state.constr_at(Coord::new(8, 8)).and_then(|c| c.owner),
            Some(PlayerId::Two)
        );
        assert_eq!(state.food().count(), 1);
    }

    #[test]
    fn test_outcomes() {
        let state = two_queens().build();
        assert_eq!(state.outcome_for(PlayerId::One), None);
        assert!(!state.is_terminal());

        let state = two_queens().food(PlayerId::Two, FOOD_GOAL).build();
        assert_eq!(state.outcome_for(PlayerId::One), Some(Outcome::Lost));
        assert_eq!(state.outcome_for(PlayerId::Two), Some(Outcome::Won));
        assert_eq!(state.winner(), Some(PlayerId::Two));

        let state = StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(1, 1))
            .build();
        assert_eq!(state.outcome_for(PlayerId::One), Some(Outcome::Won));
        assert_eq!(state.winner(), Some(PlayerId::One));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = two_queens().build();
        let mut copy = original.clone();
        copy.inventory_mut(PlayerId::One).ants[0].health = 1;
        assert_eq!(original.inventory(PlayerId::One).ants[0].health, 4);
    }

    #[test]
    fn test_serde_json() {
        let state = two_queens()
            .constr(PlayerId::Neutral, ConstrType::Food, Coord::new(2, 3))
            .build();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
