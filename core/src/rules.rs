//! Contracts the core consumes from the rules engine.

use crate::game_state::GameState;
use crate::moves::Move;
use crate::types::*;

/// Legal-move enumeration and path costs, provided by the host game.
pub trait RulesEngine {
    /// Every legal move for the player to move. Empty only once the game is over.
    fn legal_moves(&self, state: &GameState) -> Vec<Move>;

    /// Movement cost from `from` to `to`, respecting obstacles.
    /// Falls back to Manhattan distance when the engine has no pathfinder.
    fn steps_to_reach(&self, _state: &GameState, from: Coord, to: Coord) -> u32 {
        from.manhattan(to)
    }
}

impl<T: RulesEngine + ?Sized> RulesEngine for &T {
    fn legal_moves(&self, state: &GameState) -> Vec<Move> {
        (**self).legal_moves(state)
    }

    fn steps_to_reach(&self, state: &GameState, from: Coord, to: Coord) -> u32 {
        (**self).steps_to_reach(state, from, to)
    }
}

impl<T: RulesEngine + ?Sized> RulesEngine for Box<T> {
    fn legal_moves(&self, state: &GameState) -> Vec<Move> {
        (**self).legal_moves(state)
    }

    fn steps_to_reach(&self, state: &GameState, from: Coord, to: Coord) -> u32 {
        (**self).steps_to_reach(state, from, to)
    }
}

/// A rules engine that always offers a fixed list of moves.
/// Useful for scripting positions and as a stand-in when only END is legal.
#[derive(Clone, Debug, Default)]
pub struct FixedMoves {
    pub moves: Vec<Move>,
}

impl FixedMoves {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }
}

impl RulesEngine for FixedMoves {
    fn legal_moves(&self, _state: &GameState) -> Vec<Move> {
        self.moves.clone()
    }
}
