use crate::Agent;
use antics_core::{GameState, Move, RulesEngine};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Plays a uniformly random legal move.
pub struct RandomAgent {
    rules: Box<dyn RulesEngine>,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(rules: Box<dyn RulesEngine>, rng: StdRng) -> Self {
        RandomAgent { rules, rng }
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let moves = self.rules.legal_moves(state);
        moves.choose(&mut self.rng).cloned()
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antics_core::{Coord, FixedMoves};
    use rand::SeedableRng;

    #[test]
    fn test_picks_a_legal_move() {
        let moves = vec![
            Move::move_ant(vec![Coord::new(0, 0), Coord::new(0, 1)]),
            Move::End,
        ];
        let mut agent = RandomAgent::new(
            Box::new(FixedMoves::new(moves.clone())),
            StdRng::seed_from_u64(4),
        );
        for _ in 0..10 {
            let chosen = agent.choose_move(&GameState::empty()).unwrap();
            assert!(moves.contains(&chosen));
        }
    }

    #[test]
    fn test_no_moves() {
        let mut agent = RandomAgent::new(Box::new(FixedMoves::new(Vec::new())), StdRng::seed_from_u64(4));
        assert!(agent.choose_move(&GameState::empty()).is_none());
    }
}
