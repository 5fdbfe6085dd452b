use crate::evaluation::{Evaluator, LOSS, WIN};
use crate::search::{simulate, Bookkeeping, SearchInfo, SearchLimits, SearchResult, SearchStrategy};
use antics_core::{GameState, RulesEngine};
use rand::RngCore;

/// One-ply search: play the move whose resulting state scores highest.
///
/// Ties go to the first move the rules engine listed. If nothing beats the
/// 0.0 floor the first legal move is returned.
#[derive(Debug, Clone)]
pub struct Greedy {
    limits: SearchLimits,
}

impl Default for Greedy {
    fn default() -> Self {
        Self::new()
    }
}

impl Greedy {
    pub fn new() -> Self {
        Self {
            limits: SearchLimits::depth(1),
        }
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl SearchStrategy for Greedy {
    fn search(
        &mut self,
        state: &GameState,
        rules: &dyn RulesEngine,
        evaluator: &dyn Evaluator,
        rng: &mut dyn RngCore,
    ) -> SearchResult {
        let mut info = SearchInfo::new(self.limits.clone());
        let moves = rules.legal_moves(state);
        let mut result = SearchResult::empty(1);
        result.best_move = moves.first().cloned();
        result.score = LOSS;

        for mv in moves {
            if info.should_stop() {
                break;
            }
            info.nodes += 1;
            let Some(next) = simulate(state, &mv, rng, Bookkeeping::FullTurn) else {
                continue;
            };
            let value = evaluator.evaluate_for(&next, state.whose_turn, rules);

            if value == WIN {
                result.best_move = Some(mv);
                result.score = WIN;
                break;
            }
            if value > result.score {
                result.score = value;
                result.best_move = Some(mv);
            }
        }

        result.nodes = info.nodes;
        result.stopped = info.stopped;
        result
    }

    fn name(&self) -> String {
        "Greedy".to_string()
    }
}
