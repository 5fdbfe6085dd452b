pub mod best_first;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod greedy;
pub mod minimax;
pub mod network;
pub mod persist;
pub mod random;
pub mod search;
pub mod td;
pub mod tree;

use antics_core::{GameState, Move, RulesEngine};
use log::debug;
use rand::rngs::StdRng;

/// Core trait for ant-game agents
pub trait Agent {
    /// Pick a move for the player to move. None only when there is no legal move.
    fn choose_move(&mut self, state: &GameState) -> Option<Move>;

    /// Called once a game this agent played has finished.
    fn on_game_end(&mut self, _won: bool) {}

    /// Get the agent's name
    fn name(&self) -> &str;
}

/// An agent that runs a search strategy over a heuristic.
pub struct SearchAgent {
    name: String,
    strategy: Box<dyn SearchStrategy>,
    evaluator: Box<dyn Evaluator>,
    rules: Box<dyn RulesEngine>,
    rng: StdRng,
}

impl SearchAgent {
    pub fn new(
        strategy: Box<dyn SearchStrategy>,
        evaluator: Box<dyn Evaluator>,
        rules: Box<dyn RulesEngine>,
        rng: StdRng,
    ) -> Self {
        SearchAgent {
            name: strategy.name(),
            strategy,
            evaluator,
            rules,
            rng,
        }
    }

    /// Runs the strategy and returns its full result.
    pub fn search(&mut self, state: &GameState) -> SearchResult {
        self.strategy
            .search(state, self.rules.as_ref(), self.evaluator.as_ref(), &mut self.rng)
    }
}

impl Agent for SearchAgent {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let result = self.search(state);
        debug!(
            "{}: score {:.4}, {} nodes{}",
            self.name,
            result.score,
            result.nodes,
            if result.stopped { " (stopped)" } else { "" }
        );
        // A stopped or degenerate search still plays something legal.
        result
            .best_move
            .or_else(|| self.rules.legal_moves(state).into_iter().next())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub use best_first::BestFirst;
pub use config::{build_agent, build_td_agent, AgentConfig, StrategyKind};
pub use error::{ConfigError, PersistenceError};
pub use evaluation::*;
pub use greedy::Greedy;
pub use minimax::AlphaBeta;
pub use network::{state_features, train_step, Network, NeuralAgent, NeuralEvaluator};
pub use random::RandomAgent;
pub use search::*;
pub use td::TdAgent;
pub use tree::TreeNode;
