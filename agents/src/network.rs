//! A small feed-forward network that learns to imitate a heuristic.

use crate::error::PersistenceError;
use crate::evaluation::{terminal_value, Evaluator, HeuristicEvaluator, HeuristicPreset, LOSS, OPEN_MARGIN, WIN};
use crate::persist::{self, read_msgpack, write_msgpack};
use crate::search::{simulate, Bookkeeping};
use crate::Agent;
use antics_core::{GameState, Move, Outcome, PlayerId, RulesEngine, QUEEN_MAX_HEALTH};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const INPUTS: usize = 7;

/// Inputs fed to the network, each in [0, 1].
pub type Features = [f64; INPUTS];

/// Distances are divided by this to land in [0, 1].
const DISTANCE_SCALE: f64 = 20.0;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Describes `state` from `player`'s side:
///
/// 0. queen standing on a construction
/// 1. non-queen ants / 2
/// 2. first non-queen ant's distance to the enemy queen / 20
/// 3. the same for the second
/// 4. enemy queen health / max health
/// 5. 0.0 lost, 1.0 won, 0.5 otherwise
/// 6. constant bias
pub fn state_features(state: &GameState, player: PlayerId) -> Features {
    let own = state.inventory(player);
    let enemy_queen = state.inventory(player.opponent()).queen();
    let mut features = [0.0; INPUTS];

    features[0] = match own.queen() {
        Some(queen) if state.constr_at(queen.coords).is_some() => 1.0,
        _ => 0.0,
    };

    let others = own.non_queen_ants();
    features[1] = others.len() as f64 / 2.0;

    if let Some(queen) = enemy_queen {
        features[2] = 1.0;
        features[3] = 1.0;
        for (slot, ant) in others.iter().take(2).enumerate() {
            features[2 + slot] = ant.coords.manhattan(queen.coords) as f64 / DISTANCE_SCALE;
        }
        features[4] = queen.health as f64 / QUEEN_MAX_HEALTH as f64;
    }

    features[5] = match state.outcome_for(player) {
        Some(Outcome::Lost) => 0.0,
        Some(Outcome::Won) => 1.0,
        None => 0.5,
    };
    features[6] = 1.0;
    features
}

/// One hidden layer of sigmoid units and a sigmoid output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// One row per hidden unit, one weight per input.
    pub hidden: Vec<Vec<f64>>,
    /// One weight per hidden unit, then the bias weight.
    pub output: Vec<f64>,
}

impl Network {
    /// Weights drawn uniformly from [-1, 1].
    pub fn new<R: Rng + ?Sized>(hidden_units: usize, rng: &mut R) -> Self {
        let hidden = (0..hidden_units)
            .map(|_| (0..INPUTS).map(|_| rng.gen_range(-1.0..=1.0)).collect())
            .collect();
        let output = (0..=hidden_units).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        Self { hidden, output }
    }

    pub fn hidden_units(&self) -> usize {
        self.hidden.len()
    }

    /// Hidden activations followed by the constant bias input.
    fn hidden_outputs(&self, inputs: &Features) -> Vec<f64> {
        let mut outputs: Vec<f64> = self
            .hidden
            .iter()
            .map(|row| sigmoid(row.iter().zip(inputs).map(|(w, x)| w * x).sum()))
            .collect();
        outputs.push(1.0);
        outputs
    }

    fn output_from(&self, hidden: &[f64]) -> f64 {
        sigmoid(self.output.iter().zip(hidden).map(|(w, h)| w * h).sum())
    }

    pub fn forward(&self, inputs: &Features) -> f64 {
        self.output_from(&self.hidden_outputs(inputs))
    }

    pub fn save(&self, path: &std::path::Path) -> persist::Result<()> {
        write_msgpack(self, path)
    }

    /// Reads weights saved by [`Network::save`], rejecting layers whose
    /// sizes do not line up.
    pub fn load(path: &std::path::Path) -> persist::Result<Self> {
        let network: Self = read_msgpack(path)?;
        network.check_shape().map_err(|reason| PersistenceError::Shape {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(network)
    }

    fn check_shape(&self) -> Result<(), String> {
        let narrow = self
            .hidden
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != INPUTS);
        if let Some((unit, row)) = narrow {
            return Err(format!(
                "hidden unit {} has {} weights, expected {}",
                unit,
                row.len(),
                INPUTS
            ));
        }
        if self.output.len() != self.hidden.len() + 1 {
            return Err(format!(
                "{} output weights for {} hidden units",
                self.output.len(),
                self.hidden.len()
            ));
        }
        Ok(())
    }
}

/// One back-propagation step toward `target`. Returns the error before
/// the update.
pub fn train_step(network: &mut Network, inputs: &Features, target: f64, rate: f64) -> f64 {
    let hidden = network.hidden_outputs(inputs);
    let actual = network.output_from(&hidden);
    let error = target - actual;
    let delta = actual * (1.0 - actual) * error;

    let hidden_deltas: Vec<f64> = hidden
        .iter()
        .zip(&network.output)
        .take(network.hidden.len())
        .map(|(h, w)| h * (1.0 - h) * w * delta)
        .collect();

    for (weight, h) in network.output.iter_mut().zip(&hidden) {
        *weight += rate * delta * h;
    }
    for (row, d) in network.hidden.iter_mut().zip(&hidden_deltas) {
        for (weight, x) in row.iter_mut().zip(inputs) {
            *weight += rate * d * x;
        }
    }
    error
}

/// Scores states with a network. Decided games still score exactly 0 or 1.
#[derive(Debug, Clone)]
pub struct NeuralEvaluator {
    pub network: Network,
}

impl NeuralEvaluator {
    pub fn new(network: Network) -> Self {
        Self { network }
    }
}

impl Evaluator for NeuralEvaluator {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
        if let Some(value) = terminal_value(state, player) {
            return value;
        }
        self.network
            .forward(&state_features(state, player))
            .clamp(OPEN_MARGIN, 1.0 - OPEN_MARGIN)
    }
}

/// Greedy one-ply player backed by a network.
///
/// While training, every candidate state is also scored by a heuristic, the
/// network takes one step toward that score, and the heuristic's score picks
/// the move.
pub struct NeuralAgent {
    name: String,
    evaluator: NeuralEvaluator,
    guide: HeuristicEvaluator,
    rules: Box<dyn RulesEngine>,
    rng: StdRng,
    train: bool,
    learning_rate: f64,
    path: Option<PathBuf>,
    steps: u64,
    error_sum: f64,
}

impl NeuralAgent {
    pub fn new(network: Network, rules: Box<dyn RulesEngine>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            name: format!("Neural({} hidden)", network.hidden_units()),
            evaluator: NeuralEvaluator::new(network),
            guide: HeuristicEvaluator::preset(HeuristicPreset::Raider),
            rules,
            rng,
            train: false,
            learning_rate: 0.8,
            path: None,
            steps: 0,
            error_sum: 0.0,
        }
    }

    pub fn with_training(mut self, guide: HeuristicEvaluator, learning_rate: f64) -> Self {
        self.guide = guide;
        self.learning_rate = learning_rate;
        self.train = true;
        self
    }

    /// Saves the weights to `path` at the end of every trained game.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn network(&self) -> &Network {
        &self.evaluator.network
    }
}

impl Agent for NeuralAgent {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let me = state.whose_turn;
        let moves = self.rules.legal_moves(state);
        let mut best_move = moves.first().cloned();
        let mut best_value = LOSS;

        for mv in moves {
            let Some(next) = simulate(state, &mv, &mut self.rng, Bookkeeping::FullTurn) else {
                continue;
            };

            let value = if self.train {
                let target = self.guide.evaluate_for(&next, me, self.rules.as_ref());
                let features = state_features(&next, me);
                let error = train_step(&mut self.evaluator.network, &features, target, self.learning_rate);
                self.steps += 1;
                self.error_sum += error.abs();
                target
            } else {
                self.evaluator.evaluate_for(&next, me, self.rules.as_ref())
            };

            if value == WIN {
                return Some(mv);
            }
            if value > best_value {
                best_value = value;
                best_move = Some(mv);
            }
        }

        debug!("{}: value {:.4}", self.name, best_value);
        best_move
    }

    fn on_game_end(&mut self, won: bool) {
        if !self.train {
            return;
        }
        if self.steps > 0 {
            info!(
                "{}: game {}, mean error {:.5} over {} steps",
                self.name,
                if won { "won" } else { "lost" },
                self.error_sum / self.steps as f64,
                self.steps
            );
        }
        self.steps = 0;
        self.error_sum = 0.0;

        if let Some(path) = &self.path {
            if let Err(err) = self.evaluator.network.save(path) {
                warn!("{}: keeping weights in memory: {}", self.name, err);
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
