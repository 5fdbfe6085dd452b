use std::fmt;
use std::path::{Path, PathBuf};

use antics_core::RulesEngine;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::best_first::{BestFirst, DEFAULT_EXPANSION_THRESHOLD};
use crate::error::ConfigError;
use crate::evaluation::{HeuristicEvaluator, HeuristicPreset, HeuristicWeights};
use crate::greedy::Greedy;
use crate::minimax::{AlphaBeta, DEFAULT_BUILD_ANT_CAP};
use crate::network::{Network, NeuralAgent};
use crate::random::RandomAgent;
use crate::search::{SearchLimits, SearchStrategy};
use crate::td::{
    load_utilities, CompressionScheme, DecaySchedule, MsgPackRepository, RewardShaping,
    SharedUtilities, TdAgent,
};
use crate::{Agent, SearchAgent};

/// How an agent picks its moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Greedy,
    BestFirst,
    #[default]
    AlphaBeta,
    Td,
    Neural,
    Random,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Greedy => "greedy",
            StrategyKind::BestFirst => "best_first",
            StrategyKind::AlphaBeta => "alpha_beta",
            StrategyKind::Td => "td",
            StrategyKind::Neural => "neural",
            StrategyKind::Random => "random",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "best_first" => Ok(Self::BestFirst),
            "alpha_beta" => Ok(Self::AlphaBeta),
            "td" => Ok(Self::Td),
            "neural" => Ok(Self::Neural),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Heuristic weights: a named preset, optionally replaced by a full table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub preset: HeuristicPreset,
    pub weights: Option<HeuristicWeights>,
}

impl HeuristicConfig {
    pub fn weights(&self) -> HeuristicWeights {
        self.weights
            .clone()
            .unwrap_or_else(|| HeuristicWeights::preset(self.preset))
    }

    pub fn evaluator(&self) -> HeuristicEvaluator {
        HeuristicEvaluator::new(self.weights())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_depth: u8,
    /// Best-first only searches children scoring at least this fraction of
    /// the best sibling.
    pub expansion_threshold: f64,
    pub prune_safe_queen: bool,
    /// Alpha-beta skips BUILD moves once the mover has this many ants.
    pub build_ant_cap: Option<usize>,
    /// Alpha-beta only searches this many children per node.
    pub branch_limit: Option<usize>,
    pub move_time_ms: Option<u64>,
    pub node_limit: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 2,
            expansion_threshold: DEFAULT_EXPANSION_THRESHOLD,
            prune_safe_queen: true,
            build_ant_cap: Some(DEFAULT_BUILD_ANT_CAP),
            branch_limit: None,
            move_time_ms: None,
            node_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        let mut limits = SearchLimits::depth(self.max_depth);
        if let Some(ms) = self.move_time_ms {
            limits = limits.with_move_time(ms);
        }
        if let Some(nodes) = self.node_limit {
            limits = limits.with_nodes(nodes);
        }
        limits
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdConfig {
    /// Initial learning rate.
    pub alpha: f64,
    /// Discount on the successor's utility.
    pub lambda: f64,
    /// Chance of playing a uniformly random move.
    pub exploration_rate: f64,
    pub decay: DecaySchedule,
    /// Games between saves.
    pub save_every: u64,
    pub table_dir: PathBuf,
    pub compression: CompressionScheme,
    pub reward: RewardShaping,
    /// When false, utilities are read but never written.
    pub learning: bool,
}

impl Default for TdConfig {
    fn default() -> Self {
        TdConfig {
            alpha: 0.99,
            lambda: 0.9,
            exploration_rate: 0.1,
            decay: DecaySchedule::default(),
            save_every: 100,
            table_dir: PathBuf::from("."),
            compression: CompressionScheme::default(),
            reward: RewardShaping::default(),
            learning: true,
        }
    }
}

impl TdConfig {
    /// Tag of the settings a table was learned under.
    pub fn fingerprint(&self) -> String {
        format!("{}_{}", self.decay.fingerprint(), self.compression)
    }

    pub fn table_path(&self) -> PathBuf {
        MsgPackRepository::in_dir(&self.table_dir, &self.fingerprint())
            .path()
            .to_path_buf()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralConfig {
    pub learning_rate: f64,
    pub hidden_units: usize,
    /// Seed for the initial weights.
    pub seed: u64,
    pub train: bool,
    /// Weights are read from and saved to this file when set.
    pub weights_path: Option<PathBuf>,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        NeuralConfig {
            learning_rate: 0.8,
            hidden_units: 12,
            seed: 0,
            train: true,
            weights_path: None,
        }
    }
}

/// Top-level agent configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub strategy: StrategyKind,
    /// Seeds every random choice the agent makes.
    pub seed: Option<u64>,
    pub heuristic: HeuristicConfig,
    pub search: SearchConfig,
    pub td: TdConfig,
    pub neural: NeuralConfig,
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AgentConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;

        if self.search.max_depth == 0 {
            return Err(ConfigError::Validation("search.max_depth must be > 0".into()));
        }
        let threshold = self.search.expansion_threshold;
        if threshold <= 0.0 || threshold > 1.0 {
            return Err(ConfigError::Validation(
                "search.expansion_threshold must be in (0, 1]".into(),
            ));
        }
        if self.search.branch_limit == Some(0) {
            return Err(ConfigError::Validation("search.branch_limit must be > 0".into()));
        }

        if !unit.contains(&self.td.alpha) {
            return Err(ConfigError::Validation("td.alpha must be in [0, 1]".into()));
        }
        if !unit.contains(&self.td.lambda) {
            return Err(ConfigError::Validation("td.lambda must be in [0, 1]".into()));
        }
        if !unit.contains(&self.td.exploration_rate) {
            return Err(ConfigError::Validation(
                "td.exploration_rate must be in [0, 1]".into(),
            ));
        }
        if self.td.save_every == 0 {
            return Err(ConfigError::Validation("td.save_every must be > 0".into()));
        }
        self.td
            .decay
            .validate()
            .map_err(|msg| ConfigError::Validation(format!("td.{}", msg)))?;

        if self.neural.hidden_units == 0 {
            return Err(ConfigError::Validation("neural.hidden_units must be > 0".into()));
        }
        if self.neural.learning_rate <= 0.0 {
            return Err(ConfigError::Validation("neural.learning_rate must be > 0".into()));
        }

        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Composes the agent `config` describes over `rules`.
///
/// A TD agent gets its own utility table, loaded from `td.table_dir` when a
/// matching one was saved there.
pub fn build_agent(config: &AgentConfig, rules: Box<dyn RulesEngine>) -> Box<dyn Agent> {
    let search = &config.search;
    let strategy: Box<dyn SearchStrategy> = match config.strategy {
        StrategyKind::Greedy => Box::new(Greedy::with_limits(SearchLimits {
            max_depth: 1,
            ..search.limits()
        })),
        StrategyKind::BestFirst => Box::new(
            BestFirst::new(search.limits())
                .with_threshold(search.expansion_threshold)
                .with_queen_pruning(search.prune_safe_queen),
        ),
        StrategyKind::AlphaBeta => Box::new(
            AlphaBeta::new(search.limits())
                .with_queen_pruning(search.prune_safe_queen)
                .with_build_ant_cap(search.build_ant_cap)
                .with_branch_limit(search.branch_limit),
        ),
        StrategyKind::Td => return build_td_agent(config, rules, SharedUtilities::default()),
        StrategyKind::Neural => return build_neural_agent(config, rules),
        StrategyKind::Random => return Box::new(RandomAgent::new(rules, config.rng())),
    };

    Box::new(SearchAgent::new(
        strategy,
        Box::new(config.heuristic.evaluator()),
        rules,
        config.rng(),
    ))
}

/// Builds a TD agent learning into `utilities`, which may be shared with
/// other agents. An empty store is filled from the saved table first.
pub fn build_td_agent(
    config: &AgentConfig,
    rules: Box<dyn RulesEngine>,
    utilities: SharedUtilities,
) -> Box<dyn Agent> {
    let td = &config.td;
    let fingerprint = td.fingerprint();
    let repository = MsgPackRepository::in_dir(&td.table_dir, &fingerprint);
    if utilities.is_empty() {
        let table = load_utilities(&repository, &fingerprint);
        utilities.with(|store| store.merge(table));
    }

    let agent = TdAgent::new(td.clone(), rules, utilities, config.seed);
    Box::new(agent.with_repository(Box::new(repository)))
}

fn build_neural_agent(config: &AgentConfig, rules: Box<dyn RulesEngine>) -> Box<dyn Agent> {
    let neural = &config.neural;
    let saved = neural.weights_path.as_deref().filter(|path| path.exists());
    let network = match saved.map(Network::load) {
        Some(Ok(network)) => {
            info!("loaded {}-unit network", network.hidden_units());
            network
        }
        Some(Err(err)) => {
            warn!("starting from random weights: {}", err);
            Network::new(neural.hidden_units, &mut StdRng::seed_from_u64(neural.seed))
        }
        None => Network::new(neural.hidden_units, &mut StdRng::seed_from_u64(neural.seed)),
    };

    let mut agent = NeuralAgent::new(network, rules, config.seed);
    if neural.train {
        agent = agent.with_training(config.heuristic.evaluator(), neural.learning_rate);
    }
    if let Some(path) = &neural.weights_path {
        agent = agent.with_path(path.clone());
    }
    Box::new(agent)
}
