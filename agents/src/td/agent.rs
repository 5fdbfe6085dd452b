use super::compress::StateKey;
use super::repository::UtilityRepository;
use super::reward::TERMINAL_REWARD;
use super::utility::{SharedUtilities, UtilityTable};
use crate::config::TdConfig;
use crate::persist::Result;
use crate::Agent;
use antics_core::{GameState, Move, RulesEngine};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reads the table saved under `fingerprint`, or starts empty.
pub fn load_utilities(repository: &dyn UtilityRepository, fingerprint: &str) -> UtilityTable {
    match repository.load(fingerprint) {
        Ok(Some(table)) => {
            info!("loaded {} utilities for '{}'", table.len(), fingerprint);
            table
        }
        Ok(None) => UtilityTable::new(),
        Err(err) => {
            warn!("starting with an empty utility table: {}", err);
            UtilityTable::new()
        }
    }
}

/// Temporal-difference learner over compressed states.
///
/// Picks the move whose resulting state has the highest learned utility,
/// exploring at random now and then, and after each choice pulls the
/// current state's utility toward its reward plus the chosen successor's.
pub struct TdAgent {
    name: String,
    config: TdConfig,
    fingerprint: String,
    alpha: f64,
    rules: Box<dyn RulesEngine>,
    utilities: SharedUtilities,
    repository: Option<Box<dyn UtilityRepository>>,
    rng: StdRng,
    last_key: Option<StateKey>,
    new_states: usize,
    games: u64,
}

impl TdAgent {
    pub fn new(
        mut config: TdConfig,
        rules: Box<dyn RulesEngine>,
        utilities: SharedUtilities,
        seed: Option<u64>,
    ) -> Self {
        if config.save_every == 0 {
            warn!("save_every is 0, saving after every game");
            config.save_every = 1;
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            name: format!("TD({})", config.compression),
            fingerprint: config.fingerprint(),
            alpha: config.alpha,
            config,
            rules,
            utilities,
            repository: None,
            rng,
            last_key: None,
            new_states: 0,
            games: 0,
        }
    }

    /// Saves through `repository` every `save_every` games and on drop.
    pub fn with_repository(mut self, repository: Box<dyn UtilityRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn games(&self) -> u64 {
        self.games
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn utilities(&self) -> &SharedUtilities {
        &self.utilities
    }

    /// States first seen since the last finished game.
    pub fn new_states(&self) -> usize {
        self.new_states
    }

    pub fn save(&self) -> Result<()> {
        match &self.repository {
            Some(repository) => self
                .utilities
                .with(|table| repository.save(table, &self.fingerprint)),
            None => Ok(()),
        }
    }

    fn save_or_warn(&self) {
        if self.repository.is_none() {
            return;
        }
        match self.save() {
            Ok(()) => info!("{}: saved {} utilities", self.name, self.utilities.len()),
            Err(err) => warn!("{}: keeping utilities in memory: {}", self.name, err),
        }
    }
}

impl Agent for TdAgent {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let me = state.whose_turn;
        let moves = self.rules.legal_moves(state);
        let scheme = self.config.compression;
        let learning = self.config.learning;
        let current = scheme.compress(state, me);

        let mut candidates = Vec::with_capacity(moves.len());
        for mv in &moves {
            match state.apply_move(mv, &mut self.rng) {
                Ok(next) => candidates.push((mv.clone(), scheme.compress(&next, me))),
                Err(err) => warn!("skipping move '{}': {}", mv, err),
            }
        }

        let (best, new_states) = self.utilities.with(|table| {
            let mut new_states = 0;
            if learning && table.touch(&current) {
                new_states += 1;
            }
            let mut best: Option<(usize, f64)> = None;
            for (idx, (_, key)) in candidates.iter().enumerate() {
                if learning && table.touch(key) {
                    new_states += 1;
                }
                let utility = table.get(key);
                if best.map_or(true, |(_, top)| utility > top) {
                    best = Some((idx, utility));
                }
            }
            (best, new_states)
        });
        self.new_states += new_states;

        let Some((mut idx, utility)) = best else {
            return moves.into_iter().next();
        };
        if self.rng.gen::<f64>() < self.config.exploration_rate {
            idx = self.rng.gen_range(0..candidates.len());
            debug!("{}: exploring", self.name);
        }
        let (mv, next_key) = candidates.swap_remove(idx);

        if learning {
            let reward = self.config.reward.reward(&current);
            let (alpha, lambda) = (self.alpha, self.config.lambda);
            let updated = self
                .utilities
                .with(|table| table.update(&current, &next_key, reward, alpha, lambda));
            debug!(
                "{}: {} (best utility {:.4}), U(s) now {:.4}",
                self.name, mv, utility, updated
            );
        }

        self.last_key = Some(next_key);
        Some(mv)
    }

    fn on_game_end(&mut self, won: bool) {
        if !self.config.learning {
            self.last_key = None;
            return;
        }

        if let Some(last) = self.last_key.take() {
            let reward = if won { TERMINAL_REWARD } else { -TERMINAL_REWARD };
            let alpha = self.alpha;
            self.utilities
                .with(|table| table.update_terminal(&last, reward, alpha));
        }

        let previous = self.alpha;
        self.alpha = self.config.decay.next(previous);
        info!(
            "{}: learning rate {:.5} - {:.5} = {:.5}, {} known states, {} new states",
            self.name,
            previous,
            previous - self.alpha,
            self.alpha,
            self.utilities.len(),
            self.new_states
        );

        self.new_states = 0;
        self.games += 1;
        if self.games % self.config.save_every == 0 {
            self.save_or_warn();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TdAgent {
    fn drop(&mut self) {
        if self.config.learning {
            self.save_or_warn();
        }
    }
}
