use antics_core::{GameState, Outcome, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Own ants past this many are left out of the key.
pub const ANT_SLOTS: usize = 3;

pub const WON: &str = "won";
pub const LOST: &str = "lost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureValue {
    Flag(bool),
    Int(i32),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Flag(flag) => write!(f, "{}", flag),
            FeatureValue::Int(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(flag: bool) -> Self {
        FeatureValue::Flag(flag)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Int(value)
    }
}

/// A compressed state: (feature name, value) pairs sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(Vec<(String, FeatureValue)>);

impl StateKey {
    pub fn new(features: impl IntoIterator<Item = (String, FeatureValue)>) -> Self {
        let mut features: Vec<_> = features.into_iter().collect();
        features.sort();
        features.dedup_by(|a, b| a.0 == b.0);
        StateKey(features)
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.0
            .binary_search_by(|(key, _)| key.as_str().cmp(name))
            .ok()
            .map(|idx| self.0[idx].1)
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            FeatureValue::Int(value) => Some(value),
            FeatureValue::Flag(_) => None,
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, FeatureValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn is_won(&self) -> bool {
        self.has(WON)
    }

    pub fn is_lost(&self) -> bool {
        self.has(LOST)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Which features a compressed state keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionScheme {
    /// Queens' health, whether the own queen sits on the anthill, and each
    /// non-queen ant's distance to the enemy queen. A player without
    /// non-queen ants has lost.
    #[default]
    Raider,
    /// Queens' health, food, and each worker's distance to its next goal:
    /// the nearest food, or the nearest drop-off while carrying. A side
    /// down to its queen alone has lost.
    Forager,
}

impl CompressionScheme {
    pub fn name(self) -> &'static str {
        match self {
            CompressionScheme::Raider => "raider",
            CompressionScheme::Forager => "forager",
        }
    }

    /// Compresses `state` as seen by `player`.
    ///
    /// Ants fill slots in order of ant id, so equal states give equal keys
    /// whatever order their inventories list ants in.
    pub fn compress(self, state: &GameState, player: PlayerId) -> StateKey {
        let mut features: Vec<(String, FeatureValue)> = Vec::new();
        let mut put = |name: String, value: FeatureValue| features.push((name, value));

        let outcome = state
            .outcome_for(player)
            .or_else(|| self.early_outcome(state, player));
        match outcome {
            Some(Outcome::Won) => put(WON.to_string(), true.into()),
            Some(Outcome::Lost) => put(LOST.to_string(), true.into()),
            None => {}
        }

        match self {
            CompressionScheme::Raider => raider_features(state, player, &mut put),
            CompressionScheme::Forager => forager_features(state, player, outcome.is_some(), &mut put),
        }
        StateKey::new(features)
    }

    /// Positions the scheme already treats as decided though the game
    /// goes on.
    fn early_outcome(self, state: &GameState, player: PlayerId) -> Option<Outcome> {
        let own_army = state.inventory(player).non_queen_ants().len();
        let enemy_army = state.inventory(player.opponent()).non_queen_ants().len();
        match self {
            CompressionScheme::Raider if own_army == 0 => Some(Outcome::Lost),
            CompressionScheme::Raider => None,
            CompressionScheme::Forager if enemy_army == 0 => Some(Outcome::Won),
            CompressionScheme::Forager if own_army == 0 => Some(Outcome::Lost),
            CompressionScheme::Forager => None,
        }
    }
}

impl fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CompressionScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raider" => Ok(Self::Raider),
            "forager" => Ok(Self::Forager),
            other => Err(format!("unknown compression scheme '{}'", other)),
        }
    }
}

fn raider_features(state: &GameState, player: PlayerId, put: &mut impl FnMut(String, FeatureValue)) {
    let own = state.inventory(player);
    let enemy_queen = state.inventory(player.opponent()).queen();

    if let Some(queen) = own.queen() {
        put("queen_exists".into(), true.into());
        put("queen_health".into(), (queen.health as i32).into());
        let on_hill = own.anthill().is_some_and(|hill| hill.coords == queen.coords);
        put("queen_on_hill".into(), on_hill.into());
    }

    for (slot, ant) in own.non_queen_ants().into_iter().take(ANT_SLOTS).enumerate() {
        let n = slot + 1;
        put(format!("ant{}_exists", n), true.into());
        let distance = enemy_queen.map_or(0, |queen| ant.coords.manhattan(queen.coords) as i32);
        put(format!("ant{}_distance", n), distance.into());
    }

    if let Some(queen) = enemy_queen {
        put("enemy_queen_exists".into(), true.into());
        put("enemy_queen_health".into(), (queen.health as i32).into());
    }
}

fn forager_features(
    state: &GameState,
    player: PlayerId,
    decided: bool,
    put: &mut impl FnMut(String, FeatureValue),
) {
    let own = state.inventory(player);

    if let Some(queen) = state.inventory(player.opponent()).queen() {
        put("enemy_queen_health".into(), (queen.health as i32).into());
    }
    if let Some(queen) = own.queen() {
        put("queen_health".into(), (queen.health as i32).into());
    }
    put("food".into(), own.food_count.into());

    if decided {
        return;
    }

    let mut workers: Vec<_> = own.workers().collect();
    workers.sort_by_key(|ant| ant.id);
    for (slot, ant) in workers.into_iter().take(ANT_SLOTS).enumerate() {
        let n = slot + 1;
        let (name, goals): (String, Vec<_>) = if ant.carrying {
            (format!("worker{}_to_drop_off", n), own.drop_offs().map(|c| c.coords).collect())
        } else {
            (format!("worker{}_to_food", n), state.food().map(|c| c.coords).collect())
        };
        if let Some(distance) = goals.iter().map(|goal| ant.coords.manhattan(*goal)).min() {
            put(name, (distance as i32).into());
        }
    }
}
