//! Temporal-difference learning over compressed states.

mod agent;
pub mod compress;
pub mod decay;
pub mod repository;
pub mod reward;
pub mod utility;

pub use agent::{load_utilities, TdAgent};
pub use compress::{CompressionScheme, FeatureValue, StateKey, ANT_SLOTS};
pub use decay::DecaySchedule;
pub use repository::{
    table_file_name, InMemoryRepository, MsgPackRepository, UtilityRepository, UtilitySnapshot,
};
pub use reward::RewardShaping;
pub use utility::{td_update, SharedUtilities, TableStats, UtilityTable};
