pub mod error;
pub mod game_state;
pub mod inventory;
pub mod moves;
pub mod rules;
pub mod transition;
pub mod types;

pub use error::TransitionError;
pub use game_state::*;
pub use inventory::*;
pub use moves::*;
pub use rules::*;
pub use types::*;
