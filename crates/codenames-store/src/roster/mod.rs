//! Roster synchronization against the game-state document.

mod game_state_repository;

pub use game_state_repository::{GameStateRepository, RosterOutcome};
