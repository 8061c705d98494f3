//! # codenames-core
//!
//! Domain layer: identifiers, the game-state document, the board generator and
//! the JSON path addressing used against the state store.
//! This crate has zero dependencies on infrastructure (Redis, web framework, etc.).

pub mod entities;
pub mod error;
pub mod generator;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Board, BoardSize, CellOwner, Clue, GameSettings, GameState, PlayerSummary, Roster, Team,
    TeamColor, TurnOrder, Wordpack, DEFAULT_ASSASSIN_COUNT, DEFAULT_MAX_WORDS_PER_TEAM,
};
pub use error::DomainError;
pub use generator::generate_board;
pub use value_objects::{Filter, IdParseError, JsonPath, MemberId, SessionId};
