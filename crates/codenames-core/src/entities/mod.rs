//! Domain entities - the game-state document and its parts

mod board;
mod game_state;
mod wordpack;

pub use board::{Board, BoardSize, CellOwner, TeamColor, TurnOrder};
pub use game_state::{
    Clue, GameSettings, GameState, PlayerSummary, Roster, Team, DEFAULT_ASSASSIN_COUNT,
    DEFAULT_MAX_WORDS_PER_TEAM,
};
pub use wordpack::Wordpack;
