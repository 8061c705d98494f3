//! Game-state document - the authoritative record kept in the state store

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Board, BoardSize, TeamColor, Wordpack};
use crate::error::DomainError;
use crate::generator::generate_board;
use crate::value_objects::{JsonPath, MemberId};

/// Default number of assassin cells
pub const DEFAULT_ASSASSIN_COUNT: usize = 1;

/// Default word cap for the team acting first
pub const DEFAULT_MAX_WORDS_PER_TEAM: usize = 9;

/// Public projection of a connected member, as stored in rosters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: MemberId,
    pub name: String,
}

impl PlayerSummary {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A clue given by a team's captain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub word: String,
    pub number: u32,
}

/// One team's roster and clue history
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Team {
    pub captain_id: Option<MemberId>,
    pub players: Vec<PlayerSummary>,
    pub clues: Vec<Clue>,
}

/// A roster inside the document that can hold member summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Roster {
    Spectators,
    Team(TeamColor),
}

impl Roster {
    /// Every roster a member may appear in
    pub const ALL: [Roster; 3] = [
        Roster::Spectators,
        Roster::Team(TeamColor::Red),
        Roster::Team(TeamColor::Blue),
    ];

    /// Path to the roster array within the document
    #[must_use]
    pub fn path(self) -> JsonPath {
        match self {
            Self::Spectators => JsonPath::at("spectators"),
            Self::Team(color) => JsonPath::root()
                .child("teams")
                .child(color.as_str())
                .child("players"),
        }
    }

    /// Path selecting `member` inside this roster
    #[must_use]
    pub fn member_path(self, member: MemberId) -> JsonPath {
        self.path().where_eq("id", member)
    }
}

/// Board seeding parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub board_size: BoardSize,
    pub max_words_per_team: usize,
    pub assassin_count: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_size: BoardSize::default(),
            max_words_per_team: DEFAULT_MAX_WORDS_PER_TEAM,
            assassin_count: DEFAULT_ASSASSIN_COUNT,
        }
    }
}

/// The full game-state document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub host_id: MemberId,
    pub wordpack_id: i32,
    pub spectators: Vec<PlayerSummary>,
    pub teams: BTreeMap<TeamColor, Team>,
    pub board: Board,
}

impl GameState {
    /// Build the initial document for a new game hosted by `host_id`
    pub fn initial<R: Rng + ?Sized>(
        rng: &mut R,
        host_id: MemberId,
        wordpack: &Wordpack,
        settings: &GameSettings,
    ) -> Result<Self, DomainError> {
        let board = generate_board(
            rng,
            &wordpack.words,
            settings.board_size,
            settings.max_words_per_team,
            settings.assassin_count,
        )?;

        Ok(Self {
            host_id,
            wordpack_id: wordpack.id,
            spectators: Vec::new(),
            teams: TeamColor::ALL
                .into_iter()
                .map(|color| (color, Team::default()))
                .collect(),
            board,
        })
    }

    /// Members listed in `roster`
    pub fn roster(&self, roster: Roster) -> &[PlayerSummary] {
        match roster {
            Roster::Spectators => &self.spectators,
            Roster::Team(color) => self
                .teams
                .get(&color)
                .map(|team| team.players.as_slice())
                .unwrap_or_default(),
        }
    }

    /// Check whether `member` appears in any roster
    pub fn contains_member(&self, member: MemberId) -> bool {
        Roster::ALL
            .into_iter()
            .any(|r| self.roster(r).iter().any(|p| p.id == member))
    }
}
