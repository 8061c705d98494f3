//! Board entity - the word grid and its hidden cell assignment

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::DomainError;

/// One of the two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
}

impl TeamColor {
    /// Both colours, in a fixed order
    pub const ALL: [TeamColor; 2] = [TeamColor::Red, TeamColor::Blue];

    /// The opposing team
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which the two teams act; always a permutation of both colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TeamColor>", into = "Vec<TeamColor>")]
pub struct TurnOrder([TeamColor; 2]);

impl TurnOrder {
    /// Turn order with `first` acting first
    #[must_use]
    pub const fn starting_with(first: TeamColor) -> Self {
        Self([first, first.other()])
    }

    #[must_use]
    pub const fn first(&self) -> TeamColor {
        self.0[0]
    }

    #[must_use]
    pub const fn second(&self) -> TeamColor {
        self.0[1]
    }

    pub fn as_slice(&self) -> &[TeamColor] {
        &self.0
    }
}

impl TryFrom<Vec<TeamColor>> for TurnOrder {
    type Error = DomainError;

    fn try_from(colors: Vec<TeamColor>) -> Result<Self, Self::Error> {
        match colors.as_slice() {
            [first, second] if first.other() == *second => Ok(Self::starting_with(*first)),
            _ => Err(DomainError::InvalidTurnOrder),
        }
    }
}

impl From<TurnOrder> for Vec<TeamColor> {
    fn from(order: TurnOrder) -> Self {
        order.0.to_vec()
    }
}

/// Board dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub x: usize,
    pub y: usize,
}

impl BoardSize {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Total number of cells, `None` if it does not fit in a `usize`
    #[must_use]
    pub const fn cells(&self) -> Option<usize> {
        self.x.checked_mul(self.y)
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// What a board cell hides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOwner {
    Assassin,
    Team(TeamColor),
    Neutral,
}

/// Board state embedded in the game-state document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub size: BoardSize,
    pub current_board: Vec<String>,
    pub guessed_indexes: BTreeSet<usize>,
    pub assassin_indexes: BTreeSet<usize>,
    pub turn_order: TurnOrder,
    pub max_words_per_team: usize,
    pub words_by_team: BTreeMap<TeamColor, BTreeSet<usize>>,
}

impl Board {
    /// Cell indices assigned to `team`
    pub fn team_words(&self, team: TeamColor) -> Option<&BTreeSet<usize>> {
        self.words_by_team.get(&team)
    }

    /// Owner of the cell at `index`
    pub fn owner_of(&self, index: usize) -> CellOwner {
        if self.assassin_indexes.contains(&index) {
            return CellOwner::Assassin;
        }
        self.words_by_team
            .iter()
            .find(|(_, cells)| cells.contains(&index))
            .map_or(CellOwner::Neutral, |(team, _)| CellOwner::Team(*team))
    }

    /// Check the structural invariants: one word per cell, assigned cells in
    /// range, and no cell shared between the assassin set and any team.
    pub fn is_consistent(&self) -> bool {
        let Some(cells) = self.size.cells() else {
            return false;
        };
        if self.current_board.len() != cells {
            return false;
        }

        let mut seen = BTreeSet::new();
        let assigned = self
            .assassin_indexes
            .iter()
            .chain(self.words_by_team.values().flatten());
        for &index in assigned {
            if index >= cells || !seen.insert(index) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board {
            size: BoardSize::new(2, 2),
            current_board: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            guessed_indexes: BTreeSet::new(),
            assassin_indexes: BTreeSet::from([3]),
            turn_order: TurnOrder::starting_with(TeamColor::Blue),
            max_words_per_team: 1,
            words_by_team: BTreeMap::from([
                (TeamColor::Blue, BTreeSet::from([0])),
                (TeamColor::Red, BTreeSet::new()),
            ]),
        }
    }

    #[test]
    fn test_team_color_other() {
        assert_eq!(TeamColor::Red.other(), TeamColor::Blue);
        assert_eq!(TeamColor::Blue.other(), TeamColor::Red);
    }

    #[test]
    fn test_turn_order_serialization() {
        let order = TurnOrder::starting_with(TeamColor::Blue);
        assert_eq!(serde_json::to_string(&order).unwrap(), r#"["blue","red"]"#);

        let parsed: TurnOrder = serde_json::from_str(r#"["red","blue"]"#).unwrap();
        assert_eq!(parsed.first(), TeamColor::Red);
        assert_eq!(parsed.second(), TeamColor::Blue);
    }

    #[test]
    fn test_turn_order_rejects_non_permutations() {
        assert!(serde_json::from_str::<TurnOrder>(r#"["red","red"]"#).is_err());
        assert!(serde_json::from_str::<TurnOrder>(r#"["red"]"#).is_err());
        assert!(serde_json::from_str::<TurnOrder>(r#"["red","blue","red"]"#).is_err());
    }

    #[test]
    fn test_owner_of() {
        let board = sample_board();
        assert_eq!(board.owner_of(0), CellOwner::Team(TeamColor::Blue));
        assert_eq!(board.owner_of(3), CellOwner::Assassin);
        assert_eq!(board.owner_of(1), CellOwner::Neutral);
    }

    #[test]
    fn test_consistency() {
        let mut board = sample_board();
        assert!(board.is_consistent());

        board.words_by_team.insert(TeamColor::Red, BTreeSet::from([3]));
        assert!(!board.is_consistent());
    }

    #[test]
    fn test_cells() {
        assert_eq!(BoardSize::default().cells(), Some(25));
        assert_eq!(BoardSize::new(usize::MAX, 2).cells(), None);

        let mut board = sample_board();
        board.size = BoardSize::new(usize::MAX, usize::MAX);
        assert!(!board.is_consistent());
    }

    #[test]
    fn test_board_json_field_names() {
        let json = serde_json::to_value(sample_board()).unwrap();
        assert_eq!(json["size"]["x"], 2);
        assert_eq!(json["assassin_indexes"], serde_json::json!([3]));
        assert_eq!(json["words_by_team"]["blue"], serde_json::json!([0]));
        assert_eq!(json["turn_order"], serde_json::json!(["blue", "red"]));
    }
}
