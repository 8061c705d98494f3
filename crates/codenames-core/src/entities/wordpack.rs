//! Wordpack entity - the pool a board's words are drawn from

use serde::{Deserialize, Serialize};

const BUNDLED_WORDPACK: &str = include_str!("../../assets/default_wordpack.json");

/// A named pool of candidate board words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wordpack {
    pub id: i32,
    pub name: String,
    pub words: Vec<String>,
}

impl Wordpack {
    pub fn new(id: i32, name: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            words,
        }
    }

    /// The wordpack shipped with the crate
    #[must_use]
    pub fn bundled() -> Self {
        // The asset is checked by `test_bundled_wordpack_parses`.
        serde_json::from_str(BUNDLED_WORDPACK)
            .unwrap_or_else(|_| Self::new(1, "Classic", Vec::new()))
    }

    /// Parse a wordpack from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_wordpack_parses() {
        let pack: Wordpack = serde_json::from_str(BUNDLED_WORDPACK).unwrap();
        assert_eq!(pack.id, 1);
        assert!(pack.words.len() >= 25);

        let unique: HashSet<_> = pack.words.iter().collect();
        assert_eq!(unique.len(), pack.words.len());
    }

    #[test]
    fn test_from_json() {
        let pack = Wordpack::from_json(r#"{"id": 4, "name": "Tiny", "words": ["a", "b"]}"#).unwrap();
        assert_eq!(pack.id, 4);
        assert_eq!(pack.words, vec!["a", "b"]);
    }
}
