//! Randomized initial board assignment
//!
//! The generator is a pure function of its inputs and the supplied random
//! source; seeding the RNG makes it fully reproducible.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::entities::{Board, BoardSize, TeamColor, TurnOrder};
use crate::error::DomainError;

/// Generate a fresh board.
///
/// Cells are split, after a uniform shuffle, into `assassin_count` assassin
/// cells, `max_words_per_team` cells for the team acting first and one fewer
/// for the second team, since the first team reveals one extra word before
/// turn parity evens out. Remaining cells are neutral.
pub fn generate_board<R: Rng + ?Sized>(
    rng: &mut R,
    word_pool: &[String],
    size: BoardSize,
    max_words_per_team: usize,
    assassin_count: usize,
) -> Result<Board, DomainError> {
    let Some(cells) = size.cells() else {
        return Err(DomainError::InsufficientWords {
            required: usize::MAX,
            available: word_pool.len(),
        });
    };
    if cells == 0 {
        return Err(DomainError::EmptyBoard);
    }
    if cells > word_pool.len() {
        return Err(DomainError::InsufficientWords {
            required: cells,
            available: word_pool.len(),
        });
    }

    let second_team_words = max_words_per_team.saturating_sub(1);
    let required = assassin_count
        .checked_add(max_words_per_team)
        .and_then(|n| n.checked_add(second_team_words))
        .unwrap_or(usize::MAX);
    if required > cells {
        return Err(DomainError::BoardOverflow { required, cells });
    }

    let words = sample_distinct(rng, word_pool, cells);

    let first = if rng.gen_bool(0.5) {
        TeamColor::Blue
    } else {
        TeamColor::Red
    };
    let turn_order = TurnOrder::starting_with(first);

    let mut indexes: Vec<usize> = (0..cells).collect();
    indexes.shuffle(rng);

    let (assassins, rest) = indexes.split_at(assassin_count);
    let (first_team, rest) = rest.split_at(max_words_per_team);
    let second_team = &rest[..second_team_words];

    let words_by_team = BTreeMap::from([
        (turn_order.first(), first_team.iter().copied().collect()),
        (turn_order.second(), second_team.iter().copied().collect()),
    ]);

    Ok(Board {
        size,
        current_board: words,
        guessed_indexes: BTreeSet::new(),
        assassin_indexes: assassins.iter().copied().collect(),
        turn_order,
        max_words_per_team,
        words_by_team,
    })
}

/// Pick `count` elements at distinct positions of `pool`, retrying on
/// repeated indices. Callers guarantee `count <= pool.len()`.
fn sample_distinct<R: Rng + ?Sized, T: Clone>(rng: &mut R, pool: &[T], count: usize) -> Vec<T> {
    let mut picked = HashSet::with_capacity(count);
    let mut order = Vec::with_capacity(count);

    while order.len() < count {
        let index = rng.gen_range(0..pool.len());
        if picked.insert(index) {
            order.push(index);
        }
    }

    order.into_iter().map(|i| pool[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{i}")).collect()
    }

    fn assert_partition(board: &Board, max_words: usize, assassins: usize) {
        let cells = board.size.cells().unwrap();
        let first = board.team_words(board.turn_order.first()).unwrap();
        let second = board.team_words(board.turn_order.second()).unwrap();

        assert_eq!(board.assassin_indexes.len(), assassins);
        assert_eq!(first.len(), max_words);
        assert_eq!(second.len(), max_words.saturating_sub(1));

        assert!(board.assassin_indexes.is_disjoint(first));
        assert!(board.assassin_indexes.is_disjoint(second));
        assert!(first.is_disjoint(second));

        let total = board.assassin_indexes.len() + first.len() + second.len();
        assert_eq!(total, assassins + max_words + max_words.saturating_sub(1));
        assert!(total <= cells);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_small_board_scenario() {
        let words = pool(9);
        let mut rng = StdRng::seed_from_u64(42);
        let board = generate_board(&mut rng, &words, BoardSize::new(3, 3), 2, 1).unwrap();

        let distinct: HashSet<_> = board.current_board.iter().collect();
        assert_eq!(board.current_board.len(), 9);
        assert_eq!(distinct.len(), 9);
        assert_partition(&board, 2, 1);

        let mut team_sizes: Vec<_> = board.words_by_team.values().map(BTreeSet::len).collect();
        team_sizes.sort_unstable();
        assert_eq!(team_sizes, vec![1, 2]);
    }

    #[test]
    fn test_partition_holds_across_parameters() {
        let words = pool(40);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for (size, max_words, assassins) in [
                (BoardSize::new(5, 5), 9, 1),
                (BoardSize::new(5, 5), 8, 3),
                (BoardSize::new(4, 4), 5, 0),
                (BoardSize::new(6, 6), 12, 2),
                (BoardSize::new(2, 2), 1, 0),
            ] {
                let board = generate_board(&mut rng, &words, size, max_words, assassins).unwrap();
                assert_partition(&board, max_words, assassins);
            }
        }
    }

    #[test]
    fn test_words_are_drawn_from_distinct_pool_positions() {
        let words = pool(25);
        let mut rng = StdRng::seed_from_u64(5);
        let board = generate_board(&mut rng, &words, BoardSize::new(5, 5), 9, 1).unwrap();

        let mut sorted = board.current_board.clone();
        sorted.sort();
        let mut expected = words.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_board_fills_exactly() {
        // 1 assassin + 2 + 1 = 4 cells on a 2x2 board
        let words = pool(4);
        let mut rng = StdRng::seed_from_u64(9);
        let board = generate_board(&mut rng, &words, BoardSize::new(2, 2), 2, 1).unwrap();
        assert_partition(&board, 2, 1);
    }

    #[test]
    fn test_insufficient_words() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_board(&mut rng, &pool(8), BoardSize::new(3, 3), 2, 1).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientWords {
                required: 9,
                available: 8
            }
        );
    }

    #[test]
    fn test_board_overflow() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_board(&mut rng, &pool(9), BoardSize::new(3, 3), 5, 1).unwrap_err();
        assert_eq!(err, DomainError::BoardOverflow { required: 10, cells: 9 });
    }

    #[test]
    fn test_huge_counts_overflow_instead_of_wrapping() {
        let mut rng = StdRng::seed_from_u64(1);
        let words = pool(9);

        let err = generate_board(&mut rng, &words, BoardSize::new(3, 3), usize::MAX, 1).unwrap_err();
        assert_eq!(
            err,
            DomainError::BoardOverflow {
                required: usize::MAX,
                cells: 9
            }
        );

        let err = generate_board(&mut rng, &words, BoardSize::new(3, 3), 2, usize::MAX).unwrap_err();
        assert!(matches!(err, DomainError::BoardOverflow { .. }));
    }

    #[test]
    fn test_unrepresentable_board_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_board(&mut rng, &pool(9), BoardSize::new(usize::MAX, 2), 1, 1).unwrap_err();
        assert!(err.is_capacity());
        assert!(matches!(err, DomainError::InsufficientWords { .. }));
    }

    #[test]
    fn test_empty_board() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_board(&mut rng, &pool(9), BoardSize::new(0, 3), 1, 0).unwrap_err();
        assert_eq!(err, DomainError::EmptyBoard);
    }

    #[test]
    fn test_same_seed_same_board() {
        let words = pool(30);
        let a = generate_board(&mut StdRng::seed_from_u64(11), &words, BoardSize::new(5, 5), 9, 1);
        let b = generate_board(&mut StdRng::seed_from_u64(11), &words, BoardSize::new(5, 5), 9, 1);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_both_turn_orders_occur() {
        let words = pool(25);
        let firsts: HashSet<_> = (0..64)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                generate_board(&mut rng, &words, BoardSize::new(5, 5), 9, 1)
                    .unwrap()
                    .turn_order
                    .first()
            })
            .collect();
        assert_eq!(firsts.len(), 2);
    }
}
