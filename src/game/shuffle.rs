//! Fisher-Yates shuffling.

use rand::Rng;
use rand::seq::SliceRandom;

use super::deck::Card;

/// Uniform in-place permutation: walks from the last index down to 1 and
/// swaps each slot with one chosen uniformly from `0..=i`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Shuffles the board and re-indexes every card so `position` matches its
/// new slot.
pub fn shuffle_cards<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    fisher_yates(cards, rng);
    for (idx, card) in cards.iter_mut().enumerate() {
        card.position = idx;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::deck::{GridSize, generate_deck};

    #[test]
    fn test_empty_and_singleton() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut empty: Vec<u8> = Vec::new();
        fisher_yates(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut one = vec![42];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn test_shuffle_cards_reindexes_positions() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cards = generate_deck(GridSize::new(4, 6).unwrap()).unwrap();
        shuffle_cards(&mut cards, &mut rng);
        for (idx, card) in cards.iter().enumerate() {
            assert_eq!(card.position(), idx);
        }
        let mut ids: Vec<u32> = cards.iter().map(|c| c.id().0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_three_element_orderings_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
        let trials = 6000;
        for _ in 0..trials {
            let mut items = [0u8, 1, 2];
            fisher_yates(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (ordering, n) in counts {
            assert!(
                (800..=1200).contains(&n),
                "ordering {ordering:?} seen {n} times out of {trials}"
            );
        }
    }
}
