//! The exact set of inserted cells
//!
//! Only used to grade the filter's answers; the filter never sees it.

use crate::GridKey;
use fnv::FnvHashSet;
use rand::seq::SliceRandom;
use rand::Rng;

/// Set of keys that were really inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruthSet {
    keys: FnvHashSet<GridKey>,
}

impl GroundTruthSet {
    /// Choose exactly `item_count` distinct cells of a `side` x `side` grid,
    /// uniformly without replacement.
    ///
    /// The first `item_count` of `side * side` slots are marked, the slots are
    /// Fisher-Yates shuffled, and each marked slot `i` becomes the key
    /// `(i / side, i % side)`. Callers must keep `item_count <= side * side`.
    pub fn generate<R: Rng + ?Sized>(side: u32, item_count: usize, rng: &mut R) -> Self {
        let cells = side as usize * side as usize;
        let mut slots = vec![false; cells];
        slots[..item_count.min(cells)].fill(true);
        slots.shuffle(rng);

        let keys = slots
            .iter()
            .enumerate()
            .filter(|&(_, &marked)| marked)
            .map(|(i, _)| GridKey::from_flat(i, side))
            .collect();

        GroundTruthSet { keys }
    }

    pub fn contains(&self, key: &GridKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridKey> {
        self.keys.iter()
    }

    /// Keys in row-major scan order, for stable output
    pub fn sorted(&self) -> Vec<GridKey> {
        let mut keys: Vec<GridKey> = self.keys.iter().copied().collect();
        keys.sort_by_key(|k| (k.y, k.x));
        keys
    }
}

impl FromIterator<GridKey> for GroundTruthSet {
    fn from_iter<I: IntoIterator<Item = GridKey>>(iter: I) -> Self {
        GroundTruthSet {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_exact_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [0, 1, 99, 100, 2500] {
            let truth = GroundTruthSet::generate(50, count, &mut rng);
            assert_eq!(truth.len(), count);
            assert!(truth.iter().all(|k| k.within(50)));
        }
    }

    #[test]
    fn test_full_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        let truth = GroundTruthSet::generate(12, 144, &mut rng);
        for x in 0..12 {
            for y in 0..12 {
                assert!(truth.contains(&GridKey::new(x, y)));
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = GroundTruthSet::generate(30, 50, &mut StdRng::seed_from_u64(99));
        let b = GroundTruthSet::generate(30, 50, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_row_or_column_bias() {
        // 10 x 10 grid, 10 items per run: each row and each column expects
        // one item per run, so 2000 runs expect 2000 per row/column.
        let side = 10u32;
        let runs = 2000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut rows = vec![0usize; side as usize];
        let mut cols = vec![0usize; side as usize];
        for _ in 0..runs {
            for key in GroundTruthSet::generate(side, 10, &mut rng).iter() {
                rows[key.x as usize] += 1;
                cols[key.y as usize] += 1;
            }
        }
        for count in rows.iter().chain(cols.iter()) {
            assert!((1700..=2300).contains(count), "biased count {}", count);
        }
    }

    #[test]
    fn test_sorted_is_row_major() {
        let truth: GroundTruthSet = [GridKey::new(3, 1), GridKey::new(0, 2), GridKey::new(5, 0)]
            .into_iter()
            .collect();
        assert_eq!(
            truth.sorted(),
            vec![GridKey::new(5, 0), GridKey::new(3, 1), GridKey::new(0, 2)]
        );
    }
}
