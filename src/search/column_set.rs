/// Immutable bit-set over column ordinals
///
/// Identifies one combination of columns. Equality and hashing are by the
/// raw bits; all sets created for a run share the same width (the column
/// count), so bit patterns compare directly.
use bitvec::prelude::*;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnSet {
    bits: BitVec<usize, Lsb0>,
}

impl ColumnSet {
    /// The empty set over `width` columns.
    pub fn empty(width: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 0; width],
        }
    }

    /// Build a set over `width` columns from a list of ordinals.
    pub fn of(width: usize, ordinals: &[usize]) -> Self {
        let mut set = Self::empty(width);
        for &ordinal in ordinals {
            set.bits.set(ordinal, true);
        }
        set
    }

    /// Number of columns the set ranges over.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Number of members.
    pub fn cardinality(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        self.bits.get(ordinal).map(|bit| *bit).unwrap_or(false)
    }

    /// A copy with `ordinal` set.
    pub fn with(&self, ordinal: usize) -> Self {
        let mut next = self.clone();
        next.bits.set(ordinal, true);
        next
    }

    /// A copy with `ordinal` cleared.
    pub fn without(&self, ordinal: usize) -> Self {
        let mut next = self.clone();
        next.bits.set(ordinal, false);
        next
    }

    /// Whether every member of `self` is a member of `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.bits.iter_ones().all(|ordinal| other.contains(ordinal))
    }

    /// Whether `self` is a subset of `other` and not equal to it.
    pub fn is_strict_subset_of(&self, other: &Self) -> bool {
        self.is_subset_of(other) && self.cardinality() < other.cardinality()
    }

    /// Members of `self` that are not members of `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut next = self.clone();
        for ordinal in other.bits.iter_ones() {
            if ordinal < next.bits.len() {
                next.bits.set(ordinal, false);
            }
        }
        next
    }

    /// In-place union, used to accumulate dependency sets.
    pub fn union_with(&mut self, other: &Self) {
        for ordinal in other.bits.iter_ones() {
            self.bits.set(ordinal, true);
        }
    }

    /// Members in ascending ordinal order.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Every subset of `width` columns, in binary counting order. Counting
    /// order guarantees each set appears after all of its subsets, which the
    /// pass controller relies on when a whole power set fits in one pass.
    /// Callers must keep `width` small enough for `1 << width` to be sane.
    pub fn power_set(width: usize) -> Vec<Self> {
        let count = 1usize << width;
        let mut sets = Vec::with_capacity(count);
        for mask in 0..count {
            let mut set = Self::empty(width);
            for ordinal in 0..width {
                if mask & (1 << ordinal) != 0 {
                    set.bits.set(ordinal, true);
                }
            }
            sets.push(set);
        }
        sets
    }
}

impl std::fmt::Debug for ColumnSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, ordinal) in self.members().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ordinal)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_and_cardinality() {
        let set = ColumnSet::of(5, &[0, 3]);
        assert!(set.contains(0));
        assert!(!set.contains(1));
        assert!(set.contains(3));
        assert_eq!(set.cardinality(), 2);
        assert_eq!(set.members().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_with_and_without_are_functional() {
        let set = ColumnSet::of(4, &[1]);
        let bigger = set.with(2);
        assert_eq!(set.cardinality(), 1);
        assert_eq!(bigger.members().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(bigger.without(1).members().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_subset_and_difference() {
        let small = ColumnSet::of(6, &[1, 4]);
        let big = ColumnSet::of(6, &[1, 2, 4]);
        assert!(small.is_subset_of(&big));
        assert!(small.is_strict_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(big.is_subset_of(&big));
        assert!(!big.is_strict_subset_of(&big));
        assert_eq!(big.difference(&small).members().collect::<Vec<_>>(), vec![2]);
        assert!(ColumnSet::empty(6).is_subset_of(&small));
    }

    #[test]
    fn test_power_set_counting_order_puts_subsets_first() {
        let sets = ColumnSet::power_set(3);
        assert_eq!(sets.len(), 8);
        assert!(sets[0].is_empty());
        for (i, set) in sets.iter().enumerate() {
            for earlier in &sets[..i] {
                assert!(!set.is_strict_subset_of(earlier), "{:?} after {:?}", set, earlier);
            }
        }
    }

    #[test]
    fn test_equality_is_by_bits() {
        assert_eq!(ColumnSet::of(4, &[0, 2]), ColumnSet::of(4, &[2, 0]));
        assert_ne!(ColumnSet::of(4, &[0]), ColumnSet::of(4, &[1]));
    }
}
