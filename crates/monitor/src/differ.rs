use std::{collections::HashSet, hash::Hash};

/// Identifiers that appeared and disappeared between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff<T: Eq + Hash> {
    pub added: HashSet<T>,
    pub removed: HashSet<T>,
}

impl<T: Eq + Hash> SnapshotDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two snapshots: `added = current - previous`, `removed = previous - current`.
///
/// A reused identifier is only reported if it was absent from one of the two
/// snapshots; callers poll often enough that a reuse shows up as a removal in
/// one cycle and an addition in a later one.
///
/// ```
/// # use monitor::differ::diff;
/// # use std::collections::HashSet;
/// let previous = HashSet::from([1, 2, 3]);
/// let current = HashSet::from([2, 3, 4]);
///
/// let delta = diff(&previous, &current);
/// assert_eq!(delta.added, HashSet::from([4]));
/// assert_eq!(delta.removed, HashSet::from([1]));
/// ```
pub fn diff<T>(previous: &HashSet<T>, current: &HashSet<T>) -> SnapshotDiff<T>
where
    T: Eq + Hash + Clone,
{
    SnapshotDiff {
        added: current.difference(previous).cloned().collect(),
        removed: previous.difference(current).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prop::collection::hash_set;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn diff_is_set_difference(
            previous in hash_set(0u32..512, 0..128),
            current in hash_set(0u32..512, 0..128),
        ) {
            let delta = diff(&previous, &current);

            for pid in &delta.added {
                prop_assert!(current.contains(pid) && !previous.contains(pid));
            }
            for pid in &delta.removed {
                prop_assert!(previous.contains(pid) && !current.contains(pid));
            }
            // every id is either kept, added or removed
            let kept = previous.intersection(&current).count();
            prop_assert_eq!(kept + delta.added.len(), current.len());
            prop_assert_eq!(kept + delta.removed.len(), previous.len());
        }

        #[test]
        fn diff_with_itself_is_empty(snapshot in hash_set(any::<u32>(), 0..128)) {
            prop_assert!(diff(&snapshot, &snapshot).is_empty());
        }
    }

    #[test]
    fn empty_snapshots() {
        let empty = HashSet::<u32>::new();
        assert!(diff(&empty, &empty).is_empty());
    }

    #[test]
    fn complete_replacement() {
        let previous = HashSet::from([1, 2]);
        let current = HashSet::from([3, 4]);

        let delta = diff(&previous, &current);
        assert_eq!(delta.added, current);
        assert_eq!(delta.removed, previous);
    }

    #[test]
    fn diffs_compare_by_content() {
        let previous = HashSet::from(["a".to_owned(), "b".to_owned()]);
        let current = HashSet::from(["b".to_owned(), "c".to_owned()]);

        assert_eq!(
            diff(&previous, &current),
            SnapshotDiff {
                added: HashSet::from(["c".to_owned()]),
                removed: HashSet::from(["a".to_owned()]),
            }
        );
        assert_ne!(diff(&previous, &current), diff(&current, &previous));
    }
}
