use std::collections::HashSet;
use std::hash::Hash;

/// Remove the item at `source` and reinsert it at `destination`.
///
/// `destination` is clamped to the last index. Returns `false` and leaves the
/// list untouched when `source` is out of range or the move is a no-op.
pub fn move_item<T>(items: &mut Vec<T>, source: usize, destination: usize) -> bool {
    if source >= items.len() {
        return false;
    }
    let destination = destination.min(items.len() - 1);
    if destination == source {
        return false;
    }
    let item = items.remove(source);
    items.insert(destination, item);
    true
}

/// Merge a reordered subset back into the full order.
///
/// The slots held by `submitted` ids inside `current` are refilled, in slot
/// order, with those ids in submitted order. Every other id keeps its slot.
/// Ids missing from `current` are ignored and repeated ids count once.
#[must_use]
pub fn merge_subset_order<I>(current: &[I], submitted: &[I]) -> Vec<I>
where
    I: Copy + Eq + Hash,
{
    let known: HashSet<I> = current.iter().copied().collect();
    let mut moved = HashSet::new();
    let ordered: Vec<I> = submitted
        .iter()
        .copied()
        .filter(|id| known.contains(id) && moved.insert(*id))
        .collect();

    let mut replacements = ordered.into_iter();
    current
        .iter()
        .map(|id| {
            if moved.contains(id) {
                replacements.next().unwrap_or(*id)
            } else {
                *id
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_forward() {
        let mut items = vec!['a', 'b', 'c'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn moves_backward() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 3, 1));
        assert_eq!(items, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn same_slot_is_a_no_op() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 1, 1));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn destination_is_clamped() {
        let mut items = vec![1, 2, 3];
        assert!(move_item(&mut items, 0, 99));
        assert_eq!(items, vec![2, 3, 1]);

        let mut last = vec![1, 2, 3];
        assert!(!move_item(&mut last, 2, 99));
        assert_eq!(last, vec![1, 2, 3]);
    }

    #[test]
    fn out_of_range_source_is_ignored() {
        let mut items = vec![1, 2];
        assert!(!move_item(&mut items, 5, 0));
        let mut empty: Vec<u8> = Vec::new();
        assert!(!move_item(&mut empty, 0, 0));
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn merge_keeps_untouched_ids_in_their_slots() {
        // A, B, C, D, E with B and D visible; the view swapped them.
        let merged = merge_subset_order(&[1, 2, 3, 4, 5], &[4, 2]);
        assert_eq!(merged, vec![1, 4, 3, 2, 5]);
    }

    #[test]
    fn merge_with_full_set_is_the_submitted_order() {
        let merged = merge_subset_order(&[1, 2, 3], &[3, 1, 2]);
        assert_eq!(merged, vec![3, 1, 2]);
    }

    #[test]
    fn merge_ignores_unknown_and_duplicate_ids() {
        let merged = merge_subset_order(&[1, 2, 3, 4], &[9, 3, 3, 1]);
        assert_eq!(merged, vec![3, 2, 1, 4]);
    }

    #[test]
    fn merge_with_empty_submission_is_identity() {
        let merged = merge_subset_order(&[7, 8, 9], &[]);
        assert_eq!(merged, vec![7, 8, 9]);
    }
}
